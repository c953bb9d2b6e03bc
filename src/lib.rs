//! S-52 symbology and layer generation for S-57 nautical charts.
//!
//! A [`Catalog`] is built once from a presentation library document and
//! shared read-only. Each chart gets its own [`S52Chart`], which reads
//! features from a [`ChartSource`], resolves their symbology through the
//! catalog and the conditional [`procedures`], and accumulates
//! render-ready [`ChartLayers`].

pub mod attribute;
pub mod catalog;
pub mod chart;
pub mod colors;
pub mod config;
pub mod error;
pub mod export;
pub mod feature;
pub mod geometry;
pub mod index;
pub mod layers;
pub mod procedures;
pub mod s57;
pub mod util;

pub use attribute::{AttrList, AttrValue, Attributes};
pub use catalog::{Catalog, DisplayCategory, Instruction, LookUp, RadarPriority, TableCategory};
pub use chart::{ChartSource, ChartState, MemorySource, S52Chart, Symbolization, symbolize};
pub use config::DisplaySettings;
pub use error::{CatalogError, ChartError, ConfigError, GeometryError};
pub use feature::{Extent, Feature, Geometry, GeometryKind, Point, Polygon};
pub use index::ChartIndex;
pub use layers::{ChartLayers, LayerBundle, LayerKey, Styling, SymbolList};
pub use procedures::{Fragment, Procedure, ProcedureContext};
