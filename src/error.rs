use thiserror::Error;

/// Errors raised while building the reference catalog. Any of these aborts
/// catalog construction; no partial catalog is returned.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed presentation library document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid look-up row {id}: {reason}")]
    InvalidLookUp { id: i32, reason: String },

    #[error("Invalid instruction '{0}'")]
    InvalidInstruction(String),

    #[error("Invalid color {token} = '{value}' in table {table}")]
    InvalidColor {
        table: String,
        token: String,
        value: String,
    },

    #[error("Duplicate {kind} definition '{name}'")]
    Duplicate { kind: &'static str, name: String },

    #[error("Unknown color scheme '{0}'")]
    UnknownScheme(String),

    #[error("Presentation library contains no color tables")]
    NoColorTables,
}

/// Errors that make a whole chart unusable.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable chart source: {0}")]
    Unreadable(String),

    #[error("Chart is already {0:?}")]
    InvalidState(crate::chart::ChartState),
}

/// Per-feature geometry failures. These never abort a chart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Ring {ring} has {points} distinct points, need at least 3")]
    DegenerateRing { ring: usize, points: usize },

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}

/// Invalid operator settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Depth thresholds must satisfy shallow <= safety <= deep (got {shallow}, {safety}, {deep})")]
    Thresholds { shallow: f64, safety: f64, deep: f64 },

    #[error("Unknown color scheme '{0}'")]
    UnknownScheme(String),
}
