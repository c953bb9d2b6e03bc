//! Layer builder: turns the features of one chart into typed output layers.

use log::{debug, error, info, warn};

use crate::attribute::AttrValue;
use crate::catalog::{
    Catalog, DisplayCategory, Instruction, LinePattern, LookUp, RadarPriority, Rotation,
    UNDEFINED_COLOR, UNDEFINED_COLOR_INDEX, UNDEFINED_SYMBOL,
};
use crate::config::DisplaySettings;
use crate::error::ChartError;
use crate::feature::{Extent, Feature, Geometry, GeometryKind, Point, Polygon};
use crate::geometry;
use crate::index::ChartIndex;
use crate::layers::{ChartLayers, LayerBundle, LayerKey, LineStyleRef, SectorMark, SymbolList};
use crate::procedures::soundg::sounding_depth;
use crate::procedures::{ProcedureContext, SectorArc, SoundingFlags};

/// Object classes labelled with their `OBJNAM`.
pub const TEXT_CLASSES: &[&str] = &[
    "ADMARE", "BRIDGE", "BUAARE", "HRBARE", "HRBFAC", "LNDARE", "LNDMRK", "LNDRGN", "SEAARE",
    "SMCFAC",
];

const FALLBACK_PRIORITY: u8 = 5;

/// Load state of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    Empty,
    Reading,
    Ready,
    Failed,
}

/// Feature stream of one chart, grouped by source layer.
pub trait ChartSource {
    fn layer_names(&mut self) -> Result<Vec<String>, ChartError>;

    fn read_layer(&mut self, name: &str) -> Result<Vec<Feature>, ChartError>;

    /// Chart coverage, if the source records one.
    fn extent(&mut self) -> Result<Option<Extent>, ChartError>;
}

/// In-memory chart, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    layers: Vec<(String, Vec<Feature>)>,
    extent: Option<Extent>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature to the source layer named after its class.
    pub fn push(&mut self, feature: Feature) {
        let name = feature.class.clone();
        self.push_to(&name, feature);
    }

    pub fn push_to(&mut self, layer: &str, feature: Feature) {
        match self.layers.iter_mut().find(|(n, _)| n == layer) {
            Some((_, features)) => features.push(feature),
            None => self.layers.push((layer.to_string(), vec![feature])),
        }
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.push(feature);
        self
    }

    pub fn set_extent(&mut self, extent: Extent) {
        self.extent = Some(extent);
    }
}

impl ChartSource for MemorySource {
    fn layer_names(&mut self) -> Result<Vec<String>, ChartError> {
        Ok(self.layers.iter().map(|(n, _)| n.clone()).collect())
    }

    fn read_layer(&mut self, name: &str) -> Result<Vec<Feature>, ChartError> {
        self.layers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, features)| features.clone())
            .ok_or_else(|| ChartError::Unreadable(format!("no layer {}", name)))
    }

    fn extent(&mut self) -> Result<Option<Extent>, ChartError> {
        Ok(self.extent)
    }
}

/// Drawing instructions of one feature with every conditional resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbolization {
    pub instructions: Vec<Instruction>,
    pub display_priority: u8,
    pub category: DisplayCategory,
    pub radar: RadarPriority,
    pub sectors: Vec<SectorArc>,
    pub text: Option<String>,
    /// Id of the matching look-up row, `None` for the undefined fallback.
    pub lookup_id: Option<i32>,
}

impl Symbolization {
    /// Styling of features no look-up row matches: a dashed magenta outline
    /// and a question mark.
    pub fn undefined(kind: GeometryKind) -> Self {
        let outline = Instruction::line(LinePattern::Dash, 1, UNDEFINED_COLOR);
        let instructions = match kind {
            GeometryKind::Area => vec![outline, Instruction::symbol(UNDEFINED_SYMBOL)],
            GeometryKind::Line => vec![outline],
            GeometryKind::Point => vec![Instruction::symbol(UNDEFINED_SYMBOL)],
        };
        Symbolization {
            instructions,
            display_priority: FALLBACK_PRIORITY,
            category: DisplayCategory::Standard,
            radar: RadarPriority::Suppressed,
            sectors: Vec::new(),
            text: None,
            lookup_id: None,
        }
    }

    fn key(&self, source: &str) -> LayerKey {
        LayerKey {
            priority: self.display_priority,
            radar: self.radar,
            category: self.category,
            source: source.to_string(),
        }
    }
}

/// Resolve the drawing instructions of one feature: best-matching look-up
/// row, conditional procedures spliced in place.
pub fn symbolize(
    catalog: &Catalog,
    settings: &DisplaySettings,
    index: &ChartIndex,
    feature: &Feature,
    sequence: usize,
) -> Symbolization {
    let kind = feature.kind();
    let table = settings.table_for(kind);
    let Some(lookup) = catalog.find_best_lookup(&feature.class, &feature.attributes, table) else {
        debug!(
            "No look-up for {} ({:?}), using undefined symbology",
            feature.class, table
        );
        return Symbolization::undefined(kind);
    };
    resolve(lookup, settings, index, feature, sequence)
}

fn resolve(
    lookup: &LookUp,
    settings: &DisplaySettings,
    index: &ChartIndex,
    feature: &Feature,
    sequence: usize,
) -> Symbolization {
    let ctx = ProcedureContext {
        settings,
        index,
        lookup: Some(lookup),
        sequence,
    };
    let mut result = Symbolization {
        instructions: Vec::with_capacity(lookup.instructions.len()),
        display_priority: lookup.display_priority,
        category: lookup.category,
        radar: lookup.radar_priority,
        sectors: Vec::new(),
        text: None,
        lookup_id: Some(lookup.id),
    };

    for instruction in &lookup.instructions {
        let Instruction::Conditional(procedure) = instruction else {
            result.instructions.push(instruction.clone());
            continue;
        };
        let fragment = procedure.run(feature, &ctx);
        result.instructions.extend(fragment.instructions);
        if let Some(priority) = fragment.display_priority {
            result.display_priority = priority;
        }
        if let Some(category) = fragment.category {
            result.category = category;
        }
        if let Some(radar) = fragment.radar {
            result.radar = radar;
        }
        result.sectors.extend(fragment.sectors);
        if fragment.text.is_some() {
            result.text = fragment.text;
        }
    }
    result
}

/// Per-load counters, logged once the chart is ready.
#[derive(Debug, Default)]
struct LoadStats {
    features: usize,
    undefined: usize,
    skipped: usize,
}

/// Builds the layers of one chart.
///
/// `load` takes `&mut self`, so one chart is never loaded re-entrantly;
/// charts loaded in parallel each get their own builder and share the
/// catalog read-only.
pub struct S52Chart<'a> {
    catalog: &'a Catalog,
    settings: DisplaySettings,
    state: ChartState,
    layers: Option<ChartLayers>,
}

impl<'a> S52Chart<'a> {
    pub fn new(catalog: &'a Catalog, settings: DisplaySettings) -> Self {
        Self {
            catalog,
            settings,
            state: ChartState::Empty,
            layers: None,
        }
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    /// Layers of the last successful load.
    pub fn layers(&self) -> Option<&ChartLayers> {
        self.layers.as_ref()
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Replace the display settings. Existing layers are dropped; the chart
    /// must be loaded again.
    pub fn set_settings(&mut self, settings: DisplaySettings) {
        self.settings = settings;
        self.layers = None;
        self.state = ChartState::Empty;
    }

    /// Read every layer of `source` and build the chart's layers from
    /// scratch. Layers become visible only once the whole chart is read;
    /// on error the chart is `Failed` and has no layers.
    pub fn load(&mut self, source: &mut impl ChartSource) -> Result<&ChartLayers, ChartError> {
        if self.state == ChartState::Reading {
            return Err(ChartError::InvalidState(self.state));
        }
        self.state = ChartState::Reading;
        self.layers = None;

        match self.build(source) {
            Ok(layers) => {
                self.state = ChartState::Ready;
                Ok(&*self.layers.insert(layers))
            }
            Err(e) => {
                error!("Chart load failed: {}", e);
                self.state = ChartState::Failed;
                Err(e)
            }
        }
    }

    fn build(&self, source: &mut impl ChartSource) -> Result<ChartLayers, ChartError> {
        let mut features: Vec<(String, Feature)> = Vec::new();
        for name in source.layer_names()? {
            let layer = source.read_layer(&name)?;
            debug!("Read {} features from {}", layer.len(), name);
            features.extend(layer.into_iter().map(|f| (name.clone(), f)));
        }

        let index = ChartIndex::build(features.iter().map(|(_, f)| f).enumerate());
        let mut layers = ChartLayers {
            extent: source.extent()?,
            ..ChartLayers::default()
        };
        if layers.extent.is_none() {
            layers.extent = features
                .iter()
                .filter_map(|(_, f)| f.geometry.extent())
                .reduce(Extent::union);
        }

        let mut stats = LoadStats::default();
        for (sequence, (source_name, feature)) in features.iter().enumerate() {
            stats.features += 1;
            self.add_feature(&mut layers, &index, &mut stats, source_name, feature, sequence);
        }
        layers.prune();

        info!(
            "Built {} layer groups from {} features ({} undefined, {} skipped)",
            layers.groups.len(),
            stats.features,
            stats.undefined,
            stats.skipped
        );
        Ok(layers)
    }

    fn add_feature(
        &self,
        layers: &mut ChartLayers,
        index: &ChartIndex,
        stats: &mut LoadStats,
        source: &str,
        feature: &Feature,
        sequence: usize,
    ) {
        if feature.class == "SOUNDG" {
            if let Geometry::Point(at) = feature.geometry {
                self.add_sounding(layers, source, feature, at, stats);
                return;
            }
        }

        let symbolization = symbolize(self.catalog, &self.settings, index, feature, sequence);
        if symbolization.lookup_id.is_none() {
            stats.undefined += 1;
        }
        let bundle = layers.bundle_mut(symbolization.key(source));
        let drawn = match &feature.geometry {
            Geometry::Point(p) => {
                self.add_point(bundle, feature, &symbolization, *p);
                true
            }
            Geometry::LineString(points) => self.add_line(bundle, feature, &symbolization, points),
            Geometry::Polygon(polygon) => self.add_area(bundle, feature, &symbolization, polygon),
        };
        if !drawn {
            stats.skipped += 1;
        }
    }

    fn add_sounding(
        &self,
        layers: &mut ChartLayers,
        source: &str,
        feature: &Feature,
        at: Point,
        stats: &mut LoadStats,
    ) {
        let Some(depth) = sounding_depth(&feature.attributes) else {
            warn!("Sounding at {:?} has no depth, skipped", at);
            stats.skipped += 1;
            return;
        };
        let table = self.settings.table_for(GeometryKind::Point);
        let key = match self
            .catalog
            .find_best_lookup(&feature.class, &feature.attributes, table)
        {
            Some(lookup) => LayerKey {
                priority: lookup.display_priority,
                radar: lookup.radar_priority,
                category: lookup.category,
                source: source.to_string(),
            },
            None => Symbolization::undefined(GeometryKind::Point).key(source),
        };
        layers.bundle_mut(key).sounding.push(
            at,
            depth,
            SoundingFlags::from_attributes(&feature.attributes),
        );
    }

    fn add_point(&self, bundle: &mut LayerBundle, feature: &Feature, sym: &Symbolization, at: Point) {
        let symbols = self.symbols(feature, &sym.instructions);
        bundle.mark.push(at, symbols);
        for arc in &sym.sectors {
            bundle.mark.sectors.push(SectorMark {
                arc: arc.clone(),
                color: self.catalog.color_index(&arc.color),
            });
        }
        self.add_text(bundle, feature, sym, at);
    }

    fn add_line(
        &self,
        bundle: &mut LayerBundle,
        feature: &Feature,
        sym: &Symbolization,
        points: &[Point],
    ) -> bool {
        let (color, style) = self.line_style(&sym.instructions);
        if points.len() < 2 {
            warn!("{} line with {} points skipped", feature.class, points.len());
            return false;
        }
        bundle.line.push([points], color, style);
        if let Some(mid) = geometry::line_midpoint(points) {
            let symbols = self.symbols(feature, &sym.instructions);
            bundle.mark.push(mid, symbols);
            self.add_text(bundle, feature, sym, mid);
        }
        true
    }

    fn add_area(
        &self,
        bundle: &mut LayerBundle,
        feature: &Feature,
        sym: &Symbolization,
        polygon: &Polygon,
    ) -> bool {
        let triangles = match geometry::triangulate(polygon) {
            Ok(triangles) => Some(triangles),
            Err(e) => {
                warn!("{} area not filled: {}", feature.class, e);
                None
            }
        };

        if let Some(triangles) = &triangles {
            let mut color = None;
            let mut transparency = 0;
            let mut pattern = None;
            for instruction in &sym.instructions {
                match instruction {
                    Instruction::AreaColor {
                        color: token,
                        transparency: t,
                    } if color.is_none() => {
                        color = Some(self.catalog.color_index(token));
                        transparency = *t;
                    }
                    Instruction::AreaPattern(name) if pattern.is_none() => {
                        pattern = Some(self.catalog.pattern_index(name));
                    }
                    _ => {}
                }
            }
            bundle.area.push(triangles, color, pattern, transparency);
        }

        let rings: Vec<Vec<Point>> = polygon
            .rings()
            .map(geometry::clean_ring)
            .filter(|r| r.len() >= 2)
            .map(|mut r| {
                r.push(r[0]);
                r
            })
            .collect();
        if rings.is_empty() {
            warn!("{} area has no usable ring, skipped", feature.class);
            return false;
        }
        let (color, style) = self.line_style(&sym.instructions);
        bundle.line.push(rings.iter().map(Vec::as_slice), color, style);

        let anchor = geometry::interior_point(polygon).unwrap_or(rings[0][0]);
        let symbols = self.symbols(feature, &sym.instructions);
        bundle.mark.push(anchor, symbols);
        self.add_text(bundle, feature, sym, anchor);
        true
    }

    /// Outline style: the first `LS` or `LC` instruction.
    fn line_style(&self, instructions: &[Instruction]) -> (u16, LineStyleRef) {
        instructions
            .iter()
            .find_map(|i| match i {
                Instruction::LineStyle {
                    pattern,
                    width,
                    color,
                } => Some((
                    self.catalog.color_index(color),
                    LineStyleRef::Simple {
                        pattern: *pattern,
                        width: *width,
                    },
                )),
                Instruction::LineComplex(name) => Some((
                    UNDEFINED_COLOR_INDEX,
                    LineStyleRef::Complex(self.catalog.line_style_index(name)),
                )),
                _ => None,
            })
            .unwrap_or((UNDEFINED_COLOR_INDEX, LineStyleRef::Hidden))
    }

    /// Symbol index and rotation of every `SY` instruction.
    fn symbols(&self, feature: &Feature, instructions: &[Instruction]) -> SymbolList {
        instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Symbol { name, rotation } => {
                    let degrees = match rotation {
                        None => 0.0,
                        Some(Rotation::Degrees(d)) => *d,
                        Some(Rotation::Attribute(code)) => {
                            feature.attributes.f64(code).unwrap_or(0.0)
                        }
                    };
                    Some((self.catalog.symbol_index(name), degrees))
                }
                _ => None,
            })
            .collect()
    }

    fn add_text(&self, bundle: &mut LayerBundle, feature: &Feature, sym: &Symbolization, at: Point) {
        if let Some(text) = &sym.text {
            bundle.text.push(at, text.clone());
        }
        let mut labelled = false;
        for instruction in &sym.instructions {
            if let Instruction::Text { attribute, format } = instruction {
                if let Some(label) = text_label(feature, attribute, format.as_deref()) {
                    bundle.text.push(at, label);
                    labelled = true;
                }
            }
        }
        if !labelled && TEXT_CLASSES.contains(&feature.class.as_str()) {
            if let Some(AttrValue::Str(name)) = feature.attributes.get("OBJNAM") {
                let name = name.trim();
                if !name.is_empty() {
                    bundle.text.push(at, name.to_string());
                }
            }
        }
    }
}

/// Label of a `TX` or `TE` instruction. A `TE` format is printf style; its
/// first conversion is replaced by the attribute value.
fn text_label(feature: &Feature, attribute: &str, format: Option<&str>) -> Option<String> {
    let value = feature.attributes.get(attribute)?.to_string();
    if value.is_empty() {
        return None;
    }
    let Some(format) = format else {
        return Some(value);
    };
    let Some(start) = format.find('%') else {
        return Some(format.to_string());
    };
    let end = format[start + 1..]
        .find(|c: char| c.is_ascii_alphabetic() && c != 'l')
        .map_or(format.len(), |i| start + 2 + i);
    Some(format!("{}{}{}", &format[..start], value, &format[end..]))
}
