//! Render-ready output layers.
//!
//! Coordinates stay in `[lon, lat]` degrees and colors are palette indices,
//! so one set of layers serves every color scheme. Styling that is the same
//! for every item of a layer is stored once ([`Styling::Uniform`]), which
//! lets the renderer skip a per-vertex attribute stream.

use std::collections::BTreeMap;

use serde::Serialize;
use smallvec::SmallVec;

use crate::catalog::{DisplayCategory, LinePattern, RadarPriority};
use crate::feature::{Extent, Point};
use crate::geometry;
use crate::procedures::{SectorArc, SoundingFlags, sounding_glyphs};

/// Uniform or per-item style value.
///
/// The first value seen makes the styling uniform; the first differing
/// value expands it to one value per item, and it never reverts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Styling<T> {
    #[default]
    Unset,
    Uniform { value: T, count: usize },
    PerItem(Vec<T>),
}

impl<T: Clone + PartialEq> Styling<T> {
    pub fn push(&mut self, value: T) {
        match self {
            Styling::Unset => *self = Styling::Uniform { value, count: 1 },
            Styling::Uniform { value: current, count } if *current == value => *count += 1,
            Styling::Uniform { value: current, count } => {
                let mut values = vec![current.clone(); *count];
                values.push(value);
                *self = Styling::PerItem(values);
            }
            Styling::PerItem(values) => values.push(value),
        }
    }

    /// True iff at least one item was recorded and all are identical.
    pub fn is_uniform(&self) -> bool {
        matches!(self, Styling::Uniform { .. })
    }

    pub fn uniform(&self) -> Option<&T> {
        match self {
            Styling::Uniform { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        match self {
            Styling::Unset => None,
            Styling::Uniform { value, count } => (i < *count).then_some(value),
            Styling::PerItem(values) => values.get(i),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Styling::Unset => 0,
            Styling::Uniform { count, .. } => *count,
            Styling::PerItem(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Triangulated fills. One entry of `start_inds`, `color`, `pattern` and
/// `transparency` per feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaLayer {
    /// Flat triangle list, three vertices per triangle.
    pub vertices: Vec<Point>,
    pub start_inds: Vec<u32>,
    /// Fill color; `None` for outline-only areas.
    pub color: Styling<Option<u16>>,
    pub pattern: Styling<Option<u32>>,
    pub transparency: Styling<u8>,
}

impl AreaLayer {
    pub fn push(&mut self, triangles: &[Point], color: Option<u16>, pattern: Option<u32>, transparency: u8) {
        self.start_inds.push(self.vertices.len() as u32);
        self.vertices.extend_from_slice(triangles);
        self.color.push(color);
        self.pattern.push(pattern);
        self.transparency.push(transparency);
    }

    pub fn feature_count(&self) -> usize {
        self.start_inds.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Stroke of a line: a simple pattern with a width in pixels, or a complex
/// line style from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyleRef {
    Simple { pattern: LinePattern, width: u8 },
    Complex(u32),
    /// Outline present for picking only, not stroked.
    Hidden,
}

/// Styled lines as independent segments: points `2k` and `2k + 1` form one
/// segment, and `distances` holds the cumulative distance in metres of
/// every point along its polyline or ring. One entry of `start_inds`,
/// `color` and `style` per feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineLayer {
    pub points: Vec<Point>,
    pub distances: Vec<f64>,
    pub start_inds: Vec<u32>,
    pub color: Styling<u16>,
    pub style: Styling<LineStyleRef>,
}

impl LineLayer {
    /// Add one feature made of one or more polylines.
    pub fn push<'a>(&mut self, parts: impl IntoIterator<Item = &'a [Point]>, color: u16, style: LineStyleRef) {
        self.start_inds.push(self.points.len() as u32);
        for part in parts {
            let (points, distances) = geometry::flatten(part);
            for i in 1..points.len() {
                self.points.push(points[i - 1]);
                self.points.push(points[i]);
                self.distances.push(distances[i - 1]);
                self.distances.push(distances[i]);
            }
        }
        self.color.push(color);
        self.style.push(style);
    }

    pub fn feature_count(&self) -> usize {
        self.start_inds.len()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() / 2
    }
}

/// Sector light arc with its resolved palette index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorMark {
    pub arc: SectorArc,
    pub color: u16,
}

/// Symbols of one point feature: palette-independent symbol index and
/// clockwise rotation in degrees, in drawing order.
pub type SymbolList = SmallVec<[(u32, f64); 4]>;

/// Point symbols. A feature may place several symbols (a hazard symbol
/// plus its sounding digits). `points` holds one entry per placed symbol;
/// `start_inds` and `symbols` hold one entry per feature, so two features
/// with the same symbol list keep the styling uniform.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkLayer {
    pub points: Vec<Point>,
    pub start_inds: Vec<u32>,
    pub symbols: Styling<SymbolList>,
    pub sectors: Vec<SectorMark>,
}

impl MarkLayer {
    /// Add one feature's symbols, all placed at `at`.
    pub fn push(&mut self, at: Point, symbols: SymbolList) {
        if symbols.is_empty() {
            return;
        }
        self.start_inds.push(self.points.len() as u32);
        self.points.extend(std::iter::repeat_n(at, symbols.len()));
        self.symbols.push(symbols);
    }

    pub fn feature_count(&self) -> usize {
        self.start_inds.len()
    }

    /// Symbol list shared by every feature, if there is one.
    pub fn uniform_symbols(&self) -> Option<&[(u32, f64)]> {
        self.symbols.uniform().map(SmallVec::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextLayer {
    pub points: Vec<Point>,
    pub labels: Vec<String>,
}

impl TextLayer {
    pub fn push(&mut self, at: Point, label: String) {
        self.points.push(at);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Soundings with their raw depth in metres. Digit glyphs are composed on
/// demand with [`SoundingLayer::glyphs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SoundingLayer {
    pub points: Vec<Point>,
    pub depths: Vec<f64>,
    pub flags: Vec<SoundingFlags>,
}

impl SoundingLayer {
    pub fn push(&mut self, at: Point, depth: f64, flags: SoundingFlags) {
        self.points.push(at);
        self.depths.push(depth);
        self.flags.push(flags);
    }

    pub fn glyphs(&self, i: usize, safety_depth: f64) -> Option<Vec<String>> {
        let depth = *self.depths.get(i)?;
        let flags = *self.flags.get(i)?;
        Some(sounding_glyphs(depth, flags, safety_depth))
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

/// The five typed layers of one source layer at one draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerBundle {
    pub area: AreaLayer,
    pub line: LineLayer,
    pub mark: MarkLayer,
    pub text: TextLayer,
    pub sounding: SoundingLayer,
}

impl LayerBundle {
    pub fn is_empty(&self) -> bool {
        self.area.feature_count() == 0
            && self.line.feature_count() == 0
            && self.mark.feature_count() == 0
            && self.mark.sectors.is_empty()
            && self.text.is_empty()
            && self.sounding.is_empty()
    }
}

/// Draw order key. Groups sort by display priority first; lower priorities
/// are drawn first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayerKey {
    pub priority: u8,
    pub radar: RadarPriority,
    pub category: DisplayCategory,
    /// Source layer (object class) name.
    pub source: String,
}

/// Every layer built from one chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartLayers {
    pub extent: Option<Extent>,
    pub groups: BTreeMap<LayerKey, LayerBundle>,
}

impl ChartLayers {
    pub fn bundle_mut(&mut self, key: LayerKey) -> &mut LayerBundle {
        self.groups.entry(key).or_default()
    }

    /// Groups in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (&LayerKey, &LayerBundle)> {
        self.groups.iter()
    }

    /// All groups built from one source layer.
    pub fn source<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (&'a LayerKey, &'a LayerBundle)> + 'a {
        self.groups.iter().filter(move |(k, _)| k.source == name)
    }

    /// Groups visible at a display level: display base only, standard
    /// (base + standard), or everything.
    pub fn visible(&self, level: DisplayCategory) -> impl Iterator<Item = (&LayerKey, &LayerBundle)> {
        self.groups.iter().filter(move |(k, _)| k.category <= level)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(LayerBundle::is_empty)
    }

    pub(crate) fn prune(&mut self) {
        self.groups.retain(|_, bundle| !bundle.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_styling_expands_once() {
        let mut styling = Styling::default();
        assert!(!styling.is_uniform());
        styling.push(3u16);
        styling.push(3);
        assert_eq!(styling.uniform(), Some(&3));
        assert_eq!(styling.len(), 2);
        styling.push(5);
        assert_eq!(styling, Styling::PerItem(vec![3, 3, 5]));
        // Identical values after expansion do not make it uniform again.
        styling.push(5);
        styling.push(5);
        assert!(!styling.is_uniform());
        assert_eq!(styling.get(0), Some(&3));
        assert_eq!(styling.get(4), Some(&5));
        assert_eq!(styling.get(5), None);
    }

    #[test]
    fn test_line_layer_segments() {
        let mut layer = LineLayer::default();
        let line = [[0.0, 0.0], [0.0, 1.0], [0.0, 2.0]];
        layer.push([&line[..]], 4, LineStyleRef::Simple { pattern: LinePattern::Solid, width: 1 });
        let ring = [[1.0, 1.0], [2.0, 1.0], [1.0, 1.0]];
        let hole = [[1.2, 1.0], [1.4, 1.0]];
        layer.push([&ring[..], &hole[..]], 4, LineStyleRef::Complex(2));

        assert_eq!(layer.start_inds, vec![0, 4]);
        assert_eq!(layer.segment_count(), 2 + 2 + 1);
        assert_eq!(layer.distances[0], 0.0);
        assert_eq!(layer.distances[1], layer.distances[2]);
        assert!(layer.distances[3] > layer.distances[2]);
        // Every part starts its own distance count.
        assert_eq!(layer.distances[8], 0.0);
        assert!(layer.color.is_uniform());
        assert!(!layer.style.is_uniform());
    }

    #[test]
    fn test_mark_layer_points_per_feature() {
        let mut layer = MarkLayer::default();
        layer.push([0.0, 0.0], smallvec![(1, 0.0), (7, 0.0), (8, 0.0)]);
        layer.push([1.0, 1.0], SymbolList::new());
        layer.push([2.0, 2.0], smallvec![(1, 135.0)]);
        assert_eq!(layer.start_inds, vec![0, 3]);
        assert_eq!(layer.points.len(), 4);
        assert_eq!(layer.symbols.len(), 2);
        assert!(!layer.symbols.is_uniform());
        assert_eq!(layer.symbols.get(1).map(|s| s[0]), Some((1, 135.0)));
    }

    #[test]
    fn test_identical_multi_symbol_features_stay_uniform() {
        let mut layer = MarkLayer::default();
        let hazard: SymbolList = smallvec![(7, 0.0), (0, 0.0)];
        layer.push([0.0, 0.0], hazard.clone());
        layer.push([1.0, 0.0], hazard.clone());
        assert_eq!(layer.start_inds, vec![0, 2]);
        assert_eq!(layer.points.len(), 4);
        assert_eq!(layer.uniform_symbols(), Some(hazard.as_slice()));

        layer.push([2.0, 0.0], smallvec![(7, 0.0)]);
        assert!(layer.uniform_symbols().is_none());
        assert_eq!(layer.symbols.get(1), Some(&hazard));
    }

    #[test]
    fn test_visibility_levels() {
        let mut layers = ChartLayers::default();
        for (priority, category) in [
            (8, DisplayCategory::DisplayBase),
            (3, DisplayCategory::Standard),
            (1, DisplayCategory::Other),
        ] {
            let key = LayerKey {
                priority,
                radar: RadarPriority::Suppressed,
                category,
                source: "DEPARE".into(),
            };
            layers.bundle_mut(key).text.push([0.0, 0.0], "x".into());
        }
        assert_eq!(layers.visible(DisplayCategory::DisplayBase).count(), 1);
        assert_eq!(layers.visible(DisplayCategory::Standard).count(), 2);
        assert_eq!(layers.visible(DisplayCategory::Other).count(), 3);
        let priorities: Vec<u8> = layers.iter().map(|(k, _)| k.priority).collect();
        assert_eq!(priorities, vec![1, 3, 8]);
        assert_eq!(layers.source("DEPARE").count(), 3);
    }
}
