//! Read-only spatial index of one chart, built before any conditional
//! procedure runs. This is the only way procedures see sibling features.

use std::collections::{HashMap, HashSet};

use rstar::{AABB, RTree, RTreeObject};

use crate::feature::{Feature, Geometry, GeometryKind, Point};
use crate::geometry;

/// Classes whose position makes a co-located topmark "floating".
const FLOATING_CLASSES: &[&str] = &[
    "BOYCAR", "BOYINB", "BOYISD", "BOYLAT", "BOYSAW", "BOYSPP", "LITFLT", "LITVES",
];

const CONTOUR_TOLERANCE: f64 = 1e-6;

/// Depth area, dredged area or depth contour, with its depth range.
#[derive(Debug, Clone)]
pub struct DepthFeature {
    pub class: String,
    pub kind: GeometryKind,
    /// `DRVAL1`, or `VALDCO` for contours.
    pub drval1: Option<f64>,
    pub drval2: Option<f64>,
    pub geometry: Geometry,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for DepthFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn position_key(p: Point) -> [u64; 2] {
    [p[0].to_bits(), p[1].to_bits()]
}

#[derive(Default)]
pub struct ChartIndex {
    depth_features: RTree<DepthFeature>,
    contours: Vec<f64>,
    lights: HashMap<[u64; 2], Vec<usize>>,
    floating: HashSet<[u64; 2]>,
}

impl ChartIndex {
    /// Build the index from every feature of a chart, numbered in reading
    /// order.
    pub fn build<'a>(features: impl IntoIterator<Item = (usize, &'a Feature)>) -> Self {
        let mut depth_features = Vec::new();
        let mut contours = Vec::new();
        let mut lights: HashMap<[u64; 2], Vec<usize>> = HashMap::new();
        let mut floating = HashSet::new();

        for (seq, feature) in features {
            let attrs = &feature.attributes;
            match (feature.class.as_str(), &feature.geometry) {
                ("DEPARE" | "DRGARE", _) => {
                    if let Some(extent) = feature.geometry.extent() {
                        depth_features.push(DepthFeature {
                            class: feature.class.clone(),
                            kind: feature.kind(),
                            drval1: attrs.f64("DRVAL1"),
                            drval2: attrs.f64("DRVAL2"),
                            geometry: feature.geometry.clone(),
                            envelope: AABB::from_corners(
                                [extent.min_lon, extent.min_lat],
                                [extent.max_lon, extent.max_lat],
                            ),
                        });
                    }
                }
                ("DEPCNT", Geometry::LineString(_)) => {
                    let valdco = attrs.f64("VALDCO");
                    if let Some(v) = valdco {
                        contours.push(v);
                    }
                    if let Some(extent) = feature.geometry.extent() {
                        depth_features.push(DepthFeature {
                            class: feature.class.clone(),
                            kind: GeometryKind::Line,
                            drval1: valdco,
                            drval2: valdco,
                            geometry: feature.geometry.clone(),
                            envelope: AABB::from_corners(
                                [extent.min_lon, extent.min_lat],
                                [extent.max_lon, extent.max_lat],
                            ),
                        });
                    }
                }
                ("LIGHTS", Geometry::Point(p)) => {
                    lights.entry(position_key(*p)).or_default().push(seq);
                }
                (class, Geometry::Point(p)) if FLOATING_CLASSES.contains(&class) => {
                    floating.insert(position_key(*p));
                }
                _ => {}
            }
        }

        contours.sort_by(f64::total_cmp);
        contours.dedup_by(|a, b| (*a - *b).abs() < CONTOUR_TOLERANCE);

        ChartIndex {
            depth_features: RTree::bulk_load(depth_features),
            contours,
            lights,
            floating,
        }
    }

    /// Depth areas, dredged areas and contours intersecting `geometry`.
    pub fn depth_features_intersecting<'a>(
        &'a self,
        geometry: &'a Geometry,
    ) -> impl Iterator<Item = &'a DepthFeature> + 'a {
        let envelope = geometry
            .extent()
            .map(|e| AABB::from_corners([e.min_lon, e.min_lat], [e.max_lon, e.max_lat]));
        envelope
            .into_iter()
            .flat_map(move |env| self.depth_features.locate_in_envelope_intersecting(&env))
            .filter(move |candidate| geometry::intersects(&candidate.geometry, geometry))
    }

    /// Contour values present in the chart, ascending.
    pub fn contour_values(&self) -> &[f64] {
        &self.contours
    }

    /// The contour drawn as safety contour: the one at `safety_depth` if the
    /// chart has it, otherwise the next deeper contour present.
    pub fn safety_contour(&self, safety_depth: f64) -> Option<f64> {
        self.contours
            .iter()
            .copied()
            .find(|c| *c >= safety_depth - CONTOUR_TOLERANCE)
    }

    pub fn is_safety_contour(&self, value: f64, safety_depth: f64) -> bool {
        self.safety_contour(safety_depth)
            .is_some_and(|c| (c - value).abs() < CONTOUR_TOLERANCE)
    }

    /// Whether the light numbered `seq` is the first light read at `p`.
    pub fn is_first_light_at(&self, p: Point, seq: usize) -> bool {
        self.lights
            .get(&position_key(p))
            .and_then(|seqs| seqs.first())
            .is_none_or(|first| *first == seq)
    }

    /// Whether a buoy, light float or light vessel sits at `p`.
    pub fn floating_at(&self, p: Point) -> bool {
        self.floating.contains(&position_key(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrValue, Attributes};
    use crate::feature::Polygon;

    fn contour(value: f64) -> Feature {
        Feature::new(
            "DEPCNT",
            Geometry::LineString(vec![[0.0, 0.0], [1.0, 1.0]]),
            Attributes::new().with("VALDCO", AttrValue::Float(value)),
        )
    }

    #[test]
    fn test_safety_contour_selection() {
        let features = [contour(5.0), contour(10.0), contour(20.0), contour(10.0)];
        let index = ChartIndex::build(features.iter().enumerate());
        assert_eq!(index.contour_values(), &[5.0, 10.0, 20.0]);
        assert_eq!(index.safety_contour(10.0), Some(10.0));
        assert_eq!(index.safety_contour(12.0), Some(20.0));
        assert_eq!(index.safety_contour(25.0), None);
        assert!(index.is_safety_contour(20.0, 15.0));
        assert!(!index.is_safety_contour(10.0, 15.0));
    }

    #[test]
    fn test_depth_area_query() {
        let area = Feature::new(
            "DEPARE",
            Geometry::Polygon(Polygon::new(vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]])),
            Attributes::new()
                .with("DRVAL1", AttrValue::Float(5.0))
                .with("DRVAL2", AttrValue::Float(10.0)),
        );
        let index = ChartIndex::build([(0, &area)]);
        let inside = Geometry::Point([1.0, 1.0]);
        let hits: Vec<_> = index.depth_features_intersecting(&inside).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].drval1, Some(5.0));
        let outside = Geometry::Point([3.0, 1.0]);
        assert_eq!(index.depth_features_intersecting(&outside).count(), 0);
    }

    #[test]
    fn test_co_located_lights_and_buoys() {
        let light = |p| Feature::new("LIGHTS", Geometry::Point(p), Attributes::new());
        let buoy = Feature::new("BOYLAT", Geometry::Point([1.0, 1.0]), Attributes::new());
        let features = [light([1.0, 1.0]), buoy, light([1.0, 1.0]), light([2.0, 2.0])];
        let index = ChartIndex::build(features.iter().enumerate());
        assert!(index.is_first_light_at([1.0, 1.0], 0));
        assert!(!index.is_first_light_at([1.0, 1.0], 2));
        assert!(index.is_first_light_at([2.0, 2.0], 3));
        assert!(index.floating_at([1.0, 1.0]));
        assert!(!index.floating_at([2.0, 2.0]));
    }
}
