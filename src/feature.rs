use serde::Serialize;

use crate::attribute::Attributes;

/// Position as `[lon, lat]` in degrees.
pub type Point = [f64; 2];

/// Polygon with optional holes. Rings may or may not repeat their first
/// point at the end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub exterior: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Point>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Point>) -> Self {
        self.holes.push(hole);
        self
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }
}

/// Feature geometry as delivered by the chart reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    Polygon(Polygon),
}

/// Which look-up table family a geometry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Area,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::Line,
            Geometry::Polygon(_) => GeometryKind::Area,
        }
    }

    /// Bounding box, `None` for an empty geometry.
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Geometry::Point(p) => Extent::from_points(std::slice::from_ref(p)),
            Geometry::LineString(points) => Extent::from_points(points),
            Geometry::Polygon(poly) => Extent::from_points(&poly.exterior),
        }
    }
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut extent = Extent {
            min_lon: first[0],
            min_lat: first[1],
            max_lon: first[0],
            max_lat: first[1],
        };
        for p in &points[1..] {
            extent.min_lon = extent.min_lon.min(p[0]);
            extent.min_lat = extent.min_lat.min(p[1]);
            extent.max_lon = extent.max_lon.max(p[0]);
            extent.max_lat = extent.max_lat.max(p[1]);
        }
        Some(extent)
    }

    pub fn union(self, other: Extent) -> Extent {
        Extent {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }
}

/// One chart object: S-57 object class, geometry and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub class: String,
    pub geometry: Geometry,
    pub attributes: Attributes,
}

impl Feature {
    pub fn new(class: impl Into<String>, geometry: Geometry, attributes: Attributes) -> Self {
        Self {
            class: class.into(),
            geometry,
            attributes,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }
}
