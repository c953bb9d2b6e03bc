//! Geometry preparation: polygon triangulation, polyline flattening with
//! cumulative distances, and the `geo` conversions behind the intersection
//! and anchor queries of the conditional procedures.

use geo::{Centroid, Contains, InteriorPoint, Intersects, LineString};

use crate::error::GeometryError;
use crate::feature::{Geometry, Point, Polygon};

/// Earth radius in metres used by [`distance`].
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Local equirectangular distance in metres between two `[lon, lat]`
/// positions.
///
/// This is deliberately not a haversine: distance based decisions must stay
/// identical to the reference behaviour.
pub fn distance(a: Point, b: Point) -> f64 {
    let (lon1, lat1) = (a[0], a[1]);
    let (lon2, lat2) = (b[0], b[1]);
    let y = -EARTH_RADIUS * (lat1 - lat2).to_radians();
    let x = EARTH_RADIUS * lat2.to_radians().cos() * (lon1 - lon2).to_radians();
    (x * x + y * y).sqrt()
}

/// Ordered points of a polyline together with the cumulative distance of
/// each point from the first one. The first distance is exactly zero.
pub fn flatten(points: &[Point]) -> (Vec<Point>, Vec<f64>) {
    let mut distances = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            total += distance(points[i - 1], *p);
        }
        distances.push(total);
    }
    (points.to_vec(), distances)
}

/// Remove consecutive duplicates and the closing point of a ring.
pub fn clean_ring(ring: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Shoelace area, positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a[0] * b[1] - b[0] * a[1];
    }
    sum / 2.0
}

/// Area of a flat triangle vertex list as produced by [`triangulate`].
pub fn triangles_area(vertices: &[Point]) -> f64 {
    vertices
        .chunks_exact(3)
        .map(|t| signed_area(t).abs())
        .sum()
}

fn oriented(ring: &[Point], ccw: bool) -> Vec<Point> {
    let mut ring = ring.to_vec();
    if (signed_area(&ring) > 0.0) != ccw {
        ring.reverse();
    }
    ring
}

/// Triangulate a polygon with holes into a flat triangle vertex list.
///
/// The exterior ring is forced counter-clockwise and holes clockwise. A ring
/// with fewer than three distinct points fails the whole polygon.
pub fn triangulate(polygon: &Polygon) -> Result<Vec<Point>, GeometryError> {
    let mut rings = Vec::with_capacity(1 + polygon.holes.len());
    for (i, ring) in polygon.rings().enumerate() {
        let cleaned = clean_ring(ring);
        if cleaned.len() < 3 {
            return Err(GeometryError::DegenerateRing {
                ring: i,
                points: cleaned.len(),
            });
        }
        rings.push(oriented(&cleaned, i == 0));
    }

    let mut coords: Vec<f64> = Vec::new();
    let mut hole_indices = Vec::with_capacity(rings.len() - 1);
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            hole_indices.push(coords.len() / 2);
        }
        for p in ring {
            coords.push(p[0]);
            coords.push(p[1]);
        }
    }

    let indices = earcutr::earcut(&coords, &hole_indices, 2)
        .map_err(|e| GeometryError::Triangulation(format!("{:?}", e)))?;
    if indices.is_empty() {
        return Err(GeometryError::Triangulation("no triangles produced".into()));
    }

    Ok(indices
        .into_iter()
        .map(|i| [coords[2 * i], coords[2 * i + 1]])
        .collect())
}

/// A point inside the polygon suitable for centred symbols and labels:
/// the centroid when the polygon contains it, otherwise an interior point.
pub fn interior_point(polygon: &Polygon) -> Option<Point> {
    let shape = to_geo_polygon(polygon);
    shape
        .centroid()
        .filter(|c| shape.contains(c))
        .or_else(|| shape.interior_point())
        .map(|p| [p.x(), p.y()])
}

/// Point halfway along a polyline, by cumulative distance.
pub fn line_midpoint(points: &[Point]) -> Option<Point> {
    let (points, distances) = flatten(points);
    let half = distances.last()? / 2.0;
    for i in 1..points.len() {
        if distances[i] >= half {
            let span = distances[i] - distances[i - 1];
            let t = if span > 0.0 {
                (half - distances[i - 1]) / span
            } else {
                0.0
            };
            let (a, b) = (points[i - 1], points[i]);
            return Some([a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]);
        }
    }
    points.first().copied()
}

fn to_geo_ring(ring: &[Point]) -> LineString<f64> {
    LineString::from(ring.to_vec())
}

pub fn to_geo_polygon(polygon: &Polygon) -> geo::Polygon<f64> {
    geo::Polygon::new(
        to_geo_ring(&polygon.exterior),
        polygon.holes.iter().map(|h| to_geo_ring(h)).collect(),
    )
}

pub fn to_geo(geometry: &Geometry) -> geo::Geometry<f64> {
    match geometry {
        Geometry::Point(p) => geo::Geometry::Point(geo::Point::from(*p)),
        Geometry::LineString(line) => geo::Geometry::LineString(to_geo_ring(line)),
        Geometry::Polygon(polygon) => geo::Geometry::Polygon(to_geo_polygon(polygon)),
    }
}

/// Geometric intersection test between two chart geometries. Touching
/// boundaries intersect; a point inside a hole does not.
pub fn intersects(a: &Geometry, b: &Geometry) -> bool {
    match (a.extent(), b.extent()) {
        (Some(ea), Some(eb)) if ea.intersects(&eb) => to_geo(a).intersects(&to_geo(b)),
        _ => false,
    }
}
