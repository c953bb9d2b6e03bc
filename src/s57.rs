use gdal::Dataset;
use gdal::vector::{Geometry as OgrGeometry, LayerAccess};
use log::{debug, error, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::attribute::Attributes;
use crate::chart::ChartSource;
use crate::error::ChartError;
use crate::feature::{Extent, Feature, Geometry, Point, Polygon};
use crate::util;

/// Layers that carry cell metadata rather than chart objects.
const METADATA_LAYERS: &[&str] = &["DSID"];

/// S-57 metadata extracted from DSID layer
#[derive(Debug, Clone, Default)]
pub struct S57Metadata {
    pub edition: Option<i32>,
    pub update_number: i32,
    pub compilation_scale: i32,
}

/// Extract S-57 metadata from DSID layer, including DSPM_CSCL compilation scale
pub fn extract_metadata(dataset: &Dataset) -> S57Metadata {
    let Ok(mut layer) = dataset.layer_by_name("DSID") else {
        return S57Metadata::default();
    };
    let Some(feature) = layer.features().next() else {
        return S57Metadata::default();
    };

    let mut metadata = S57Metadata::default();
    for (field_name, field_value) in feature.fields() {
        let Some(field_value) = field_value else {
            continue;
        };
        match field_name.to_uppercase().as_str() {
            "EDTN" => metadata.edition = field_value.into_int(),
            "UPDN" => metadata.update_number = field_value.into_int().unwrap_or(0),
            "DSPM_CSCL" => metadata.compilation_scale = field_value.into_int().unwrap_or(0),
            _ => {}
        }
    }
    metadata
}

/// Convert an OGR geometry into chart geometries. Multi-geometries are
/// split into their parts; unsupported types yield nothing.
fn convert_geometry(geometry: &OgrGeometry) -> Vec<Geometry> {
    let points = |g: &OgrGeometry| -> Vec<Point> {
        let mut raw = Vec::new();
        g.get_points(&mut raw);
        raw.into_iter().map(|(x, y, _)| [x, y]).collect()
    };

    match geometry.geometry_name().to_uppercase().as_str() {
        "POINT" => points(geometry)
            .first()
            .map(|p| vec![Geometry::Point(*p)])
            .unwrap_or_default(),
        "LINESTRING" => vec![Geometry::LineString(points(geometry))],
        "POLYGON" => {
            let mut rings = (0..geometry.geometry_count())
                .map(|i| points(&geometry.get_geometry(i)));
            match rings.next() {
                Some(exterior) => {
                    let polygon = rings.fold(Polygon::new(exterior), Polygon::with_hole);
                    vec![Geometry::Polygon(polygon)]
                }
                None => Vec::new(),
            }
        }
        "MULTIPOINT" | "MULTILINESTRING" | "MULTIPOLYGON" | "GEOMETRYCOLLECTION" => (0
            ..geometry.geometry_count())
            .flat_map(|i| convert_geometry(&geometry.get_geometry(i)))
            .collect(),
        other => {
            debug!("Unsupported geometry type {}", other);
            Vec::new()
        }
    }
}

/// Chart source reading an S-57 cell through GDAL's S-57 driver.
pub struct S57Source {
    dataset: Dataset,
    path: PathBuf,
}

impl S57Source {
    pub fn open(path: &Path) -> Result<Self, ChartError> {
        let dataset = Dataset::open(path)?;
        Ok(Self {
            dataset,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> S57Metadata {
        extract_metadata(&self.dataset)
    }
}

impl ChartSource for S57Source {
    fn layer_names(&mut self) -> Result<Vec<String>, ChartError> {
        let mut names = Vec::with_capacity(self.dataset.layer_count());
        for layer_idx in 0..self.dataset.layer_count() {
            let name = self.dataset.layer(layer_idx)?.name();
            if !METADATA_LAYERS.iter().any(|m| name.eq_ignore_ascii_case(m)) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn read_layer(&mut self, name: &str) -> Result<Vec<Feature>, ChartError> {
        let mut layer = self.dataset.layer_by_name(name)?;
        let mut features = Vec::new();

        for ogr_feature in layer.features() {
            let Some(ogr_geometry) = ogr_feature.geometry() else {
                continue;
            };
            let geometries = convert_geometry(ogr_geometry);
            if geometries.is_empty() {
                warn!(
                    "{} feature {:?} has no usable geometry",
                    name,
                    ogr_feature.fid()
                );
                continue;
            }

            let attributes: Attributes = ogr_feature
                .fields()
                .filter_map(|(field_name, value)| {
                    value
                        .as_ref()
                        .and_then(util::field_value_to_attr)
                        .map(|v| (field_name, v))
                })
                .collect();

            for geometry in geometries {
                features.push(Feature::new(name, geometry, attributes.clone()));
            }
        }
        Ok(features)
    }

    /// Union of the `M_COVR` polygons with `CATCOV=1` (coverage available).
    fn extent(&mut self) -> Result<Option<Extent>, ChartError> {
        let Ok(mut layer) = self.dataset.layer_by_name("M_COVR") else {
            return Ok(None);
        };

        let mut extent: Option<Extent> = None;
        for feature in layer.features() {
            let catcov = feature
                .field_index("CATCOV")
                .ok()
                .and_then(|idx| feature.field(idx).ok())
                .flatten()
                .and_then(|v| v.into_int());
            if catcov != Some(1) {
                continue;
            }
            let Some(geometry) = feature.geometry() else {
                debug!("M_COVR feature has empty geometry");
                continue;
            };
            for part in convert_geometry(geometry) {
                if let Some(e) = part.extent() {
                    extent = Some(extent.map_or(e, |acc| acc.union(e)));
                }
            }
        }
        Ok(extent)
    }
}

/// Find S-57 base files (.000) in an ENC directory.
/// Update files (.001+) are automatically applied by GDAL when UPDATES=APPLY is set.
pub fn find_s57_files(enc_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let entries = match fs::read_dir(enc_dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to read directory {:?}: {}", enc_dir, e);
            return files;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|v| v.to_str()) == Some("000") {
            files.push(path);
        }
    }

    files.sort();
    files
}

/// Find all ENC subdirectories under the given root
pub fn find_enc_directories(input_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let entries = match fs::read_dir(input_dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to read input directory {:?}: {}", input_dir, e);
            return dirs;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_s57_files_only_base_cells() {
        let dir = std::env::temp_dir().join(format!("s52chart-enc-{}", std::process::id()));
        let cell = dir.join("US5TEST1");
        fs::create_dir_all(&cell).unwrap();
        for name in ["US5TEST1.000", "US5TEST1.001", "README.TXT"] {
            fs::write(cell.join(name), b"").unwrap();
        }

        assert_eq!(find_enc_directories(&dir), vec![cell.clone()]);
        assert_eq!(find_s57_files(&cell), vec![cell.join("US5TEST1.000")]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_convert_wkt_geometries() {
        let polygon = OgrGeometry::from_wkt(
            "POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0), (1 1, 2 1, 2 2, 1 1))",
        )
        .unwrap();
        match convert_geometry(&polygon).as_slice() {
            [Geometry::Polygon(p)] => {
                assert_eq!(p.exterior.len(), 5);
                assert_eq!(p.holes.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        let soundings = OgrGeometry::from_wkt("MULTIPOINT Z ((1 2 3.5), (4 5 6))").unwrap();
        assert_eq!(
            convert_geometry(&soundings),
            vec![Geometry::Point([1.0, 2.0]), Geometry::Point([4.0, 5.0])]
        );
    }
}
