//! JSON output of built chart layers.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::catalog::{DisplayCategory, RadarPriority};
use crate::error::ChartError;
use crate::feature::Extent;
use crate::layers::{ChartLayers, LayerBundle, LayerKey};

/// Item counts of one layer group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub source: String,
    pub priority: u8,
    pub category: DisplayCategory,
    pub radar: RadarPriority,
    pub areas: usize,
    pub triangles: usize,
    pub lines: usize,
    pub segments: usize,
    pub marks: usize,
    pub sectors: usize,
    pub labels: usize,
    pub soundings: usize,
    pub uniform_area_color: bool,
    pub uniform_line_color: bool,
    pub uniform_symbol: bool,
}

impl GroupSummary {
    pub fn new(key: &LayerKey, bundle: &LayerBundle) -> Self {
        Self {
            source: key.source.clone(),
            priority: key.priority,
            category: key.category,
            radar: key.radar,
            areas: bundle.area.feature_count(),
            triangles: bundle.area.triangle_count(),
            lines: bundle.line.feature_count(),
            segments: bundle.line.segment_count(),
            marks: bundle.mark.feature_count(),
            sectors: bundle.mark.sectors.len(),
            labels: bundle.text.len(),
            soundings: bundle.sounding.len(),
            uniform_area_color: bundle.area.color.is_uniform(),
            uniform_line_color: bundle.line.color.is_uniform(),
            uniform_symbol: bundle.mark.symbols.is_uniform(),
        }
    }
}

/// Per-cell summary written by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub cell: String,
    pub extent: Option<Extent>,
    pub groups: Vec<GroupSummary>,
}

impl ChartSummary {
    pub fn new(cell: &str, layers: &ChartLayers) -> Self {
        Self {
            cell: cell.to_string(),
            extent: layers.extent,
            groups: layers
                .iter()
                .map(|(key, bundle)| GroupSummary::new(key, bundle))
                .collect(),
        }
    }

    pub fn feature_total(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.areas.max(g.lines) + g.marks + g.soundings)
            .sum()
    }
}

#[derive(Serialize)]
struct ExportGroup<'a> {
    #[serde(flatten)]
    key: &'a LayerKey,
    layers: &'a LayerBundle,
}

/// Full layer dump: every group with its buffers, in draw order.
#[derive(Serialize)]
pub struct ChartExport<'a> {
    cell: &'a str,
    extent: Option<Extent>,
    palette: &'a [[u8; 3]],
    groups: Vec<ExportGroup<'a>>,
}

impl<'a> ChartExport<'a> {
    pub fn new(cell: &'a str, layers: &'a ChartLayers, palette: &'a [[u8; 3]]) -> Self {
        Self {
            cell,
            extent: layers.extent,
            palette,
            groups: layers
                .iter()
                .map(|(key, layers)| ExportGroup { key, layers })
                .collect(),
        }
    }
}

/// Write `value` as pretty JSON to `<dir>/<cell>.<suffix>.json`.
pub fn write_json<T: Serialize>(
    dir: &Path,
    cell: &str,
    suffix: &str,
    value: &T,
) -> Result<PathBuf, ChartError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}.json", cell, suffix));
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, value).map_err(std::io::Error::from)?;
    debug!("Wrote {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::SoundingFlags;
    use serde_json::Value;

    fn layers() -> ChartLayers {
        let mut layers = ChartLayers::default();
        let key = LayerKey {
            priority: 6,
            radar: RadarPriority::Over,
            category: DisplayCategory::Other,
            source: "SOUNDG".into(),
        };
        let bundle = layers.bundle_mut(key);
        bundle.sounding.push([1.0, 2.0], 12.5, SoundingFlags::default());
        bundle.sounding.push([1.5, 2.0], 3.0, SoundingFlags::default());
        layers
    }

    #[test]
    fn test_summary_counts() {
        let summary = ChartSummary::new("US5TEST1", &layers());
        assert_eq!(summary.groups.len(), 1);
        let group = &summary.groups[0];
        assert_eq!(group.source, "SOUNDG");
        assert_eq!(group.soundings, 2);
        assert_eq!(group.marks, 0);
        assert_eq!(summary.feature_total(), 2);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["groups"][0]["category"], "other");
        assert_eq!(json["groups"][0]["radar"], "over");
    }

    #[test]
    fn test_full_export_flattens_key() {
        let layers = layers();
        let palette = [[0u8, 0, 0]];
        let export = ChartExport::new("US5TEST1", &layers, &palette);
        let json: Value = serde_json::to_value(&export).unwrap();
        assert_eq!(json["groups"][0]["source"], "SOUNDG");
        assert_eq!(json["groups"][0]["layers"]["sounding"]["depths"][0], 12.5);
    }

    #[test]
    fn test_write_json() {
        let dir = std::env::temp_dir().join(format!("s52chart-export-{}", std::process::id()));
        let summary = ChartSummary::new("US5TEST1", &layers());
        let path = write_json(&dir, "US5TEST1", "summary", &summary).unwrap();
        assert!(path.ends_with("US5TEST1.summary.json"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"cell\": \"US5TEST1\""));
        fs::remove_dir_all(&dir).unwrap();
    }
}
