//! Serialized form of the presentation library.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDocument {
    pub color_tables: Vec<ColorTableDoc>,
    pub lookups: Vec<LookUpDoc>,
    #[serde(default)]
    pub symbols: Vec<GraphicDoc>,
    #[serde(default)]
    pub patterns: Vec<GraphicDoc>,
    #[serde(default)]
    pub line_styles: Vec<GraphicDoc>,
}

/// One color scheme: color token to `#RRGGBB`.
#[derive(Debug, Deserialize)]
pub struct ColorTableDoc {
    pub name: String,
    pub colors: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookUpDoc {
    pub id: i32,
    pub class: String,
    pub kind: String,
    pub table: String,
    pub priority: u8,
    #[serde(default = "default_radar")]
    pub radar: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    pub category: String,
}

fn default_radar() -> String {
    "S".to_string()
}

/// Symbol, area pattern or complex line style bitmap definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicDoc {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub pivot_x: i32,
    #[serde(default)]
    pub pivot_y: i32,
    #[serde(default)]
    pub min_dist: f64,
    #[serde(default)]
    pub max_dist: f64,
}
