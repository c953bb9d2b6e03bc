//! Reference catalog built from the S-52 presentation library.
//!
//! The catalog is built once, then shared read-only (`Arc<Catalog>`) by any
//! number of chart builders. It owns:
//! - the color tables of every scheme plus one process-wide palette index,
//!   so geometry buffers carry scheme independent color indices;
//! - the look-up rows, grouped by object class and table category in
//!   declaration order;
//! - symbol, pattern and complex line style definitions, pre-packed into
//!   atlas layouts.

pub mod atlas;
pub mod document;
pub mod instruction;
pub mod lookup;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};

pub use self::atlas::{Atlas, AtlasEntry};
pub use self::instruction::{Instruction, LinePattern, Rotation};
pub use self::lookup::{DisplayCategory, LookUp, RadarPriority, TableCategory};

use self::document::{GraphicDoc, LibraryDocument, LookUpDoc};
use self::lookup::AttrConstraint;
use crate::attribute::Attributes;
use crate::error::CatalogError;
use crate::feature::GeometryKind;

/// Color token reserved for anything the catalog cannot resolve.
pub const UNDEFINED_COLOR: &str = "CHMGD";
/// Symbol reserved for features without a matching look-up.
pub const UNDEFINED_SYMBOL: &str = "QUESMRK1";
/// Palette index of [`UNDEFINED_COLOR`].
pub const UNDEFINED_COLOR_INDEX: u16 = 0;
/// Index of [`UNDEFINED_SYMBOL`] in the symbol, pattern and line style tables.
pub const UNDEFINED_GRAPHIC_INDEX: u32 = 0;

const UNDEFINED_RGB: [u8; 3] = [255, 0, 255];
const ATLAS_WIDTH: u32 = 1024;

#[derive(Debug, Clone)]
pub struct ColorTable {
    pub name: String,
    colors: HashMap<String, [u8; 3]>,
}

impl ColorTable {
    pub fn rgb(&self, token: &str) -> Option<[u8; 3]> {
        self.colors.get(token).copied()
    }
}

/// Size, pivot and legibility range of a symbol, pattern or line style.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicDef {
    pub name: String,
    pub size: [u32; 2],
    pub pivot: [i32; 2],
    pub min_dist: f64,
    pub max_dist: f64,
}

impl From<&GraphicDoc> for GraphicDef {
    fn from(doc: &GraphicDoc) -> Self {
        GraphicDef {
            name: doc.name.clone(),
            size: [doc.width, doc.height],
            pivot: [doc.pivot_x, doc.pivot_y],
            min_dist: doc.min_dist,
            max_dist: doc.max_dist,
        }
    }
}

/// Indexed graphic definitions with their atlas layout. Index 0 is always
/// [`UNDEFINED_SYMBOL`].
#[derive(Debug, Clone)]
pub struct GraphicTable {
    defs: Vec<GraphicDef>,
    indices: HashMap<String, u32>,
    atlas: Atlas,
}

impl GraphicTable {
    fn build(kind: &'static str, docs: &[GraphicDoc]) -> Result<Self, CatalogError> {
        let mut defs = Vec::with_capacity(docs.len() + 1);
        let mut indices = HashMap::with_capacity(docs.len() + 1);

        let undefined = docs
            .iter()
            .find(|d| d.name == UNDEFINED_SYMBOL)
            .map(GraphicDef::from)
            .unwrap_or_else(|| GraphicDef {
                name: UNDEFINED_SYMBOL.to_string(),
                size: [0, 0],
                pivot: [0, 0],
                min_dist: 0.0,
                max_dist: 0.0,
            });
        indices.insert(undefined.name.clone(), UNDEFINED_GRAPHIC_INDEX);
        defs.push(undefined);

        for doc in docs.iter().filter(|d| d.name != UNDEFINED_SYMBOL) {
            if indices.contains_key(&doc.name) {
                return Err(CatalogError::Duplicate {
                    kind,
                    name: doc.name.clone(),
                });
            }
            indices.insert(doc.name.clone(), defs.len() as u32);
            defs.push(GraphicDef::from(doc));
        }

        let atlas = Atlas::pack(
            defs.iter()
                .filter(|d| d.size[0] > 0 && d.size[1] > 0)
                .map(|d| (d.name.as_str(), d.size)),
            ATLAS_WIDTH,
        );

        Ok(GraphicTable {
            defs,
            indices,
            atlas,
        })
    }

    pub fn index(&self, name: &str) -> Option<u32> {
        self.indices.get(name).copied()
    }

    /// Index of `name`, or the undefined graphic.
    pub fn index_or_undefined(&self, name: &str) -> u32 {
        self.index(name).unwrap_or(UNDEFINED_GRAPHIC_INDEX)
    }

    pub fn get(&self, name: &str) -> Option<&GraphicDef> {
        self.index(name).map(|i| &self.defs[i as usize])
    }

    pub fn by_index(&self, index: u32) -> Option<&GraphicDef> {
        self.defs.get(index as usize)
    }

    pub fn location(&self, name: &str) -> Option<AtlasEntry> {
        self.atlas.get(name)
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[derive(Debug)]
pub struct Catalog {
    schemes: Vec<ColorTable>,
    palette: Vec<String>,
    color_indices: HashMap<String, u16>,
    lookups: HashMap<(String, TableCategory), Vec<LookUp>>,
    lookup_count: usize,
    symbols: GraphicTable,
    patterns: GraphicTable,
    line_styles: GraphicTable,
}

impl Catalog {
    /// Load and index a presentation library document from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!(
            "Loaded presentation library {:?}: {} look-ups, {} colors, {} symbols",
            path,
            catalog.lookup_count,
            catalog.palette.len(),
            catalog.symbols.len()
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: LibraryDocument = serde_json::from_str(json)?;
        Self::from_document(&doc)
    }

    pub fn from_document(doc: &LibraryDocument) -> Result<Self, CatalogError> {
        if doc.color_tables.is_empty() {
            return Err(CatalogError::NoColorTables);
        }

        let mut schemes = Vec::with_capacity(doc.color_tables.len());
        for table in &doc.color_tables {
            if schemes.iter().any(|s: &ColorTable| s.name == table.name) {
                return Err(CatalogError::Duplicate {
                    kind: "color table",
                    name: table.name.clone(),
                });
            }
            let mut colors = HashMap::with_capacity(table.colors.len());
            for (token, hex) in &table.colors {
                let rgb = parse_hex(hex).ok_or_else(|| CatalogError::InvalidColor {
                    table: table.name.clone(),
                    token: token.clone(),
                    value: hex.clone(),
                })?;
                colors.insert(token.clone(), rgb);
            }
            schemes.push(ColorTable {
                name: table.name.clone(),
                colors,
            });
        }

        // Palette: undefined first, then every token of every scheme in
        // sorted order, so indices do not depend on which scheme is active.
        let mut tokens: Vec<&String> = doc
            .color_tables
            .iter()
            .flat_map(|t| t.colors.keys())
            .filter(|t| t.as_str() != UNDEFINED_COLOR)
            .collect();
        tokens.sort();
        tokens.dedup();
        let mut palette = vec![UNDEFINED_COLOR.to_string()];
        palette.extend(tokens.into_iter().cloned());
        let color_indices = palette
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u16))
            .collect();

        let mut lookups: HashMap<(String, TableCategory), Vec<LookUp>> = HashMap::new();
        for row in &doc.lookups {
            let lookup = parse_lookup(row)?;
            lookups
                .entry((lookup.class.clone(), lookup.table))
                .or_default()
                .push(lookup);
        }

        let catalog = Catalog {
            schemes,
            palette,
            color_indices,
            lookups,
            lookup_count: doc.lookups.len(),
            symbols: GraphicTable::build("symbol", &doc.symbols)?,
            patterns: GraphicTable::build("pattern", &doc.patterns)?,
            line_styles: GraphicTable::build("line style", &doc.line_styles)?,
        };
        debug!(
            "Catalog atlases: symbols {:?}, patterns {:?}",
            catalog.symbols.atlas().dimensions(),
            catalog.patterns.atlas().dimensions()
        );
        Ok(catalog)
    }

    /// Best-matching look-up row: the first row, in declaration order, whose
    /// constraints are all satisfied. `None` is the "no match" sentinel.
    pub fn find_best_lookup(
        &self,
        class: &str,
        attrs: &Attributes,
        table: TableCategory,
    ) -> Option<&LookUp> {
        let rows = self.lookups.get(&(class.to_string(), table))?;
        lookup::best_match(rows, attrs)
    }

    /// All rows for a class and table, in declaration order.
    pub fn lookups(&self, class: &str, table: TableCategory) -> &[LookUp] {
        self.lookups
            .get(&(class.to_string(), table))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn lookup_count(&self) -> usize {
        self.lookup_count
    }

    /// Palette index of a color token; unknown tokens map to the undefined
    /// color.
    pub fn color_index(&self, token: &str) -> u16 {
        self.color_indices
            .get(token)
            .copied()
            .unwrap_or(UNDEFINED_COLOR_INDEX)
    }

    pub fn has_color(&self, token: &str) -> bool {
        self.color_indices.contains_key(token)
    }

    pub fn color_token(&self, index: u16) -> Option<&str> {
        self.palette.get(index as usize).map(String::as_str)
    }

    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.schemes.iter().map(|s| s.name.as_str())
    }

    pub fn has_scheme(&self, name: &str) -> bool {
        self.scheme(name).is_some()
    }

    pub fn scheme(&self, name: &str) -> Option<&ColorTable> {
        self.schemes.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Index to RGB table of one scheme. Tokens the scheme does not define
    /// resolve to its undefined color.
    pub fn palette(&self, scheme: &str) -> Result<Vec<[u8; 3]>, CatalogError> {
        let table = self
            .scheme(scheme)
            .ok_or_else(|| CatalogError::UnknownScheme(scheme.to_string()))?;
        let undefined = table.rgb(UNDEFINED_COLOR).unwrap_or(UNDEFINED_RGB);
        Ok(self
            .palette
            .iter()
            .map(|token| table.rgb(token).unwrap_or(undefined))
            .collect())
    }

    pub fn symbols(&self) -> &GraphicTable {
        &self.symbols
    }

    pub fn patterns(&self) -> &GraphicTable {
        &self.patterns
    }

    pub fn line_styles(&self) -> &GraphicTable {
        &self.line_styles
    }

    pub fn symbol_index(&self, name: &str) -> u32 {
        self.symbols.index_or_undefined(name)
    }

    pub fn symbol_dim(&self, name: &str) -> Option<[u32; 2]> {
        self.symbols.get(name).map(|d| d.size)
    }

    pub fn symbol_pivot(&self, name: &str) -> Option<[i32; 2]> {
        self.symbols.get(name).map(|d| d.pivot)
    }

    pub fn pattern_index(&self, name: &str) -> u32 {
        self.patterns.index_or_undefined(name)
    }

    /// Location of a pattern inside the scheme's pattern atlas. All schemes
    /// share one layout; only the pixels differ.
    pub fn pattern_location(&self, scheme: &str, name: &str) -> Option<AtlasEntry> {
        self.scheme(scheme)?;
        self.patterns.location(name)
    }

    pub fn pattern_size(&self, scheme: &str, name: &str) -> Option<[u32; 2]> {
        self.pattern_location(scheme, name).map(|e| e.size)
    }

    pub fn line_style_index(&self, name: &str) -> u32 {
        self.line_styles.index_or_undefined(name)
    }
}

fn parse_lookup(row: &LookUpDoc) -> Result<LookUp, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidLookUp { id: row.id, reason };

    let kind = match row.kind.to_ascii_lowercase().as_str() {
        "point" => GeometryKind::Point,
        "line" => GeometryKind::Line,
        "area" => GeometryKind::Area,
        other => return Err(invalid(format!("unknown geometry kind '{}'", other))),
    };
    let table = TableCategory::parse(&row.table)
        .ok_or_else(|| invalid(format!("unknown table '{}'", row.table)))?;
    let category = DisplayCategory::parse(&row.category)
        .ok_or_else(|| invalid(format!("unknown display category '{}'", row.category)))?;
    let radar_priority = RadarPriority::parse(&row.radar)
        .ok_or_else(|| invalid(format!("unknown radar priority '{}'", row.radar)))?;
    let constraints = row
        .attributes
        .iter()
        .map(|a| {
            AttrConstraint::parse(a).ok_or_else(|| invalid(format!("bad attribute '{}'", a)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let instructions = instruction::parse_instructions(&row.instructions)?;

    let lookup = LookUp {
        id: row.id,
        class: row.class.clone(),
        kind,
        table,
        display_priority: row.priority,
        radar_priority,
        constraints,
        instructions,
        category,
    };
    lookup.validate()?;
    Ok(lookup)
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttrValue;

    const LIBRARY: &str = r##"{
        "colorTables": [
            {"name": "DAY_BRIGHT", "colors": {"DEPVS": "#61B7FF", "DEPDW": "#FFFFFF", "CHMGD": "#C045D1"}},
            {"name": "NIGHT", "colors": {"DEPVS": "#0A1A2B", "DEPDW": "#000000", "LANDA": "#1E1606"}}
        ],
        "lookups": [
            {"id": 10, "class": "DEPARE", "kind": "area", "table": "PLAIN_BOUNDARIES",
             "priority": 1, "attributes": ["DRVAL1"], "instructions": "CS(DEPARE02)", "category": "DISPLAYBASE"},
            {"id": 11, "class": "DEPARE", "kind": "area", "table": "PLAIN_BOUNDARIES",
             "priority": 1, "instructions": "AC(DEPDW)", "category": "DISPLAYBASE"}
        ],
        "symbols": [
            {"name": "LIGHTS11", "width": 20, "height": 40, "pivotX": 2, "pivotY": 38},
            {"name": "QUESMRK1", "width": 10, "height": 10}
        ],
        "patterns": [{"name": "DIAMOND1", "width": 32, "height": 32}]
    }"##;

    #[test]
    fn test_palette_is_scheme_independent() {
        let catalog = Catalog::from_json(LIBRARY).unwrap();
        assert_eq!(catalog.color_index("CHMGD"), UNDEFINED_COLOR_INDEX);
        assert_eq!(catalog.color_index("NOSUCH"), UNDEFINED_COLOR_INDEX);
        let depvs = catalog.color_index("DEPVS");
        assert_ne!(depvs, UNDEFINED_COLOR_INDEX);
        assert_eq!(catalog.color_token(depvs), Some("DEPVS"));

        let day = catalog.palette("DAY_BRIGHT").unwrap();
        let night = catalog.palette("night").unwrap();
        assert_eq!(day.len(), night.len());
        assert_eq!(day[depvs as usize], [0x61, 0xB7, 0xFF]);
        assert_eq!(night[depvs as usize], [0x0A, 0x1A, 0x2B]);
        // LANDA only exists at night; day falls back to its CHMGD.
        assert_eq!(day[catalog.color_index("LANDA") as usize], [0xC0, 0x45, 0xD1]);
        assert!(catalog.palette("DUSK").is_err());
    }

    #[test]
    fn test_lookup_and_graphics() {
        let catalog = Catalog::from_json(LIBRARY).unwrap();
        let attrs = Attributes::new().with("DRVAL1", AttrValue::Float(0.0));
        let row = catalog
            .find_best_lookup("DEPARE", &attrs, TableCategory::PlainBoundaries)
            .unwrap();
        assert_eq!(row.id, 10);
        let row = catalog
            .find_best_lookup("DEPARE", &Attributes::new(), TableCategory::PlainBoundaries)
            .unwrap();
        assert_eq!(row.id, 11);
        assert!(
            catalog
                .find_best_lookup("DEPARE", &attrs, TableCategory::SymbolizedBoundaries)
                .is_none()
        );

        assert_eq!(catalog.symbol_index("QUESMRK1"), UNDEFINED_GRAPHIC_INDEX);
        assert_eq!(catalog.symbol_index("LIGHTS11"), 1);
        assert_eq!(catalog.symbol_index("NOSUCH"), UNDEFINED_GRAPHIC_INDEX);
        assert_eq!(catalog.symbol_pivot("LIGHTS11"), Some([2, 38]));
        assert_eq!(catalog.symbol_dim("LIGHTS11"), Some([20, 40]));
        assert_eq!(
            catalog.pattern_size("DAY_BRIGHT", "DIAMOND1"),
            Some([32, 32])
        );
        assert!(catalog.pattern_location("DUSK", "DIAMOND1").is_none());
    }

    #[test]
    fn test_malformed_documents_are_fatal() {
        assert!(Catalog::from_json("{").is_err());
        let bad_kind = LIBRARY.replace("\"kind\": \"area\"", "\"kind\": \"point\"");
        assert!(matches!(
            Catalog::from_json(&bad_kind),
            Err(CatalogError::InvalidLookUp { id: 10, .. })
        ));
        let bad_instr = LIBRARY.replace("AC(DEPDW)", "AC(DEPDW");
        assert!(matches!(
            Catalog::from_json(&bad_instr),
            Err(CatalogError::InvalidInstruction(_))
        ));
        let bad_color = LIBRARY.replace("#61B7FF", "blue");
        assert!(matches!(
            Catalog::from_json(&bad_color),
            Err(CatalogError::InvalidColor { .. })
        ));
    }
}
