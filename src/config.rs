use serde::Serialize;

use crate::catalog::{Catalog, TableCategory};
use crate::error::ConfigError;
use crate::feature::GeometryKind;

pub const DEFAULT_SCHEME: &str = "DAY_BRIGHT";

/// Mariner's display settings.
///
/// Passed explicitly to every catalog and procedure call, so charts loaded
/// in parallel may use different settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySettings {
    /// Shallow contour in metres.
    pub shallow_depth: f64,
    /// Safety depth and safety contour in metres.
    pub safety_depth: f64,
    /// Deep contour in metres.
    pub deep_depth: f64,
    pub color_scheme: String,
    /// Use only two depth shades (shallow/deep) split at the safety contour.
    pub two_shades: bool,
    /// Overlay a diamond pattern on depth areas shallower than the safety
    /// contour.
    pub shallow_pattern: bool,
    pub symbolized_boundaries: bool,
    pub simplified_points: bool,
    /// Draw light sector legs to the nominal range instead of a fixed length.
    pub full_light_sectors: bool,
    /// Show isolated dangers that lie in water shallower than the safety
    /// contour.
    pub isolated_dangers_in_shallow: bool,
    /// Emit light characteristic labels.
    pub light_descriptions: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            shallow_depth: 2.0,
            safety_depth: 30.0,
            deep_depth: 30.0,
            color_scheme: DEFAULT_SCHEME.to_string(),
            two_shades: false,
            shallow_pattern: false,
            symbolized_boundaries: true,
            simplified_points: false,
            full_light_sectors: false,
            isolated_dangers_in_shallow: false,
            light_descriptions: true,
        }
    }
}

impl DisplaySettings {
    /// Check threshold ordering and that the color scheme exists.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        if !(self.shallow_depth <= self.safety_depth && self.safety_depth <= self.deep_depth) {
            return Err(ConfigError::Thresholds {
                shallow: self.shallow_depth,
                safety: self.safety_depth,
                deep: self.deep_depth,
            });
        }
        if !catalog.has_scheme(&self.color_scheme) {
            return Err(ConfigError::UnknownScheme(self.color_scheme.clone()));
        }
        Ok(())
    }

    /// Look-up table used for features of the given geometry kind.
    pub fn table_for(&self, kind: GeometryKind) -> TableCategory {
        match kind {
            GeometryKind::Point if self.simplified_points => TableCategory::SimplifiedPoints,
            GeometryKind::Point => TableCategory::PaperChartPoints,
            GeometryKind::Line => TableCategory::Lines,
            GeometryKind::Area if self.symbolized_boundaries => {
                TableCategory::SymbolizedBoundaries
            }
            GeometryKind::Area => TableCategory::PlainBoundaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_selection() {
        let mut settings = DisplaySettings::default();
        assert_eq!(
            settings.table_for(GeometryKind::Area),
            TableCategory::SymbolizedBoundaries
        );
        settings.symbolized_boundaries = false;
        settings.simplified_points = true;
        assert_eq!(
            settings.table_for(GeometryKind::Area),
            TableCategory::PlainBoundaries
        );
        assert_eq!(
            settings.table_for(GeometryKind::Point),
            TableCategory::SimplifiedPoints
        );
        assert_eq!(settings.table_for(GeometryKind::Line), TableCategory::Lines);
    }

    #[test]
    fn test_validate_thresholds() {
        let catalog = Catalog::from_json(
            r#"{"colorTables": [{"name": "DAY_BRIGHT", "colors": {}}], "lookups": []}"#,
        )
        .unwrap();
        let settings = DisplaySettings::default();
        assert!(settings.validate(&catalog).is_ok());

        let bad = DisplaySettings {
            shallow_depth: 10.0,
            safety_depth: 5.0,
            ..DisplaySettings::default()
        };
        assert!(matches!(
            bad.validate(&catalog),
            Err(ConfigError::Thresholds { .. })
        ));

        let night = DisplaySettings {
            color_scheme: "NIGHT".into(),
            ..DisplaySettings::default()
        };
        assert_eq!(
            night.validate(&catalog),
            Err(ConfigError::UnknownScheme("NIGHT".into()))
        );
    }
}
