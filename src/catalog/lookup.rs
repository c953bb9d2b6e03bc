use serde::Serialize;

use crate::attribute::{AttrList, AttrValue, Attributes};
use crate::catalog::instruction::Instruction;
use crate::error::CatalogError;
use crate::feature::GeometryKind;

/// Sequence id carried by the "no match" look-up.
pub const INVALID_LOOKUP_ID: i32 = -1;

const FLOAT_TOLERANCE: f64 = 1e-6;

/// Look-up table family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableCategory {
    PlainBoundaries,
    SymbolizedBoundaries,
    SimplifiedPoints,
    PaperChartPoints,
    Lines,
}

impl TableCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLAIN_BOUNDARIES" | "PLAIN" => Some(TableCategory::PlainBoundaries),
            "SYMBOLIZED_BOUNDARIES" | "SYMBOLIZED" => Some(TableCategory::SymbolizedBoundaries),
            "SIMPLIFIED" | "SIMPLIFIED_POINTS" => Some(TableCategory::SimplifiedPoints),
            "PAPER_CHART" | "PAPER" | "PAPER_CHART_POINTS" => Some(TableCategory::PaperChartPoints),
            "LINES" => Some(TableCategory::Lines),
            _ => None,
        }
    }

    /// Geometry kind the rows of this table apply to.
    pub fn kind(self) -> GeometryKind {
        match self {
            TableCategory::PlainBoundaries | TableCategory::SymbolizedBoundaries => {
                GeometryKind::Area
            }
            TableCategory::SimplifiedPoints | TableCategory::PaperChartPoints => {
                GeometryKind::Point
            }
            TableCategory::Lines => GeometryKind::Line,
        }
    }
}

/// Visibility tier of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayCategory {
    /// Always shown.
    DisplayBase,
    Standard,
    /// Detail only.
    Other,
}

impl DisplayCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DISPLAYBASE" | "DISPLAY_BASE" => Some(DisplayCategory::DisplayBase),
            "STANDARD" | "MARINERS_STANDARD" => Some(DisplayCategory::Standard),
            "OTHER" | "MARINERS_OTHER" => Some(DisplayCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadarPriority {
    /// Drawn over the radar image.
    Over,
    Suppressed,
}

impl RadarPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "O" | "over" => Some(RadarPriority::Over),
            "S" | "suppressed" => Some(RadarPriority::Suppressed),
            _ => None,
        }
    }
}

/// Expected value of an attribute constraint, pre-parsed for every type a
/// feature value can have.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedValue {
    raw: String,
    int: Option<i64>,
    float: Option<f64>,
    list: Option<AttrList>,
}

impl ExpectedValue {
    fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            raw: trimmed.to_string(),
            int: trimmed.parse().ok(),
            float: trimmed.parse().ok(),
            list: AttrList::parse(trimmed),
        }
    }

    fn matches(&self, value: &AttrValue) -> bool {
        match value {
            AttrValue::Int(i) => self.int == Some(*i),
            AttrValue::Float(f) => self
                .float
                .is_some_and(|e| (e - f).abs() <= FLOAT_TOLERANCE),
            AttrValue::Str(s) => s.trim() == self.raw,
            AttrValue::List(l) => self.list.as_ref() == Some(l),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// Bare attribute code: the attribute must be present.
    Present,
    /// `CODE?`: the wildcard never inspects the feature and always matches.
    Absent,
    Value(ExpectedValue),
}

/// One attribute constraint of a look-up row.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrConstraint {
    pub code: String,
    pub expected: Expected,
}

impl AttrConstraint {
    /// Parse the concatenated presentation library form, e.g. `CATOBS6`,
    /// `DRVAL1` or `WATLEV?`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() < 6 || !s.is_char_boundary(6) {
            return None;
        }
        let (code, value) = s.split_at(6);
        let expected = match value.trim() {
            "" => Expected::Present,
            "?" => Expected::Absent,
            v => Expected::Value(ExpectedValue::new(v)),
        };
        Some(Self {
            code: code.to_string(),
            expected,
        })
    }

    pub fn matches(&self, attrs: &Attributes) -> bool {
        match &self.expected {
            Expected::Present => attrs.has(&self.code),
            Expected::Absent => true,
            Expected::Value(expected) => attrs
                .get(&self.code)
                .is_some_and(|value| expected.matches(value)),
        }
    }
}

/// One row of the presentation library.
#[derive(Debug, Clone, PartialEq)]
pub struct LookUp {
    pub id: i32,
    pub class: String,
    pub kind: GeometryKind,
    pub table: TableCategory,
    pub display_priority: u8,
    pub radar_priority: RadarPriority,
    pub constraints: Vec<AttrConstraint>,
    pub instructions: Vec<Instruction>,
    pub category: DisplayCategory,
}

impl LookUp {
    pub fn is_valid(&self) -> bool {
        self.id != INVALID_LOOKUP_ID
    }

    /// Strict AND over all constraints. A row without constraints matches
    /// every feature.
    pub fn matches(&self, attrs: &Attributes) -> bool {
        self.constraints.iter().all(|c| c.matches(attrs))
    }

    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        if self.id == INVALID_LOOKUP_ID {
            return Err(CatalogError::InvalidLookUp {
                id: self.id,
                reason: "reserved sequence id".into(),
            });
        }
        if self.table.kind() != self.kind {
            return Err(CatalogError::InvalidLookUp {
                id: self.id,
                reason: format!("{:?} row in {:?} table", self.kind, self.table),
            });
        }
        Ok(())
    }
}

/// First row, in declaration order, whose constraints are all satisfied.
pub fn best_match<'a>(rows: &'a [LookUp], attrs: &Attributes) -> Option<&'a LookUp> {
    rows.iter().find(|row| row.matches(attrs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, constraints: &[&str]) -> LookUp {
        LookUp {
            id,
            class: "OBSTRN".into(),
            kind: GeometryKind::Point,
            table: TableCategory::PaperChartPoints,
            display_priority: 4,
            radar_priority: RadarPriority::Over,
            constraints: constraints
                .iter()
                .map(|c| AttrConstraint::parse(c).unwrap())
                .collect(),
            instructions: Vec::new(),
            category: DisplayCategory::Other,
        }
    }

    #[test]
    fn test_constraint_kinds() {
        let attrs = Attributes::new()
            .with("CATOBS", AttrValue::Int(6))
            .with("VALSOU", AttrValue::Float(3.2))
            .with("OBJNAM", AttrValue::Str(" Rock ".into()))
            .with("COLOUR", AttrValue::List(AttrList::from([1, 3])));

        assert!(AttrConstraint::parse("CATOBS6").unwrap().matches(&attrs));
        assert!(!AttrConstraint::parse("CATOBS7").unwrap().matches(&attrs));
        assert!(AttrConstraint::parse("VALSOU3.2000001").unwrap().matches(&attrs));
        assert!(!AttrConstraint::parse("VALSOU3.21").unwrap().matches(&attrs));
        assert!(AttrConstraint::parse("OBJNAMRock").unwrap().matches(&attrs));
        assert!(AttrConstraint::parse("COLOUR1,3").unwrap().matches(&attrs));
        assert!(!AttrConstraint::parse("COLOUR3,1").unwrap().matches(&attrs));
        assert!(AttrConstraint::parse("VALSOU").unwrap().matches(&attrs));
        assert!(!AttrConstraint::parse("WATLEV").unwrap().matches(&attrs));
        // The wildcard matches whether or not the attribute is present.
        assert!(AttrConstraint::parse("WATLEV?").unwrap().matches(&attrs));
        assert!(AttrConstraint::parse("CATOBS?").unwrap().matches(&attrs));
        assert!(AttrConstraint::parse("CAT").is_none());
    }

    #[test]
    fn test_first_full_match_wins() {
        let rows = vec![
            row(1, &["CATOBS6", "WATLEV3"]),
            row(2, &["CATOBS6"]),
            row(3, &[]),
        ];
        let attrs = Attributes::new().with("CATOBS", AttrValue::Int(6));
        assert_eq!(best_match(&rows, &attrs).map(|r| r.id), Some(2));

        let attrs = attrs.with("WATLEV", AttrValue::Int(3));
        assert_eq!(best_match(&rows, &attrs).map(|r| r.id), Some(1));

        assert_eq!(best_match(&rows, &Attributes::new()).map(|r| r.id), Some(3));
        assert!(best_match(&rows[..2], &Attributes::new()).is_none());
    }
}
