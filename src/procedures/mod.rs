//! Conditional Symbology Procedures.
//!
//! The presentation library refers to these by name (`CS(DEPARE02)`); the
//! set is closed, so names are resolved once at catalog load into a
//! [`Procedure`] and dispatched with an exhaustive match. Every procedure is
//! a pure function of the feature, the display settings and the read-only
//! [`ChartIndex`], and degrades to a default instead of failing.

pub mod depare;
pub mod depcnt;
pub mod hazards;
pub mod lights;
pub mod resare;
pub mod shoreline;
pub mod soundg;
pub mod topmar;

use std::fmt;

use log::warn;

use crate::attribute::Attributes;
use crate::catalog::{DisplayCategory, Instruction, LookUp, RadarPriority};
use crate::config::DisplaySettings;
use crate::feature::Feature;
use crate::index::ChartIndex;

pub use self::lights::SectorArc;
pub use self::soundg::{SoundingFlags, sounding_glyphs};

/// Display priority of features promoted to the display base.
pub const PRIORITY_HAZARD: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Procedure {
    Depare,
    Depcnt,
    Obstrn,
    Wrecks,
    Soundg,
    Resare,
    Restrn,
    Lights,
    Slcons,
    Quapos,
    Topmar,
    /// Name the catalog refers to but no procedure implements.
    Unknown(String),
}

impl Procedure {
    /// Resolve a procedure name, ignoring its version suffix (`DEPARE02`).
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
        match base.to_ascii_uppercase().as_str() {
            "DEPARE" | "SEABED" => Procedure::Depare,
            "DEPCNT" => Procedure::Depcnt,
            "OBSTRN" => Procedure::Obstrn,
            "WRECKS" => Procedure::Wrecks,
            "SOUNDG" | "SNDFRM" => Procedure::Soundg,
            "RESARE" => Procedure::Resare,
            "RESTRN" => Procedure::Restrn,
            "LIGHTS" | "LITDSN" => Procedure::Lights,
            "SLCONS" => Procedure::Slcons,
            "QUAPOS" => Procedure::Quapos,
            "TOPMAR" => Procedure::Topmar,
            _ => Procedure::Unknown(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Procedure::Depare => "DEPARE02",
            Procedure::Depcnt => "DEPCNT02",
            Procedure::Obstrn => "OBSTRN04",
            Procedure::Wrecks => "WRECKS02",
            Procedure::Soundg => "SOUNDG02",
            Procedure::Resare => "RESARE02",
            Procedure::Restrn => "RESTRN01",
            Procedure::Lights => "LIGHTS05",
            Procedure::Slcons => "SLCONS03",
            Procedure::Quapos => "QUAPOS01",
            Procedure::Topmar => "TOPMAR01",
            Procedure::Unknown(name) => name,
        }
    }

    /// Run the procedure for one feature.
    pub fn run(&self, feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
        match self {
            Procedure::Depare => depare::depare(feature, ctx),
            Procedure::Depcnt => depcnt::depcnt(feature, ctx),
            Procedure::Obstrn => hazards::obstrn(feature, ctx),
            Procedure::Wrecks => hazards::wrecks(feature, ctx),
            Procedure::Soundg => soundg::soundg(feature, ctx),
            Procedure::Resare => resare::resare(feature, ctx),
            Procedure::Restrn => resare::restrn(feature, ctx),
            Procedure::Lights => lights::lights(feature, ctx),
            Procedure::Slcons => shoreline::slcons(feature, ctx),
            Procedure::Quapos => shoreline::quapos(feature, ctx),
            Procedure::Topmar => topmar::topmar(feature, ctx),
            Procedure::Unknown(name) => {
                warn!(
                    "Unknown conditional procedure {} for {}, feature left unstyled",
                    name, feature.class
                );
                Fragment::default()
            }
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a procedure may consult besides the feature itself.
#[derive(Clone, Copy)]
pub struct ProcedureContext<'a> {
    pub settings: &'a DisplaySettings,
    pub index: &'a ChartIndex,
    /// Look-up row that referenced the procedure, if any.
    pub lookup: Option<&'a LookUp>,
    /// Reading order number of the feature within its chart.
    pub sequence: usize,
}

/// Resolved output of a procedure, spliced into the look-up's instruction
/// list in place of the `CS` directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub instructions: Vec<Instruction>,
    pub display_priority: Option<u8>,
    pub category: Option<DisplayCategory>,
    pub radar: Option<RadarPriority>,
    pub sectors: Vec<SectorArc>,
    pub text: Option<String>,
}

impl Fragment {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Promote to the always visible display base.
    pub fn promote(&mut self, priority: u8) {
        self.display_priority = Some(priority);
        self.category = Some(DisplayCategory::DisplayBase);
    }

    /// Append another fragment; overrides already set here win.
    pub fn merge(&mut self, other: Fragment) {
        self.instructions.extend(other.instructions);
        self.display_priority = self.display_priority.or(other.display_priority);
        self.category = self.category.or(other.category);
        self.radar = self.radar.or(other.radar);
        self.sectors.extend(other.sectors);
        self.text = self.text.take().or(other.text);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty() && self.sectors.is_empty() && self.text.is_none()
    }
}

/// `QUAPOS` values 2 to 9 flag an approximate or doubtful position.
pub(crate) fn low_accuracy(attrs: &Attributes) -> bool {
    attrs.i64("QUAPOS").is_some_and(|q| (2..=9).contains(&q))
}

/// Names of all `SY` instructions, in order.
pub fn symbol_names(instructions: &[Instruction]) -> impl Iterator<Item = &str> {
    instructions.iter().filter_map(|i| match i {
        Instruction::Symbol { name, .. } => Some(name.as_str()),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::attribute::Attributes;
    use crate::config::DisplaySettings;
    use crate::feature::{Feature, Geometry, Polygon};
    use crate::index::ChartIndex;

    use super::{Fragment, Procedure, ProcedureContext};

    pub fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::Polygon(Polygon::new(vec![
            [x0, y0],
            [x0 + size, y0],
            [x0 + size, y0 + size],
            [x0, y0 + size],
        ]))
    }

    /// Run `procedure` on the feature at `target` within `features`.
    pub fn run_in(
        procedure: Procedure,
        features: &[Feature],
        target: usize,
        settings: &DisplaySettings,
    ) -> Fragment {
        let index = ChartIndex::build(features.iter().enumerate());
        let ctx = ProcedureContext {
            settings,
            index: &index,
            lookup: None,
            sequence: target,
        };
        procedure.run(&features[target], &ctx)
    }

    pub fn run_alone(procedure: Procedure, class: &str, geometry: Geometry, attrs: Attributes) -> Fragment {
        let feature = Feature::new(class, geometry, attrs);
        run_in(procedure, &[feature], 0, &DisplaySettings::default())
    }
}
