//! Depth area and dredged area coloring (DEPARE, SEABED).

use crate::catalog::Instruction;
use crate::catalog::LinePattern;
use crate::config::DisplaySettings;
use crate::feature::{Feature, GeometryKind};

use super::{Fragment, ProcedureContext, depcnt, resare};

/// Fill color band of a depth range and whether it counts as shallow
/// water.
pub fn seabed(drval1: f64, drval2: f64, settings: &DisplaySettings) -> (&'static str, bool) {
    let mut color = "DEPIT";
    let mut shallow = true;

    if drval1 >= 0.0 && drval2 > 0.0 {
        color = "DEPVS";
    }

    if settings.two_shades {
        if drval1 >= settings.safety_depth && drval2 > settings.safety_depth {
            color = "DEPDW";
            shallow = false;
        }
    } else {
        if drval1 >= settings.shallow_depth && drval2 > settings.shallow_depth {
            color = "DEPMS";
        }
        if drval1 >= settings.safety_depth && drval2 > settings.safety_depth {
            color = "DEPMD";
            shallow = false;
        }
        if drval1 >= settings.deep_depth && drval2 > settings.deep_depth {
            color = "DEPDW";
            shallow = false;
        }
    }

    (color, shallow)
}

pub fn depare(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    if feature.kind() != GeometryKind::Area {
        // Edges of depth areas are drawn like contours.
        return depcnt::depcnt(feature, ctx);
    }

    let attrs = &feature.attributes;
    let drval1 = attrs.f64("DRVAL1").unwrap_or(-1.0);
    let drval2 = attrs.f64("DRVAL2").unwrap_or(drval1 + 0.01);

    let (color, shallow) = seabed(drval1, drval2, ctx.settings);
    let mut fragment = Fragment::new(vec![Instruction::area_color(color)]);
    if shallow && ctx.settings.shallow_pattern {
        fragment.push(Instruction::area_pattern("DIAMOND1"));
    }

    if feature.class == "DRGARE" {
        fragment.push(Instruction::area_pattern("DRGARE01"));
        fragment.push(Instruction::line(LinePattern::Dash, 1, "CHGRF"));
        if attrs.has("RESTRN") {
            fragment.merge(resare::restrn(feature, ctx));
        }
    }

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrList, AttrValue, Attributes};
    use crate::catalog::DisplayCategory;
    use crate::procedures::testing::{run_alone, square};
    use crate::procedures::{Procedure, symbol_names};

    fn settings(shallow: f64, safety: f64, deep: f64) -> DisplaySettings {
        DisplaySettings {
            shallow_depth: shallow,
            safety_depth: safety,
            deep_depth: deep,
            ..DisplaySettings::default()
        }
    }

    #[test]
    fn test_four_shades() {
        let s = settings(2.0, 10.0, 30.0);
        assert_eq!(seabed(-2.0, 0.0, &s), ("DEPIT", true));
        assert_eq!(seabed(0.0, 5.0, &s), ("DEPVS", true));
        assert_eq!(seabed(5.0, 10.0, &s), ("DEPMS", true));
        assert_eq!(seabed(10.0, 20.0, &s), ("DEPMD", false));
        assert_eq!(seabed(30.0, 50.0, &s), ("DEPDW", false));
    }

    #[test]
    fn test_two_shades() {
        let s = DisplaySettings {
            two_shades: true,
            ..settings(2.0, 10.0, 30.0)
        };
        assert_eq!(seabed(5.0, 10.0, &s), ("DEPVS", true));
        assert_eq!(seabed(10.0, 20.0, &s), ("DEPDW", false));
    }

    #[test]
    fn test_shallow_area_is_not_promoted() {
        let attrs = Attributes::new()
            .with("DRVAL1", AttrValue::Float(0.0))
            .with("DRVAL2", AttrValue::Float(5.0));
        let fragment = run_alone(Procedure::Depare, "DEPARE", square(0.0, 0.0, 1.0), attrs);
        assert_eq!(fragment.instructions, vec![Instruction::area_color("DEPVS")]);
        assert_ne!(fragment.category, Some(DisplayCategory::DisplayBase));
    }

    #[test]
    fn test_missing_depths_default_to_drying() {
        let fragment = run_alone(
            Procedure::Depare,
            "DEPARE",
            square(0.0, 0.0, 1.0),
            Attributes::new(),
        );
        assert_eq!(fragment.instructions, vec![Instruction::area_color("DEPIT")]);
    }

    #[test]
    fn test_dredged_area_with_restriction() {
        let attrs = Attributes::new()
            .with("DRVAL1", AttrValue::Float(12.0))
            .with("RESTRN", AttrValue::List(AttrList::from([1])));
        let fragment = run_alone(Procedure::Depare, "DRGARE", square(0.0, 0.0, 1.0), attrs);
        assert!(fragment.instructions.contains(&Instruction::area_pattern("DRGARE01")));
        assert!(
            fragment
                .instructions
                .contains(&Instruction::line(LinePattern::Dash, 1, "CHGRF"))
        );
        assert_eq!(symbol_names(&fragment.instructions).collect::<Vec<_>>(), ["ACHRES51"]);
    }
}
