//! Topmark symbol selection (TOPMAR).

use crate::catalog::{Instruction, UNDEFINED_SYMBOL};
use crate::feature::{Feature, Geometry};

use super::{Fragment, ProcedureContext};

/// Topmark on a buoy, light float or light vessel.
fn floating_symbol(topshp: i64) -> &'static str {
    match topshp {
        1 | 24 | 29 => "TOPMAR02",
        2 | 25 => "TOPMAR04",
        3 | 18 | 26 | 32 => "TOPMAR10",
        4 => "TOPMAR12",
        5 | 19 | 21 => "TOPMAR13",
        6 | 12 | 20 | 22 | 23 | 31 => "TOPMAR14",
        7 => "TOPMAR65",
        8 | 27 | 30 => "TOPMAR17",
        9 => "TOPMAR16",
        10 => "TOPMAR08",
        11 => "TOPMAR07",
        13 => "TOPMAR05",
        14 => "TOPMAR06",
        28 => "TOPMAR18",
        _ => "TMARDEF2",
    }
}

/// Topmark on a beacon or other fixed structure.
fn rigid_symbol(topshp: i64) -> &'static str {
    match topshp {
        1 | 24 | 29 => "TOPMAR22",
        2 | 25 => "TOPMAR24",
        3 | 18 | 26 | 32 => "TOPMAR30",
        4 => "TOPMAR32",
        5 | 19 | 21 => "TOPMAR33",
        6 | 20 | 22 | 23 => "TOPMAR34",
        7 => "TOPMAR85",
        8 | 27 | 30 => "TOPMAR86",
        9 => "TOPMAR36",
        10 => "TOPMAR28",
        11 => "TOPMAR27",
        12 | 31 => "TOPMAR14",
        13 => "TOPMAR25",
        14 => "TOPMAR26",
        15 => "TOPMAR88",
        16 => "TOPMAR87",
        28 => "TOPMAR89",
        _ => "TMARDEF1",
    }
}

pub fn topmar(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let Some(topshp) = feature.attributes.i64("TOPSHP") else {
        return Fragment::new(vec![Instruction::symbol(UNDEFINED_SYMBOL)]);
    };
    let floating = match feature.geometry {
        Geometry::Point(p) => ctx.index.floating_at(p),
        _ => false,
    };
    let symbol = if floating {
        floating_symbol(topshp)
    } else {
        rigid_symbol(topshp)
    };
    Fragment::new(vec![Instruction::symbol(symbol)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrValue, Attributes};
    use crate::config::DisplaySettings;
    use crate::procedures::Procedure;
    use crate::procedures::testing::run_in;

    fn at(class: &str, p: [f64; 2], attrs: Attributes) -> Feature {
        Feature::new(class, Geometry::Point(p), attrs)
    }

    #[test]
    fn test_floating_or_rigid() {
        let cone = || Attributes::new().with("TOPSHP", AttrValue::Int(1));
        let features = [
            at("BOYLAT", [1.0, 1.0], Attributes::new()),
            at("TOPMAR", [1.0, 1.0], cone()),
            at("BCNLAT", [2.0, 2.0], Attributes::new()),
            at("TOPMAR", [2.0, 2.0], cone()),
        ];
        let settings = DisplaySettings::default();
        let on_buoy = run_in(Procedure::Topmar, &features, 1, &settings);
        assert_eq!(on_buoy.instructions, vec![Instruction::symbol("TOPMAR02")]);
        let on_beacon = run_in(Procedure::Topmar, &features, 3, &settings);
        assert_eq!(on_beacon.instructions, vec![Instruction::symbol("TOPMAR22")]);
    }

    #[test]
    fn test_defaults() {
        let settings = DisplaySettings::default();
        let unknown = [at("TOPMAR", [0.0, 0.0], Attributes::new().with("TOPSHP", AttrValue::Int(99)))];
        let fragment = run_in(Procedure::Topmar, &unknown, 0, &settings);
        assert_eq!(fragment.instructions, vec![Instruction::symbol("TMARDEF1")]);
        let missing = [at("TOPMAR", [0.0, 0.0], Attributes::new())];
        let fragment = run_in(Procedure::Topmar, &missing, 0, &settings);
        assert_eq!(fragment.instructions, vec![Instruction::symbol("QUESMRK1")]);
    }
}
