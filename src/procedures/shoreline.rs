//! Shoreline constructions and positional quality of coastlines
//! (SLCONS, QUAPOS).

use crate::catalog::{Instruction, LinePattern};
use crate::feature::{Feature, GeometryKind};

use super::{Fragment, ProcedureContext, low_accuracy};

pub fn slcons(feature: &Feature, _ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let mut fragment = Fragment::default();

    if feature.kind() == GeometryKind::Point {
        if low_accuracy(attrs) {
            fragment.push(Instruction::symbol("LOWACC01"));
        }
        return fragment;
    }

    let instruction = if low_accuracy(attrs) {
        Instruction::line_complex("LOWACC01")
    } else if matches!(attrs.i64("CONDTN"), Some(1 | 2)) {
        Instruction::line(LinePattern::Dash, 1, "CSTLN")
    } else if matches!(attrs.i64("CATSLC"), Some(6 | 15 | 16)) {
        // Wharves, pontoons and jetties.
        Instruction::line(LinePattern::Solid, 4, "CSTLN")
    } else if matches!(attrs.i64("WATLEV"), Some(3 | 4)) {
        Instruction::line(LinePattern::Dash, 2, "CSTLN")
    } else {
        Instruction::line(LinePattern::Solid, 2, "CSTLN")
    };
    fragment.push(instruction);
    fragment
}

pub fn quapos(feature: &Feature, _ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let mut fragment = Fragment::default();

    if feature.kind() == GeometryKind::Point {
        if low_accuracy(attrs) {
            fragment.push(Instruction::symbol("LOWACC01"));
        }
        return fragment;
    }

    if low_accuracy(attrs) {
        fragment.push(Instruction::line_complex("LOWACC21"));
    } else {
        if feature.class == "COALNE" && attrs.i64("CONRAD") == Some(1) {
            // Radar conspicuous coastline.
            fragment.push(Instruction::line(LinePattern::Solid, 3, "CHMGF"));
        }
        fragment.push(Instruction::line(LinePattern::Solid, 1, "CSTLN"));
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrValue, Attributes};
    use crate::feature::Geometry;
    use crate::procedures::Procedure;
    use crate::procedures::testing::run_alone;

    fn line() -> Geometry {
        Geometry::LineString(vec![[0.0, 0.0], [1.0, 0.0]])
    }

    #[test]
    fn test_slcons_styles() {
        let run = |attrs| run_alone(Procedure::Slcons, "SLCONS", line(), attrs).instructions;
        assert_eq!(
            run(Attributes::new()),
            vec![Instruction::line(LinePattern::Solid, 2, "CSTLN")]
        );
        assert_eq!(
            run(Attributes::new().with("CONDTN", AttrValue::Int(1))),
            vec![Instruction::line(LinePattern::Dash, 1, "CSTLN")]
        );
        assert_eq!(
            run(Attributes::new().with("CATSLC", AttrValue::Int(15))),
            vec![Instruction::line(LinePattern::Solid, 4, "CSTLN")]
        );
        assert_eq!(
            run(Attributes::new().with("WATLEV", AttrValue::Int(3))),
            vec![Instruction::line(LinePattern::Dash, 2, "CSTLN")]
        );
        assert_eq!(
            run(Attributes::new().with("QUAPOS", AttrValue::Int(5))),
            vec![Instruction::line_complex("LOWACC01")]
        );
    }

    #[test]
    fn test_quapos_coastline() {
        let radar = Attributes::new().with("CONRAD", AttrValue::Int(1));
        let fragment = run_alone(Procedure::Quapos, "COALNE", line(), radar);
        assert_eq!(
            fragment.instructions,
            vec![
                Instruction::line(LinePattern::Solid, 3, "CHMGF"),
                Instruction::line(LinePattern::Solid, 1, "CSTLN"),
            ]
        );

        let doubtful = Attributes::new().with("QUAPOS", AttrValue::Int(4));
        let fragment = run_alone(Procedure::Quapos, "COALNE", line(), doubtful.clone());
        assert_eq!(fragment.instructions, vec![Instruction::line_complex("LOWACC21")]);

        let fragment = run_alone(Procedure::Quapos, "LNDELV", Geometry::Point([0.0, 0.0]), doubtful);
        assert_eq!(fragment.instructions, vec![Instruction::symbol("LOWACC01")]);
    }
}
