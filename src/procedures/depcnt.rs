//! Depth contour styling with safety contour highlighting (DEPCNT).

use crate::catalog::{Instruction, LinePattern};
use crate::feature::Feature;

use super::{Fragment, PRIORITY_HAZARD, ProcedureContext, low_accuracy};

pub fn depcnt(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let value = match feature.class.as_str() {
        "DEPARE" | "DRGARE" => attrs.f64("DRVAL1"),
        _ => attrs.f64("VALDCO"),
    }
    .unwrap_or(0.0);

    let pattern = if low_accuracy(attrs) {
        LinePattern::Dash
    } else {
        LinePattern::Solid
    };

    if ctx.index.is_safety_contour(value, ctx.settings.safety_depth) {
        let mut fragment = Fragment::new(vec![Instruction::line(pattern, 2, "DEPSC")]);
        fragment.promote(PRIORITY_HAZARD);
        fragment
    } else {
        Fragment::new(vec![Instruction::line(pattern, 1, "DEPCN")])
    }
}
