//! Obstruction, underwater rock and wreck danger classification
//! (OBSTRN, WRECKS and their helpers DEPVAL, UDWHAZ, QUAPNT).

use crate::attribute::Attributes;
use crate::catalog::{Instruction, LinePattern, RadarPriority};
use crate::feature::{Feature, Geometry};

use super::soundg::{SoundingFlags, sounding_glyphs};
use super::{Fragment, PRIORITY_HAZARD, ProcedureContext, low_accuracy};

/// Soundings deeper than this are not drawn beside a hazard symbol.
const SOUNDING_LIMIT: f64 = 20.0;

/// Shallowest `DRVAL1` of the depth areas the feature lies in.
pub fn depval(feature: &Feature, ctx: &ProcedureContext<'_>) -> Option<f64> {
    ctx.index
        .depth_features_intersecting(&feature.geometry)
        .filter(|d| d.class != "DEPCNT")
        .filter_map(|d| d.drval1)
        .min_by(f64::total_cmp)
}

/// Depth assumed for an obstruction without a known depth.
fn default_obstruction_depth(attrs: &Attributes) -> Option<f64> {
    if attrs.i64("CATOBS") == Some(6) {
        return Some(0.01);
    }
    match attrs.i64("WATLEV") {
        Some(5) => Some(0.0),
        Some(3) => Some(0.01),
        Some(1 | 2 | 4 | 6 | 7) => Some(-15.0),
        _ => None,
    }
}

fn default_wreck_depth(attrs: &Attributes) -> Option<f64> {
    match attrs.i64("CATWRK") {
        Some(1) => return Some(20.0),
        Some(2) => return Some(0.0),
        _ => {}
    }
    match attrs.i64("WATLEV") {
        Some(5) => Some(0.0),
        Some(3) => Some(0.01),
        Some(1 | 2 | 4 | 6 | 7) => Some(-15.0),
        _ => None,
    }
}

/// Underwater hazard test: true if the hazard is an isolated danger for the
/// mariner's safety depth.
pub fn udwhaz(depth: Option<f64>, feature: &Feature, ctx: &ProcedureContext<'_>) -> bool {
    let settings = ctx.settings;
    let attrs = &feature.attributes;

    // Hazards always above water are charted as land.
    if matches!(attrs.i64("WATLEV"), Some(1 | 2)) {
        return false;
    }
    let Some(depth) = depth else {
        return true;
    };
    if depth > settings.safety_depth {
        return false;
    }

    let mut areas = ctx
        .index
        .depth_features_intersecting(&feature.geometry)
        .filter(|d| d.class != "DEPCNT")
        .peekable();
    if areas.peek().is_none() {
        return true;
    }
    areas.any(|area| {
        let drval1 = area.drval1.unwrap_or(-1.0);
        drval1 >= settings.safety_depth
            || (settings.isolated_dangers_in_shallow && drval1 >= 0.0)
    })
}

/// Low accuracy marker for point hazards.
pub fn quapnt(attrs: &Attributes) -> Option<Instruction> {
    low_accuracy(attrs).then(|| Instruction::symbol("LOWACC01"))
}

fn isolated_danger(fragment: &mut Fragment) {
    fragment.push(Instruction::symbol("ISODGR01"));
    fragment.promote(PRIORITY_HAZARD);
    fragment.radar = Some(RadarPriority::Over);
}

fn push_sounding(fragment: &mut Fragment, valsou: f64, attrs: &Attributes, ctx: &ProcedureContext<'_>) {
    let flags = SoundingFlags::from_attributes(attrs);
    for glyph in sounding_glyphs(valsou, flags, ctx.settings.safety_depth) {
        fragment.push(Instruction::symbol(&glyph));
    }
}

fn obstruction_point_symbol(class: &str, attrs: &Attributes, valsou: Option<f64>) -> &'static str {
    let watlev = attrs.i64("WATLEV");
    let catobs = attrs.i64("CATOBS");
    match valsou {
        Some(v) if v > SOUNDING_LIMIT => "DANGER02",
        Some(_) if class == "UWTROC" => match watlev {
            Some(4 | 5) => "UWTROC04",
            _ => "DANGER01",
        },
        Some(_) => match (catobs, watlev) {
            (Some(6), _) => "DANGER01",
            (_, Some(1 | 2)) => "OBSTRN11",
            (_, Some(4 | 5)) => "DANGER03",
            _ => "DANGER01",
        },
        None if class == "UWTROC" => match watlev {
            Some(3) => "UWTROC03",
            _ => "UWTROC04",
        },
        None => match (catobs, watlev) {
            (Some(6), _) => "OBSTRN01",
            (_, Some(1 | 2)) => "OBSTRN11",
            (_, Some(4 | 5)) => "OBSTRN03",
            _ => "OBSTRN01",
        },
    }
}

/// Obstructions and underwater rocks.
pub fn obstrn(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let valsou = attrs.f64("VALSOU");
    let depth = valsou
        .or_else(|| depval(feature, ctx))
        .or_else(|| default_obstruction_depth(attrs));
    let danger = udwhaz(depth, feature, ctx);
    let mut fragment = Fragment::default();

    match &feature.geometry {
        Geometry::Point(_) => {
            if danger {
                isolated_danger(&mut fragment);
            } else {
                fragment.push(Instruction::symbol(obstruction_point_symbol(
                    &feature.class,
                    attrs,
                    valsou,
                )));
                if let Some(v) = valsou.filter(|v| *v <= SOUNDING_LIMIT) {
                    push_sounding(&mut fragment, v, attrs, ctx);
                }
            }
            fragment.instructions.extend(quapnt(attrs));
        }
        Geometry::LineString(_) => {
            let pattern = match valsou {
                Some(v) if v > SOUNDING_LIMIT => LinePattern::Dash,
                _ => LinePattern::Dot,
            };
            fragment.push(Instruction::line(pattern, 2, "CHBLK"));
            if danger {
                isolated_danger(&mut fragment);
            } else if let Some(v) = valsou.filter(|v| *v <= SOUNDING_LIMIT) {
                push_sounding(&mut fragment, v, attrs, ctx);
            }
            if low_accuracy(attrs) {
                fragment.push(Instruction::line_complex("LOWACC41"));
            }
        }
        Geometry::Polygon(_) => {
            if danger {
                fragment.push(Instruction::area_color("DEPVS"));
                fragment.push(Instruction::area_pattern("FOULAR01"));
                fragment.push(Instruction::line(LinePattern::Dot, 2, "CHBLK"));
                isolated_danger(&mut fragment);
            } else if let Some(v) = valsou {
                let pattern = if v > SOUNDING_LIMIT {
                    LinePattern::Dash
                } else {
                    LinePattern::Dot
                };
                fragment.push(Instruction::line(pattern, 2, "CHBLK"));
                if v <= SOUNDING_LIMIT {
                    push_sounding(&mut fragment, v, attrs, ctx);
                }
            } else if attrs.i64("CATOBS") == Some(6) {
                fragment.push(Instruction::area_pattern("FOULAR01"));
                fragment.push(Instruction::line(LinePattern::Dot, 2, "CHBLK"));
            } else {
                area_by_water_level(&mut fragment, attrs);
            }
            if low_accuracy(attrs) {
                fragment.push(Instruction::line_complex("LOWACC41"));
            }
        }
    }

    fragment
}

fn area_by_water_level(fragment: &mut Fragment, attrs: &Attributes) {
    match attrs.i64("WATLEV") {
        Some(1 | 2) => {
            fragment.push(Instruction::area_color("CHBRN"));
            fragment.push(Instruction::line(LinePattern::Solid, 2, "CSTLN"));
        }
        Some(4) => {
            fragment.push(Instruction::area_color("DEPIT"));
            fragment.push(Instruction::line(LinePattern::Dash, 2, "CSTLN"));
        }
        _ => {
            fragment.push(Instruction::area_color("DEPVS"));
            fragment.push(Instruction::line(LinePattern::Dot, 2, "CHBLK"));
        }
    }
}

pub fn wrecks(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let valsou = attrs.f64("VALSOU");
    let depth = valsou
        .or_else(|| depval(feature, ctx))
        .or_else(|| default_wreck_depth(attrs));
    let danger = udwhaz(depth, feature, ctx);
    let mut fragment = Fragment::default();

    match &feature.geometry {
        Geometry::Point(_) => {
            if danger {
                isolated_danger(&mut fragment);
            } else if let Some(v) = valsou {
                if v <= SOUNDING_LIMIT {
                    fragment.push(Instruction::symbol("DANGER01"));
                    push_sounding(&mut fragment, v, attrs, ctx);
                } else {
                    fragment.push(Instruction::symbol("DANGER02"));
                }
            } else {
                let symbol = match (attrs.i64("CATWRK"), attrs.i64("WATLEV")) {
                    (Some(1), Some(3)) => "WRECKS04",
                    (Some(2), Some(3)) => "WRECKS05",
                    (Some(4 | 5), _) | (_, Some(1 | 2 | 4 | 5)) => "WRECKS01",
                    _ => "WRECKS05",
                };
                fragment.push(Instruction::symbol(symbol));
            }
            fragment.instructions.extend(quapnt(attrs));
        }
        Geometry::LineString(_) | Geometry::Polygon(_) => {
            if danger {
                fragment.push(Instruction::area_color("DEPVS"));
                fragment.push(Instruction::line(LinePattern::Dot, 2, "CHBLK"));
                isolated_danger(&mut fragment);
            } else if let Some(v) = valsou {
                fragment.push(Instruction::line(LinePattern::Dot, 2, "CHBLK"));
                if v <= SOUNDING_LIMIT {
                    push_sounding(&mut fragment, v, attrs, ctx);
                }
            } else {
                area_by_water_level(&mut fragment, attrs);
            }
            if low_accuracy(attrs) {
                fragment.push(Instruction::line_complex("LOWACC41"));
            }
        }
    }

    fragment
}
