//! Sounding glyph composition (SOUNDG, SNDFRM).
//!
//! A depth is broken into individual digit symbols. Symbol names are
//! `SOUNDS` (at or shallower than the safety depth) or `SOUNDG` followed by
//! a group code and a digit:
//!
//! | group | meaning                                   |
//! |-------|-------------------------------------------|
//! | `0`   | rightmost digit of an integer depth       |
//! | `1`   | units (left of the fraction, or tens)     |
//! | `2`   | tens, or hundreds                         |
//! | `3`   | ten thousands                             |
//! | `4`   | trailing digit of four and five digit depths |
//! | `5`   | tenths                                    |
//! | `A1`  | drying height marker                      |
//! | `B1`  | swept depth marker                        |
//! | `C2`  | low reliability marker                    |

use serde::Serialize;

use crate::attribute::Attributes;
use crate::catalog::Instruction;
use crate::feature::Feature;

use super::{Fragment, ProcedureContext};

const MAX_SOUNDING: i64 = 99_999;

/// Quality markers stored beside a sounding's raw depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SoundingFlags {
    pub low_reliability: bool,
    pub swept: bool,
}

impl SoundingFlags {
    pub fn from_attributes(attrs: &Attributes) -> Self {
        let quasou = attrs.list("QUASOU");
        let status = attrs.list("STATUS");
        SoundingFlags {
            low_reliability: quasou.contains_any(&[3, 4, 5, 8, 9]) || status.contains(18),
            swept: attrs.list("TECSOU").contains(6),
        }
    }
}

/// Depth of a sounding feature: the `DEPTH` added by the chart reader,
/// else `VALSOU`.
pub fn sounding_depth(attrs: &Attributes) -> Option<f64> {
    attrs.f64("DEPTH").or_else(|| attrs.f64("VALSOU"))
}

/// Digit symbols for `depth`, markers first.
pub fn sounding_glyphs(depth: f64, flags: SoundingFlags, safety_depth: f64) -> Vec<String> {
    let prefix = if depth <= safety_depth {
        "SOUNDS"
    } else {
        "SOUNDG"
    };
    let glyph = |group: &str, digit: i64| format!("{}{}{}", prefix, group, digit);
    let mut glyphs = Vec::new();

    if flags.swept {
        glyphs.push(format!("{}B1", prefix));
    }
    if flags.low_reliability {
        glyphs.push(format!("{}C2", prefix));
    }
    if depth < 0.0 {
        glyphs.push(format!("{}A1", prefix));
    }

    let value = depth.abs();
    let tenths = (value * 10.0).round() as i64;
    let whole = tenths / 10;
    let fraction = tenths % 10;

    if whole < 10 {
        glyphs.push(glyph("1", whole));
        if fraction != 0 {
            glyphs.push(glyph("5", fraction));
        }
        return glyphs;
    }

    if whole < 31 && fraction != 0 {
        glyphs.push(glyph("2", whole / 10));
        glyphs.push(glyph("1", whole % 10));
        glyphs.push(glyph("5", fraction));
        return glyphs;
    }

    let rounded = (value.round() as i64).min(MAX_SOUNDING);
    if rounded < 100 {
        glyphs.push(glyph("1", rounded / 10));
        glyphs.push(glyph("0", rounded % 10));
    } else if rounded < 1000 {
        glyphs.push(glyph("2", rounded / 100));
        glyphs.push(glyph("1", rounded / 10 % 10));
        glyphs.push(glyph("0", rounded % 10));
    } else if rounded < 10_000 {
        glyphs.push(glyph("2", rounded / 1000));
        glyphs.push(glyph("1", rounded / 100 % 10));
        glyphs.push(glyph("0", rounded / 10 % 10));
        glyphs.push(glyph("4", rounded % 10));
    } else {
        glyphs.push(glyph("3", rounded / 10_000));
        glyphs.push(glyph("2", rounded / 1000 % 10));
        glyphs.push(glyph("1", rounded / 100 % 10));
        glyphs.push(glyph("0", rounded / 10 % 10));
        glyphs.push(glyph("4", rounded % 10));
    }
    glyphs
}

pub fn soundg(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let Some(depth) = sounding_depth(attrs) else {
        return Fragment::default();
    };
    let flags = SoundingFlags::from_attributes(attrs);
    Fragment::new(
        sounding_glyphs(depth, flags, ctx.settings.safety_depth)
            .iter()
            .map(|g| Instruction::symbol(g))
            .collect(),
    )
}
