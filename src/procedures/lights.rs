//! Light symbolization (LIGHTS) and light description text (LITDSN).

use serde::Serialize;

use crate::attribute::Attributes;
use crate::catalog::Instruction;
use crate::colors::{light_color_token, parse_colours};
use crate::feature::{Feature, Geometry, Point};

use super::{Fragment, ProcedureContext};

/// Nominal range from which a light is drawn as a full circle.
const MAJOR_LIGHT_RANGE: f64 = 10.0;
/// Nominal range assumed when `VALNMR` is missing.
const DEFAULT_RANGE: f64 = 9.0;
/// Arc radius per nautical mile of nominal range; a 10 M light gets 25 mm.
const SECTOR_MM_PER_NM: f64 = 2.5;
const MIN_SECTOR_RADIUS_MM: f64 = 10.0;
const MAX_SECTOR_RADIUS_MM: f64 = 30.0;

/// Pie slice of a sector light, or the full circle of an all-round light.
///
/// Bearings are in degrees clockwise from north, as seen from the light.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorArc {
    pub center: Point,
    pub start: f64,
    pub end: f64,
    /// Arc radius on screen.
    pub radius_mm: f64,
    /// Sector legs drawn to the nominal range, in nautical miles, when
    /// full-length sectors are on.
    pub leg_length_nm: Option<f64>,
    /// S-52 color token of the arc.
    pub color: String,
    pub all_round: bool,
}

/// Abbreviation of a `LITCHR` light characteristic.
fn characteristic(litchr: i64) -> Option<&'static str> {
    let abbr = match litchr {
        1 => "F",
        2 => "Fl",
        3 => "LFl",
        4 => "Q",
        5 => "VQ",
        6 => "UQ",
        7 => "Iso",
        8 => "Oc",
        9 => "IQ",
        10 => "IVQ",
        11 => "IUQ",
        12 => "Mo",
        13 => "FFl",
        14 => "FlLFl",
        15 => "OcFl",
        16 => "FLFl",
        17 => "Al.Oc",
        18 => "Al.LFl",
        19 => "Al.Fl",
        20 => "Al.Gr",
        25 => "Q+LFl",
        26 => "VQ+LFl",
        27 => "UQ+LFl",
        28 => "Al",
        29 => "Al.FFl",
        _ => return None,
    };
    Some(abbr)
}

/// Print a measurement without a trailing `.0`.
fn number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Light description such as `Fl(2)R 10s 12m 5M`.
pub fn litdsn(attrs: &Attributes) -> String {
    let mut text = String::new();

    if let Some(abbr) = attrs.i64("LITCHR").and_then(characteristic) {
        text.push_str(abbr);
    }
    if let Some(group) = attrs.str("SIGGRP").map(str::trim) {
        if !matches!(group, "" | "()" | "(1)") {
            text.push_str(group);
        }
    }
    for colour in parse_colours(&attrs.list("COLOUR")) {
        text.push_str(colour.abbreviation());
    }

    let mut parts = vec![text];
    if let Some(period) = attrs.f64("SIGPER") {
        parts.push(format!("{}s", number(period)));
    }
    if let Some(height) = attrs.f64("HEIGHT") {
        parts.push(format!("{}m", number(height)));
    }
    if let Some(range) = attrs.f64("VALNMR") {
        parts.push(format!("{}M", number(range)));
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

fn flare_symbol(color: &str) -> &'static str {
    match color {
        "LITRD" => "LIGHTS11",
        "LITGN" => "LIGHTS12",
        "LITYW" => "LIGHTS13",
        _ => "LITDEF11",
    }
}

pub fn lights(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let Geometry::Point(center) = feature.geometry else {
        return Fragment::default();
    };
    let attrs = &feature.attributes;
    let mut fragment = Fragment::default();
    if ctx.settings.light_descriptions {
        fragment.text = Some(litdsn(attrs)).filter(|t| !t.is_empty());
    }

    let catlit = attrs.list("CATLIT");
    if catlit.contains_any(&[8, 11]) {
        fragment.push(Instruction::symbol("LIGHTS82"));
        return fragment;
    }
    if catlit.contains(9) {
        fragment.push(Instruction::symbol("LIGHTS81"));
        return fragment;
    }

    let color = light_color_token(&parse_colours(&attrs.list("COLOUR")));
    let valnmr = attrs.f64("VALNMR").unwrap_or(DEFAULT_RANGE);
    let radius_mm = sector_radius_mm(valnmr);
    let leg_length_nm = ctx.settings.full_light_sectors.then_some(valnmr);

    match (attrs.f64("SECTR1"), attrs.f64("SECTR2")) {
        (Some(s1), Some(s2)) if (s2 - s1).rem_euclid(360.0) != 0.0 => {
            fragment.sectors.push(SectorArc {
                center,
                start: (s1 + 180.0).rem_euclid(360.0),
                end: (s2 + 180.0).rem_euclid(360.0),
                radius_mm,
                leg_length_nm,
                color: color.to_string(),
                all_round: false,
            });
        }
        (Some(_), Some(_)) => fragment.sectors.push(all_round(center, radius_mm, color)),
        _ if valnmr >= MAJOR_LIGHT_RANGE => {
            fragment.sectors.push(all_round(center, radius_mm, color));
        }
        _ => {
            let orientation = if ctx.index.is_first_light_at(center, ctx.sequence) {
                135.0
            } else {
                45.0
            };
            fragment.push(Instruction::rotated_symbol(flare_symbol(color), orientation));
        }
    }

    fragment
}

/// Arc radius on screen, growing with the nominal range.
fn sector_radius_mm(valnmr: f64) -> f64 {
    (valnmr * SECTOR_MM_PER_NM).clamp(MIN_SECTOR_RADIUS_MM, MAX_SECTOR_RADIUS_MM)
}

fn all_round(center: Point, radius_mm: f64, color: &str) -> SectorArc {
    SectorArc {
        center,
        start: 0.0,
        end: 360.0,
        radius_mm,
        leg_length_nm: None,
        color: color.to_string(),
        all_round: true,
    }
}
