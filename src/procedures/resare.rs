//! Restricted areas and entry restrictions (RESARE, RESTRN).
//!
//! One symbol is chosen per area by precedence: entry restriction, then
//! anchoring, then fishing, then anything else. Additional lesser
//! restrictions are encoded in the symbol suffix, never as a second symbol.

use crate::attribute::AttrList;
use crate::catalog::{Instruction, LinePattern};
use crate::feature::Feature;

use super::{Fragment, ProcedureContext};

const ENTRY: &[u16] = &[7, 8, 14];
const ANCHORING: &[u16] = &[1, 2];
const FISHING: &[u16] = &[3, 4, 5, 6];
const LESSER: &[u16] = &[9, 10, 11, 12, 13, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27];

/// `CATREA` values that carry additional information.
const CATREA_INFO: &[u16] = &[1, 8, 9, 12, 14, 18, 19, 21, 24, 25, 26];
/// `CATREA` values that call for caution.
const CATREA_CAUTION: &[u16] = &[4, 5, 6, 7, 10, 20, 22, 23];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Entry,
    Anchoring,
    Fishing,
    Other,
}

impl Family {
    fn of(restrn: &AttrList) -> Option<Self> {
        if restrn.is_empty() {
            None
        } else if restrn.contains_any(ENTRY) {
            Some(Family::Entry)
        } else if restrn.contains_any(ANCHORING) {
            Some(Family::Anchoring)
        } else if restrn.contains_any(FISHING) {
            Some(Family::Fishing)
        } else {
            Some(Family::Other)
        }
    }

    /// Restrictions that rank below this family.
    fn lesser(self, restrn: &AttrList) -> bool {
        match self {
            Family::Entry => {
                restrn.contains_any(ANCHORING)
                    || restrn.contains_any(FISHING)
                    || restrn.contains_any(LESSER)
            }
            Family::Anchoring => restrn.contains_any(FISHING) || restrn.contains_any(LESSER),
            Family::Fishing => restrn.contains_any(LESSER),
            Family::Other => false,
        }
    }

    fn stem(self) -> &'static str {
        match self {
            Family::Entry => "ENTRES",
            Family::Anchoring => "ACHRES",
            Family::Fishing => "FSHRES",
            Family::Other => "INFARE",
        }
    }

    fn boundary(self) -> &'static str {
        match self {
            Family::Entry => "ENTRES51",
            Family::Anchoring => "ACHRES51",
            Family::Fishing => "FSHRES51",
            Family::Other => "CTYARE51",
        }
    }
}

/// Symbol for a restriction list and area category list.
pub fn restriction_symbol(restrn: &AttrList, catrea: &AttrList) -> String {
    match Family::of(restrn) {
        Some(Family::Other) if !restrn.contains_any(LESSER) => "RSRDEF51".to_string(),
        Some(family) => {
            let suffix = if family.lesser(restrn) || catrea.contains_any(CATREA_INFO) {
                "61"
            } else if catrea.contains_any(CATREA_CAUTION) {
                "71"
            } else {
                "51"
            };
            format!("{}{}", family.stem(), suffix)
        }
        None if catrea.contains_any(CATREA_CAUTION) => {
            if catrea.contains_any(CATREA_INFO) {
                "CTYARE71".to_string()
            } else {
                "CTYARE51".to_string()
            }
        }
        None if catrea.contains_any(CATREA_INFO) => "INFARE51".to_string(),
        None => "RSRDEF51".to_string(),
    }
}

pub fn resare(feature: &Feature, ctx: &ProcedureContext<'_>) -> Fragment {
    let attrs = &feature.attributes;
    let restrn = attrs.list("RESTRN");
    let catrea = attrs.list("CATREA");

    let mut fragment = Fragment::new(vec![Instruction::symbol(&restriction_symbol(
        &restrn, &catrea,
    ))]);
    if ctx.settings.symbolized_boundaries {
        let boundary = Family::of(&restrn).map_or("CTYARE51", Family::boundary);
        fragment.push(Instruction::line_complex(boundary));
    } else {
        fragment.push(Instruction::line(LinePattern::Dash, 2, "CHMGD"));
    }
    fragment
}

/// Restriction symbol of areas other than restricted areas, e.g. dredged
/// areas or anchorages carrying `RESTRN`.
pub fn restrn(feature: &Feature, _ctx: &ProcedureContext<'_>) -> Fragment {
    let restrn = feature.attributes.list("RESTRN");
    if restrn.is_empty() {
        return Fragment::default();
    }
    Fragment::new(vec![Instruction::symbol(&restriction_symbol(
        &restrn,
        &AttrList::new(),
    ))])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttrValue, Attributes};
    use crate::config::DisplaySettings;
    use crate::procedures::Procedure;
    use crate::procedures::testing::{run_in, square};

    fn list<const N: usize>(codes: [u16; N]) -> AttrList {
        AttrList::from(codes)
    }

    #[test]
    fn test_precedence() {
        let none = AttrList::new();
        assert_eq!(restriction_symbol(&list([7]), &none), "ENTRES51");
        assert_eq!(restriction_symbol(&list([1, 7]), &none), "ENTRES61");
        assert_eq!(restriction_symbol(&list([2]), &none), "ACHRES51");
        assert_eq!(restriction_symbol(&list([2, 4]), &none), "ACHRES61");
        assert_eq!(restriction_symbol(&list([3]), &none), "FSHRES51");
        assert_eq!(restriction_symbol(&list([3, 13]), &none), "FSHRES61");
        assert_eq!(restriction_symbol(&list([13]), &none), "INFARE51");
        assert_eq!(restriction_symbol(&list([99]), &none), "RSRDEF51");
    }

    #[test]
    fn test_area_category_variants() {
        let none = AttrList::new();
        assert_eq!(restriction_symbol(&list([7]), &list([4])), "ENTRES71");
        assert_eq!(restriction_symbol(&list([7]), &list([1])), "ENTRES61");
        assert_eq!(restriction_symbol(&none, &list([4])), "CTYARE51");
        assert_eq!(restriction_symbol(&none, &list([4, 1])), "CTYARE71");
        assert_eq!(restriction_symbol(&none, &list([9])), "INFARE51");
        assert_eq!(restriction_symbol(&none, &none), "RSRDEF51");
    }

    #[test]
    fn test_boundary_style() {
        let area = Feature::new(
            "RESARE",
            square(0.0, 0.0, 1.0),
            Attributes::new().with("RESTRN", AttrValue::List(list([8]))),
        );
        let fragment = run_in(
            Procedure::Resare,
            std::slice::from_ref(&area),
            0,
            &DisplaySettings::default(),
        );
        assert_eq!(
            fragment.instructions,
            vec![
                Instruction::symbol("ENTRES51"),
                Instruction::line_complex("ENTRES51")
            ]
        );

        let plain = DisplaySettings {
            symbolized_boundaries: false,
            ..DisplaySettings::default()
        };
        let fragment = run_in(Procedure::Resare, &[area], 0, &plain);
        assert_eq!(
            fragment.instructions[1],
            Instruction::line(LinePattern::Dash, 2, "CHMGD")
        );
    }
}
