use std::path::Path;

use s52chart::catalog::UNDEFINED_COLOR_INDEX;
use s52chart::{AttrList, AttrValue, Attributes, Catalog, CatalogError, TableCategory};

fn catalog() -> Catalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/s52_catalog.json");
    Catalog::load(&path).unwrap()
}

fn buoy(colour: &[u16], catlam: Option<i64>) -> Attributes {
    let mut attrs = Attributes::new().with(
        "COLOUR",
        AttrValue::List(colour.iter().copied().collect::<AttrList>()),
    );
    if let Some(catlam) = catlam {
        attrs.insert("CATLAM", AttrValue::Int(catlam));
    }
    attrs
}

fn lookup_id(catalog: &Catalog, attrs: &Attributes) -> Option<i32> {
    catalog
        .find_best_lookup("BOYLAT", attrs, TableCategory::PaperChartPoints)
        .map(|l| l.id)
}

#[test]
fn best_lookup_is_deterministic() {
    let catalog = catalog();
    let attrs = buoy(&[3], Some(1));
    let first = lookup_id(&catalog, &attrs);
    for _ in 0..100 {
        assert_eq!(lookup_id(&catalog, &attrs), first);
    }
}

#[test]
fn earliest_full_match_wins() {
    let catalog = catalog();
    // Rows 1110 (COLOUR3) and 1111 (COLOUR3, CATLAM1) both match fully;
    // the earlier declared row wins even though the later one is more
    // specific.
    assert_eq!(lookup_id(&catalog, &buoy(&[3], Some(1))), Some(1110));
    assert_eq!(lookup_id(&catalog, &buoy(&[3], None)), Some(1110));
}

#[test]
fn partial_matches_never_win() {
    let catalog = catalog();
    // COLOUR4 with the CATLAM wildcard, present or not.
    assert_eq!(lookup_id(&catalog, &buoy(&[4], None)), Some(1112));
    assert_eq!(lookup_id(&catalog, &buoy(&[4], Some(2))), Some(1112));
    // No constrained row matches: the unconstrained default row.
    assert_eq!(lookup_id(&catalog, &buoy(&[2], Some(1))), Some(1113));
    assert_eq!(lookup_id(&catalog, &buoy(&[3, 4], None)), Some(1113));
}

#[test]
fn no_match_for_unknown_class_or_table() {
    let catalog = catalog();
    let attrs = Attributes::new();
    assert!(catalog
        .find_best_lookup("PILPNT", &attrs, TableCategory::PaperChartPoints)
        .is_none());
    assert!(catalog
        .find_best_lookup("BOYLAT", &attrs, TableCategory::SimplifiedPoints)
        .is_none());
}

#[test]
fn color_indices_shared_across_schemes() {
    let catalog = catalog();
    let depvs = catalog.color_index("DEPVS");
    assert_ne!(depvs, UNDEFINED_COLOR_INDEX);
    assert_eq!(catalog.color_index("NOSUCH"), UNDEFINED_COLOR_INDEX);

    let day = catalog.palette("DAY_BRIGHT").unwrap();
    let night = catalog.palette("NIGHT").unwrap();
    assert_eq!(day.len(), night.len());
    assert_eq!(day[depvs as usize], [0x61, 0xB7, 0xFF]);
    assert_eq!(night[depvs as usize], [0x07, 0x19, 0x2B]);
    // Tokens the night table lacks fall back to its undefined color.
    let cstln = catalog.color_index("CSTLN") as usize;
    assert_eq!(night[cstln], night[UNDEFINED_COLOR_INDEX as usize]);

    assert!(matches!(
        catalog.palette("NOON"),
        Err(CatalogError::UnknownScheme(_))
    ));
}

#[test]
fn graphics_are_packed_into_atlases() {
    let catalog = catalog();
    assert_eq!(catalog.symbol_dim("BOYLAT13"), Some([14, 24]));
    assert_eq!(catalog.symbol_pivot("BOYLAT13"), Some([7, 22]));
    assert_eq!(catalog.symbol_index("QUESMRK1"), 0);
    assert_eq!(catalog.symbol_index("NOSUCH01"), 0);

    let dredged = catalog.pattern_location("DAY_BRIGHT", "DRGARE01").unwrap();
    let diamond = catalog.pattern_location("DUSK", "DIAMOND1").unwrap();
    assert_eq!(dredged.size, [32, 32]);
    assert_eq!(diamond.size, [24, 24]);
    assert_ne!(dredged.origin, diamond.origin);
    assert!(catalog.pattern_location("NOON", "DRGARE01").is_none());
}
