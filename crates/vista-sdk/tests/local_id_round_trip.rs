//! Round-trip tests for the LocalId and UniversalId wire forms.

use vista_sdk::{
    CodebookName, GmodPath, LocalId, LocalIdBuilder, ParsingErrors, UniversalId, Vis, VisVersion,
};

fn parse_path(item: &str, version: VisVersion) -> GmodPath {
    let vis = Vis::instance();
    let gmod = vis.gmod(version).unwrap();
    let locations = vis.locations(version).unwrap();
    GmodPath::from_string(item, &gmod, &locations).unwrap()
}

#[test]
fn local_id_round_trips() {
    let cases = [
        "/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature/cnt-exhaust.gas/pos-inlet",
        "/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature",
        "/dnv-v2/vis-3-4a/411.1/C101.63/S206/meta/qty-temperature/cnt-cooling.sea.water",
        "/dnv-v2/vis-3-4a/411.1/C101/sec/411.1/C101.64i/S201/meta/cnt-condensate",
        "/dnv-v2/vis-3-4a/411.1/C101/meta/qty~my.quantity/detail~some.detail",
        "/dnv-v2/vis-3-5a/411.1/C101.64/S201/meta/cnt-condensate/state-opened",
        "/dnv-v2/vis-3-4a/511.331/C221/meta/qty-flow.rate/pos-outlet",
        "/dnv-v2/vis-3-7a/691.811i-A/H101.11-1/meta/qty-temperature/pos-upper",
    ];

    for case in cases {
        let local_id = LocalId::parse(case).unwrap_or_else(|e| panic!("{case}: {e}"));
        assert_eq!(local_id.to_string(), case);
    }
}

#[test]
fn basic_local_id_fields() {
    let local_id = LocalId::parse(
        "/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature/cnt-exhaust.gas/pos-inlet",
    )
    .unwrap();

    assert_eq!(local_id.vis_version(), VisVersion::V3_4a);
    assert_eq!(local_id.primary_item().to_string(), "411.1/C101.31-2");
    assert!(local_id.secondary_item().is_none());
    assert!(!local_id.is_verbose_mode());

    let tags: Vec<String> = local_id.metadata_tags().map(|t| t.to_string()).collect();
    assert_eq!(tags, vec!["qty-temperature", "cnt-exhaust.gas", "pos-inlet"]);
    assert!(local_id.metadata_tags().all(|t| !t.is_custom()));
}

#[test]
fn verbose_mode_prints_common_names() {
    let primary = parse_path("411.1/C101.63/S206", VisVersion::V3_4a);

    let local_id = LocalIdBuilder::create(VisVersion::V3_4a)
        .with_primary_item(primary)
        .with_verbose_mode(true)
        .with_metadata_tag(vista_sdk::MetadataTag::new(
            CodebookName::Quantity,
            "temperature",
            false,
        ))
        .unwrap()
        .with_metadata_tag(vista_sdk::MetadataTag::new(
            CodebookName::Content,
            "exhaust.gas",
            false,
        ))
        .unwrap()
        .with_metadata_tag(vista_sdk::MetadataTag::new(
            CodebookName::Position,
            "inlet",
            false,
        ))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(
        local_id.to_string(),
        "/dnv-v2/vis-3-4a/411.1/C101.63/S206/~propulsion.engine/~cooling.system/meta/qty-temperature/cnt-exhaust.gas/pos-inlet"
    );

    // verbose strings parse back to an equal id
    let reparsed = LocalId::parse(&local_id.to_string()).unwrap();
    assert_eq!(reparsed, local_id);
    assert!(reparsed.is_verbose_mode());
}

#[test]
fn verbose_mode_includes_locations_and_secondary_prefix() {
    let primary = parse_path("411.1/C101.31-2", VisVersion::V3_4a);
    let secondary = parse_path("411.1/C101.63/S206", VisVersion::V3_4a);

    let local_id = LocalIdBuilder::create(VisVersion::V3_4a)
        .with_primary_item(primary)
        .with_secondary_item(secondary)
        .with_verbose_mode(true)
        .with_metadata_tag(vista_sdk::MetadataTag::new(
            CodebookName::Quantity,
            "temperature",
            false,
        ))
        .unwrap()
        .build()
        .unwrap();

    let text = local_id.to_string();
    assert!(text.contains("/~propulsion.engine/~cylinder.section.2/"));
    assert!(text.contains("/~for.propulsion.engine/~cooling.system/"));
    assert_eq!(LocalId::parse(&text).unwrap().to_string(), text);
}

#[test]
fn builder_equality_follows_fields() {
    let a = LocalId::parse("/dnv-v2/vis-3-4a/411.1/C101/meta/qty-temperature").unwrap();
    let b = LocalId::parse("/dnv-v2/vis-3-4a/411.1/C101/meta/qty-temperature").unwrap();
    let c = LocalId::parse("/dnv-v2/vis-3-4a/411.1/C101/meta/qty-pressure").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn error_report_lists_every_problem() {
    let mut errors = ParsingErrors::new();
    let result = LocalId::parse_with_errors(
        "/dnv-v2/vis-3-4a/411.1/C101/meta/pos-centre-upper/qty-temperature/zzz-what",
        &mut errors,
    );

    // recoverable problems are reported while parsing continues
    assert!(result.is_some());
    assert!(errors.len() >= 2);
    for line in errors.to_string().lines() {
        assert!(line.starts_with('\t'), "bad report line: {line:?}");
        assert!(line.contains(" - "), "bad report line: {line:?}");
    }
}

#[test]
fn universal_id_round_trips() {
    let input = "data.dnv.com/IMO9074729/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature";
    let universal_id = UniversalId::parse(input).unwrap();
    assert_eq!(universal_id.imo_number().value(), 9074729);
    assert_eq!(universal_id.to_string(), input);

    let invalid = "data.dnv.com/IMO9999999/dnv-v2/vis-3-4a/411.1/C101.31-2/meta/qty-temperature";
    let mut errors = ParsingErrors::new();
    assert!(UniversalId::parse_with_errors(invalid, &mut errors).is_none());
    assert!(errors.to_string().contains("IMONumber"));
}
