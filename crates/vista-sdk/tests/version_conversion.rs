//! Cross-version conversion scenarios: renames, depth changes, location
//! preservation and LocalId conversion.

use vista_sdk::{GmodPath, LocalId, Vis, VisVersion};

fn parse_path(item: &str, version: VisVersion) -> GmodPath {
    let vis = Vis::instance();
    let gmod = vis.gmod(version).unwrap();
    let locations = vis.locations(version).unwrap();
    GmodPath::from_string(item, &gmod, &locations).unwrap()
}

#[test]
fn node_conversion_applies_rename_chain() {
    let vis = Vis::instance();

    let (code, location) = vis
        .convert_node(VisVersion::V3_4a, "C101.64i", None, VisVersion::V3_5a)
        .unwrap();
    assert_eq!(code, "C101.64");
    assert!(location.is_none());

    // unchanged codes fall back to direct lookup in every step
    let (code, _) = vis
        .convert_node(VisVersion::V3_4a, "C101.31", None, VisVersion::V3_9a)
        .unwrap();
    assert_eq!(code, "C101.31");

    // multi-step chains compose renames
    let (code, _) = vis
        .convert_node(VisVersion::V3_7a, "691.811i", None, VisVersion::V3_9a)
        .unwrap();
    assert_eq!(code, "691.83111i");

    // assignment-change steps rename the product type too
    let (code, _) = vis
        .convert_node(VisVersion::V3_4a, "S206", None, VisVersion::V3_9a)
        .unwrap();
    assert_eq!(code, "S207");

    // unknown codes fail at the first step that cannot resolve them
    assert!(vis
        .convert_node(VisVersion::V3_4a, "X999", None, VisVersion::V3_5a)
        .is_err());
}

#[test]
fn path_conversion_is_identity_for_same_version() {
    let vis = Vis::instance();
    let path = parse_path("411.1/C101.31-2", VisVersion::V3_4a);
    let converted = vis.convert_path(&path, VisVersion::V3_4a).unwrap();
    assert_eq!(converted, path);
}

#[test]
fn path_conversion_rejects_backwards_conversion() {
    let vis = Vis::instance();
    let path = parse_path("411.1/C101.31", VisVersion::V3_5a);
    assert!(vis.convert_path(&path, VisVersion::V3_4a).is_err());
}

#[test]
fn path_conversion_with_depth_increase() {
    // between 3-5a and 3-6a a pump function chain grew between CS2 and
    // C221; conversion must splice the intermediate nodes in
    let vis = Vis::instance();
    let path = parse_path("511.331/C221", VisVersion::V3_4a);

    let converted = vis.convert_path(&path, VisVersion::V3_6a).unwrap();
    assert_eq!(converted.to_string(), "511.31/C121.31/C221");
    assert_eq!(
        converted.to_full_path_string(),
        "VE/500a/510/511/511i/511.31/CS2/C121/C121.3/C121.31/C221"
    );
    assert_eq!(converted.version(), VisVersion::V3_6a);
}

#[test]
fn path_conversion_preserves_locations_through_rename() {
    let vis = Vis::instance();
    let path = parse_path("691.811i-A/H101.11-1", VisVersion::V3_7a);

    let converted = vis.convert_path(&path, VisVersion::V3_9a).unwrap();
    assert_eq!(converted.to_string(), "691.83111i-A/H101.11-1");

    // the set containing the renamed composition keeps its location too
    assert!(converted
        .to_full_path_string()
        .contains("691.83i-A/691.83111i-A"));
}

#[test]
fn converted_paths_are_valid_in_the_target_version() {
    let vis = Vis::instance();
    let cases = [
        ("411.1/C101.31-2", VisVersion::V3_4a, VisVersion::V3_9a),
        ("411.1/C101.64i/S201", VisVersion::V3_4a, VisVersion::V3_6a),
        ("511.331/C221", VisVersion::V3_4a, VisVersion::V3_9a),
        ("691.811i-A/H101.11-1", VisVersion::V3_4a, VisVersion::V3_8a),
    ];

    for (item, source, target) in cases {
        let path = parse_path(item, source);
        let converted = vis.convert_path(&path, target).unwrap();
        assert_eq!(converted.version(), target);

        // the printed short form re-parses in the target version
        let reparsed = parse_path(&converted.to_string(), target);
        assert_eq!(reparsed, converted);
    }
}

#[test]
fn assignment_change_keeps_end_node_reachable() {
    // at 3-7a the cooling product type changes from S206 to S207
    let vis = Vis::instance();
    let path = parse_path("411.1/C101.63/S206", VisVersion::V3_6a);

    let converted = vis.convert_path(&path, VisVersion::V3_7a).unwrap();
    assert_eq!(converted.to_string(), "411.1/C101.63/S207");
}

#[test]
fn local_id_conversion_converts_both_items() {
    let vis = Vis::instance();
    let local_id = LocalId::parse(
        "/dnv-v2/vis-3-4a/411.1/C101/sec/411.1/C101.64i/S201/meta/cnt-condensate",
    )
    .unwrap();

    let converted = vis.convert_local_id(&local_id, VisVersion::V3_5a).unwrap();
    assert_eq!(
        converted.to_string(),
        "/dnv-v2/vis-3-5a/411.1/C101/sec/411.1/C101.64/S201/meta/cnt-condensate"
    );
}

#[test]
fn local_id_conversion_preserves_tags_and_verbose_mode() {
    let vis = Vis::instance();
    let local_id = LocalId::parse(
        "/dnv-v2/vis-3-4a/411.1/C101.63/S206/~propulsion.engine/~cooling.system/meta/qty-temperature/cnt-exhaust.gas/pos-inlet",
    )
    .unwrap();

    let converted = vis.convert_local_id(&local_id, VisVersion::V3_6a).unwrap();
    assert!(converted.is_verbose_mode());
    assert_eq!(converted.vis_version(), VisVersion::V3_6a);
    assert_eq!(
        converted.metadata_tags().map(|t| t.to_string()).collect::<Vec<_>>(),
        vec!["qty-temperature", "cnt-exhaust.gas", "pos-inlet"]
    );
}
