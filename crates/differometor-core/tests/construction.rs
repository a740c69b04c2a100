//! End-to-end tests for setup construction, parameter extraction and
//! serialization through the public API.
//!
//! Tests cover:
//! - Parameter-list length and order against the schema registry
//! - Order sensitivity of reference resolution
//! - Atomicity of failed construction calls
//! - JSON descriptions replayed through `Setup::from_statements`
//! - Initialization followed by serialization

use differometor_core::{
    constrain_inter_grid_cell_spaces, initialize_with_config, to_finesse, BoundsTable,
    ComponentKind, EntityRef, InitConfig, NodeDef, Parameter, ParameterGroup, Setup, SetupError,
    SpaceDef, Statement,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Kinds that can be added as nodes without a target.
const FREE_KINDS: &[ComponentKind] = &[
    ComponentKind::Laser,
    ComponentKind::Squeezer,
    ComponentKind::Mirror,
    ComponentKind::Beamsplitter,
    ComponentKind::FreeMass,
    ComponentKind::Signal,
    ComponentKind::Frequency,
    ComponentKind::Detector,
    ComponentKind::Qnoised,
    ComponentKind::Qhd,
    ComponentKind::Nothing,
    ComponentKind::DirectionalBeamsplitter,
];

fn chain(names: &[&str]) -> Setup {
    let mut setup = Setup::new();
    for name in names {
        setup.add(NodeDef::new(ComponentKind::Mirror, *name)).unwrap();
    }
    for pair in names.windows(2) {
        setup.space(SpaceDef::new(pair[0], pair[1])).unwrap();
    }
    setup
}

// ---------------------------------------------------------------------------
// Parameter extraction
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn parameter_count_matches_schema_sizes(
        picks in prop::collection::vec((0..FREE_KINDS.len(), any::<bool>()), 1..20),
        fixed_spaces in prop::collection::vec(any::<bool>(), 0..20),
    ) {
        let mut setup = Setup::new();
        let mut expected = 0;
        for (i, (kind_idx, optimizable)) in picks.iter().enumerate() {
            let kind = FREE_KINDS[*kind_idx];
            setup
                .add(NodeDef::new(kind, format!("n{i}")).optimizable(*optimizable))
                .unwrap();
            if *optimizable && !kind.is_never_optimized() {
                expected += kind.property_names().len();
            }
        }
        for (i, optimizable) in fixed_spaces.iter().enumerate().take(picks.len() - 1) {
            let def = SpaceDef::new(format!("n{i}"), format!("n{}", i + 1));
            setup
                .space(if *optimizable { def } else { def.fixed() })
                .unwrap();
            if *optimizable {
                expected += ComponentKind::Space.property_names().len();
            }
        }
        prop_assert_eq!(setup.parameters().len(), expected);
    }
}

#[test]
fn parameters_follow_construction_order() {
    let mut setup = Setup::new();
    setup.add(NodeDef::new(ComponentKind::Laser, "l0")).unwrap();
    setup.add(NodeDef::new(ComponentKind::Mirror, "m1")).unwrap();
    setup.space(SpaceDef::new("l0", "m1")).unwrap();
    setup
        .add(NodeDef::new(ComponentKind::FreeMass, "m1sus").target("m1"))
        .unwrap();

    let expected = vec![
        Parameter::new(EntityRef::node("l0"), "power"),
        Parameter::new(EntityRef::node("l0"), "phase"),
        Parameter::new(EntityRef::node("m1"), "loss"),
        Parameter::new(EntityRef::node("m1"), "reflectivity"),
        Parameter::new(EntityRef::node("m1"), "tuning"),
        Parameter::new(EntityRef::edge("l0", "m1"), "length"),
        Parameter::new(EntityRef::edge("l0", "m1"), "refractive_index"),
        Parameter::new(EntityRef::node("m1sus"), "mass"),
    ];
    assert_eq!(setup.parameters(), expected.as_slice());
}

// ---------------------------------------------------------------------------
// Ordering and atomicity
// ---------------------------------------------------------------------------

#[test]
fn references_resolve_only_against_earlier_calls() {
    let mut setup = chain(&["a", "b"]);
    let err = setup
        .add(NodeDef::new(ComponentKind::Signal, "s").target("b_c"))
        .unwrap_err();
    assert_eq!(err, SetupError::UnresolvedReference { reference: "b_c".into() });

    setup.add(NodeDef::new(ComponentKind::Mirror, "c")).unwrap();
    setup.space(SpaceDef::new("b", "c")).unwrap();
    setup
        .add(NodeDef::new(ComponentKind::Signal, "s").target("b_c"))
        .unwrap();
}

#[test]
fn failed_calls_leave_setup_untouched() {
    let mut setup = chain(&["a", "b", "c"]);
    let nodes_before = setup.node_count();
    let edges_before = setup.edge_count();
    let params_before = setup.parameters().to_vec();

    let failures: Vec<Result<(), SetupError>> = vec![
        setup.add(NodeDef::new(ComponentKind::Mirror, "bad_name")),
        setup.add(NodeDef::new(ComponentKind::Mirror, "d").with("width", 1.0)),
        setup.add(
            NodeDef::new(ComponentKind::Mirror, "d")
                .with("reflectivity", 0.1)
                .with("transmissivity", 0.1),
        ),
        setup.add(NodeDef::new(ComponentKind::FreeMass, "d").target("zz")),
        setup.add(NodeDef::new(ComponentKind::Qnoised, "d").target("a").port("up")),
        setup.space(SpaceDef::new("a", "zz")),
        setup.space(SpaceDef::new("a", "c").target_port("middle")),
    ];
    assert!(failures.iter().all(Result::is_err));
    assert_eq!(setup.node_count(), nodes_before);
    assert_eq!(setup.edge_count(), edges_before);
    assert_eq!(setup.parameters(), params_before.as_slice());
}

// ---------------------------------------------------------------------------
// JSON descriptions
// ---------------------------------------------------------------------------

#[test]
fn json_description_replays_through_construction() {
    let json = r#"[
        {"add": {"component": "laser", "name": "l0"}},
        {"add": {"component": "mirror", "name": "m1"}},
        {"space": {"source": "l0", "target": "m1"}}
    ]"#;
    let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
    let setup = Setup::from_statements(statements).unwrap();
    let out = to_finesse(&setup).unwrap();
    assert!(out.starts_with("l l0 P=1 phase=0\n"));
    assert!(out.ends_with("\n\ns l0_m1 l0.p1 m1.p1 L=0 nr=1.0\n"));
}

#[test]
fn json_description_with_unknown_component_fails() {
    let json = r#"[
        {"add": {"component": "laser", "name": "l0"}},
        {"add": {"component": "photodiode", "name": "pd"}}
    ]"#;
    let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
    let err = Setup::from_statements(statements).unwrap_err();
    assert_eq!(err, SetupError::UnknownComponent { kind: "photodiode".into() });

    let json = r#"[{"add": {"component": "space", "name": "s"}}]"#;
    let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
    let err = Setup::from_statements(statements).unwrap_err();
    assert_eq!(err, SetupError::UnknownComponent { kind: "space".into() });
}

#[test]
fn json_description_with_non_boolean_auxiliary_fails() {
    let json = r#"[
        {"add": {"component": "mirror", "name": "m"}},
        {"add": {"component": "qnoised", "name": "n", "target": "m",
                 "port": "left", "direction": "out", "auxiliary": "maybe"}}
    ]"#;
    let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
    let err = Setup::from_statements(statements).unwrap_err();
    assert!(matches!(
        err,
        SetupError::InvalidEnum { field: "auxiliary", ref value, .. } if value == "maybe"
    ));

    let json = r#"[
        {"add": {"component": "mirror", "name": "m"}},
        {"add": {"component": "qnoised", "name": "n", "target": "m",
                 "port": "left", "direction": "out", "auxiliary": true}}
    ]"#;
    let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
    let setup = Setup::from_statements(statements).unwrap();
    assert_eq!(setup.node("n").unwrap().auxiliary, Some(true));
}

// ---------------------------------------------------------------------------
// Initialization, grouping, serialization
// ---------------------------------------------------------------------------

#[test]
fn initialized_setup_still_serializes() {
    let mut setup = chain(&["a", "b", "c"]);
    let params = setup.parameters().to_vec();
    let config = InitConfig {
        uniform_bound: 10.0,
        seed: 7,
    };
    let values = initialize_with_config(&mut setup, &params, &BoundsTable::default(), &config).unwrap();
    assert_eq!(values.len(), params.len());
    let out = to_finesse(&setup).unwrap();
    assert_eq!(out.lines().count(), 3 + 1 + 2);
}

#[test]
fn grouping_partitions_filtered_parameters() {
    let mut setup = Setup::new();
    for name in ["mr11", "ml12", "mr21", "ml22", "mt21", "mb11"] {
        setup.add(NodeDef::new(ComponentKind::Mirror, name)).unwrap();
    }
    setup.space(SpaceDef::new("mr11", "ml12")).unwrap();
    setup.space(SpaceDef::new("mr21", "ml22")).unwrap();
    setup.space(SpaceDef::new("mt21", "mb11")).unwrap();

    let properties = ["length", "reflectivity"];
    let groups = constrain_inter_grid_cell_spaces(setup.parameters(), &properties);
    let mut flattened: Vec<&Parameter> = groups.iter().flat_map(ParameterGroup::members).collect();
    let mut filtered: Vec<&Parameter> = setup
        .parameters()
        .iter()
        .filter(|p| properties.contains(&p.property.as_str()))
        .collect();
    flattened.sort();
    filtered.sort();
    assert_eq!(flattened, filtered);
    assert!(groups
        .iter()
        .any(|g| matches!(g, ParameterGroup::Tied(members) if members.len() == 2)));
}
