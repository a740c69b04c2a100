//! Integration tests for the bundled topologies.
//!
//! Each topology is built in every mode, serialized, and checked against
//! parameter counts derived from the component registry.

use differometor_core::{
    constrain_inter_grid_cell_spaces, to_finesse, ComponentKind, EntityRef, Parameter,
    ParameterGroup, Setup,
};
use differometor_setups::{aligo, uifo, voyager, Boundary, Center, Mode, UifoOptions};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const MODES: [Mode; 3] = [
    Mode::SpaceModulation,
    Mode::AmplitudeModulation,
    Mode::FrequencyModulation,
];

fn count_kind(setup: &Setup, kind: ComponentKind) -> usize {
    setup.nodes().iter().filter(|(_, n)| n.kind() == kind).count()
}

fn build_uifo(options: &UifoOptions, seed: u64) -> Setup {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    uifo(options, &mut rng).unwrap()
}

// ---------------------------------------------------------------------------
// Voyager
// ---------------------------------------------------------------------------

#[test]
fn voyager_builds_in_every_mode() {
    for mode in MODES {
        let setup = voyager(mode).unwrap();
        assert_eq!(setup.parameters().len(), 74, "mode {mode}");
        assert_eq!(setup.edge_count(), 14);
        to_finesse(&setup).unwrap();
    }
}

#[test]
fn voyager_serializes_sources_and_readout() {
    let out = to_finesse(&voyager(Mode::SpaceModulation).unwrap()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "l l0 P=153 phase=0");
    assert!(lines.contains(&"sq sq db=10 angle=0"));
    assert!(lines.contains(&"free_mass itmysus itmy.mech mass=200"));
    assert!(lines.contains(&"sgen fbsitmy bs_itmy.h amplitude=1.0 phase=180"));
    assert!(lines.contains(&"qnoised noise-top bhbs.p2.o"));
    assert!(lines.contains(&"qnoised noise-right bhbs.p3.o"));
    assert!(lines.contains(&"s lo_bhbs lo.p1 bhbs.p4 L=10 nr=1.0"));
    assert!(lines.contains(&"s sq_dbs2 sq.p1 dbs2.p2 L=1 nr=1.0"));
    assert!(!out.contains("detector-top"));
}

#[test]
fn voyager_modulation_modes_pick_templates() {
    let out = to_finesse(&voyager(Mode::AmplitudeModulation).unwrap()).unwrap();
    assert!(out.contains("sgen fl0 l0.amp.i amplitude=sqrt(l0.P) phase=0.0\n"));
    let out = to_finesse(&voyager(Mode::FrequencyModulation).unwrap()).unwrap();
    assert!(out.contains("sgen flo lo.frq.i amplitude=1.0 phase=0.0\n"));
}

// ---------------------------------------------------------------------------
// aLIGO
// ---------------------------------------------------------------------------

#[test]
fn aligo_builds_in_every_mode() {
    for mode in MODES {
        let setup = aligo(mode).unwrap();
        assert_eq!(setup.parameters().len(), 46, "mode {mode}");
        to_finesse(&setup).unwrap();
    }
}

#[test]
fn aligo_lossless_beamsplitter() {
    let out = to_finesse(&aligo(Mode::SpaceModulation).unwrap()).unwrap();
    assert!(out.contains("\nbs bs R=0.5 T=0.5 L=0 phi=0 alpha=45\n"));
    assert!(out.contains("fsig(5)\n"));
    assert!(out.contains("s sq1_srm sq1.p1 srm.p2 L=0 nr=1.0\n"));
}

// ---------------------------------------------------------------------------
// UIFO
// ---------------------------------------------------------------------------

#[test]
fn single_cell_uifo() {
    let setup = build_uifo(&UifoOptions::new(1), 0);
    assert_eq!(setup.parameters().len(), 69);
    assert_eq!(count_kind(&setup, ComponentKind::Laser), 4);
    assert_eq!(count_kind(&setup, ComponentKind::Detector), 0);
    let out = to_finesse(&setup).unwrap();
    assert!(out.contains("s center11_ml11 center11.p1 ml11.p1 L=1 nr=1.0\n"));
    assert!(out.contains("s m10_ml11 m10.p2 ml11.p2 L=0 nr=1.0\n"));
    assert!(out.contains("sgen sm01mt11 m01_mt11.h amplitude=1.0 phase=180\n"));
    assert!(out.contains("sgen sm10ml11 m10_ml11.h amplitude=1.0 phase=0.0\n"));
}

#[test]
fn explicit_cells_override_defaults() {
    let options = UifoOptions::new(1)
        .center(1, 1, Center::DirectionalBeamsplitter, differometor_core::Port::Top)
        .boundary(0, 1, Boundary::Squeezer)
        .boundary(2, 1, Boundary::Detector);
    let setup = build_uifo(&options, 0);
    assert_eq!(setup.node("center11").unwrap().kind(), ComponentKind::DirectionalBeamsplitter);
    assert!(!setup.contains_node("center11sus"));
    assert_eq!(setup.node("boundary01").unwrap().kind(), ComponentKind::Squeezer);
    assert!(setup.contains_node("boundary21detector"));
    assert!(setup.contains_node("boundary21noise"));
    assert!(!setup.contains_node("boundary21"));
    let space = setup.edge("center11_ml11").unwrap();
    assert_eq!(space.source_port.as_str(), "bottom");
    to_finesse(&setup).unwrap();
}

#[test]
fn inter_cell_spaces_are_tied() {
    let setup = build_uifo(&UifoOptions::new(3), 0);
    let groups = constrain_inter_grid_cell_spaces(setup.parameters(), &["length"]);
    let tied: Vec<&ParameterGroup> = groups
        .iter()
        .filter(|g| matches!(g, ParameterGroup::Tied(_)))
        .collect();
    assert_eq!(tied.len(), 4);
    assert!(tied.iter().all(|g| g.len() == 3));
    assert_eq!(
        tied[0].members()[0],
        Parameter::new(EntityRef::edge("mr11", "ml12"), "length")
    );
    let total: usize = groups.iter().map(ParameterGroup::len).sum();
    let lengths = setup
        .parameters()
        .iter()
        .filter(|p| p.property == "length")
        .count();
    assert_eq!(total, lengths);
}

#[test]
fn random_uifo_is_reproducible() {
    let options = UifoOptions::new(2).random(true);
    let a = to_finesse(&build_uifo(&options, 11)).unwrap();
    let b = to_finesse(&build_uifo(&options, 11)).unwrap();
    assert_eq!(a, b);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_uifo_has_one_detector(seed in any::<u64>(), size in 1usize..4) {
        let setup = build_uifo(&UifoOptions::new(size).random(true), seed);
        prop_assert_eq!(count_kind(&setup, ComponentKind::Detector), 1);
        prop_assert_eq!(count_kind(&setup, ComponentKind::Qnoised), 1);
        prop_assert!(to_finesse(&setup).is_ok());
    }
}
