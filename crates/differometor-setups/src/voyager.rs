//! Voyager-style detector: power- and signal-recycled Michelson with arm
//! cavities, a filter cavity for the squeezed vacuum, and balanced homodyne
//! readout.

use differometor_core::{ComponentKind, Derived, NodeDef, PropertyValue, Setup, SetupError, SpaceDef};

use crate::mode::Mode;

use ComponentKind::*;

/// Builds the Voyager topology with signals injected according to `mode`.
pub fn voyager(mode: Mode) -> Result<Setup, SetupError> {
    let mut s = Setup::new();

    s.add(NodeDef::new(Laser, "l0").with("power", 153).with("phase", 0))?;
    s.add(mirror("prm", 0.049, 0))?;
    s.add(
        NodeDef::new(Beamsplitter, "bs")
            .with("transmissivity", 0.5)
            .with("loss", 5e-6)
            .with("tuning", 63.63961030678928)
            .with("alpha", 45),
    )?;
    s.add(mirror("itmy", 0.002, 0))?;
    s.add(mirror("etmy", 1.5e-5, 0))?;
    s.add(mirror("itmx", 0.002, 0))?;
    s.add(mirror("etmx", 1.5e-5, 0))?;
    s.add(mirror("srm", 0.046, 90))?;
    s.add(NodeDef::new(DirectionalBeamsplitter, "dbs1"))?;
    s.add(NodeDef::new(DirectionalBeamsplitter, "dbs2"))?;
    s.add(NodeDef::new(Squeezer, "sq").with("db", 10).with("angle", 0))?;
    s.add(mirror("fm1", 0.1e-2, 0))?;
    s.add(
        NodeDef::new(Mirror, "fm2")
            .with("transmissivity", 1.5e-5)
            .with("loss", 5e-6)
            .with("tuning", -0.014),
    )?;
    s.add(
        NodeDef::new(Beamsplitter, "bhbs")
            .with("transmissivity", 0.5)
            .with("loss", 5e-6)
            .with("tuning", 1e-7)
            .with("alpha", 45),
    )?;
    s.add(NodeDef::new(Laser, "lo").with("power", 0.01).with("phase", 0))?;

    s.add(suspension("prmsus", "prm", 29.243802983873618))?;
    s.add(suspension("bssus", "bs", 48.634040943805395))?;
    s.add(suspension("itmysus", "itmy", 200))?;
    s.add(suspension("etmysus", "etmy", 200))?;
    s.add(suspension("itmxsus", "itmx", 200))?;
    s.add(suspension("etmxsus", "etmx", 200))?;
    s.add(suspension("srmsus", "srm", 50))?;

    s.space(SpaceDef::new("l0", "prm").length(1))?;
    s.space(SpaceDef::new("prm", "bs").length(1))?;
    s.space(SpaceDef::new("bs", "itmy").length(1).source_port("top"))?;
    s.space(SpaceDef::new("itmy", "etmy").length(4000))?;
    s.space(SpaceDef::new("bs", "itmx").length(1).source_port("right"))?;
    s.space(SpaceDef::new("itmx", "etmx").length(4000))?;
    s.space(SpaceDef::new("bs", "srm").length(10).source_port("bottom"))?;
    s.space(SpaceDef::new("srm", "dbs1").length(1).target_port("left"))?;
    s.space(SpaceDef::new("sq", "dbs2").length(1).target_port("top"))?;
    s.space(
        SpaceDef::new("dbs1", "dbs2")
            .length(10)
            .source_port("top")
            .target_port("right"),
    )?;
    s.space(SpaceDef::new("dbs2", "fm1").length(1).source_port("left"))?;
    s.space(SpaceDef::new("fm1", "fm2").length(300))?;
    s.space(
        SpaceDef::new("dbs1", "bhbs")
            .length(1)
            .source_port("right")
            .target_port("left"),
    )?;
    s.space(SpaceDef::new("lo", "bhbs").length(10).target_port("bottom"))?;

    s.add(NodeDef::new(Frequency, "f").with("frequency", 1))?;
    match mode {
        Mode::SpaceModulation => {
            s.add(NodeDef::new(Signal, "fl0prm").target("l0_prm"))?;
            s.add(NodeDef::new(Signal, "fprmbs").target("prm_bs"))?;
            s.add(NodeDef::new(Signal, "fbsitmy").target("bs_itmy").with("phase", 180))?;
            s.add(NodeDef::new(Signal, "fitmyetmy").target("itmy_etmy").with("phase", 180))?;
            s.add(NodeDef::new(Signal, "fbsitmx").target("bs_itmx"))?;
            s.add(NodeDef::new(Signal, "fitmxetmx").target("itmx_etmx"))?;
            s.add(NodeDef::new(Signal, "bssrm").target("bs_srm").with("phase", 180))?;
        }
        Mode::AmplitudeModulation => {
            s.add(
                NodeDef::new(Signal, "fl0")
                    .target("l0_amplitude")
                    .with("amplitude", Derived::sqrt_of("l0", "power")),
            )?;
            s.add(
                NodeDef::new(Signal, "flo")
                    .target("lo_amplitude")
                    .with("amplitude", Derived::sqrt_of("lo", "power")),
            )?;
        }
        Mode::FrequencyModulation => {
            s.add(NodeDef::new(Signal, "fl0").target("l0_frequency"))?;
            s.add(NodeDef::new(Signal, "flo").target("lo_frequency"))?;
        }
    }

    s.add(
        NodeDef::new(Qnoised, "noise-top")
            .target("bhbs")
            .port("top")
            .direction("out")
            .auxiliary(true),
    )?;
    s.add(
        NodeDef::new(Qnoised, "noise-right")
            .target("bhbs")
            .port("right")
            .direction("out")
            .auxiliary(true),
    )?;
    s.add(
        NodeDef::new(Qhd, "noise")
            .detectors("noise-top", "noise-right")
            .with("phase", 180),
    )?;
    s.add(
        NodeDef::new(Detector, "detector-top")
            .target("bhbs")
            .port("top")
            .direction("out"),
    )?;
    s.add(
        NodeDef::new(Detector, "detector-right")
            .target("bhbs")
            .port("right")
            .direction("out"),
    )?;

    tracing::debug!(mode = %mode, nodes = s.node_count(), "built voyager setup");
    Ok(s)
}

fn mirror(name: &str, transmissivity: f64, tuning: i32) -> NodeDef {
    NodeDef::new(Mirror, name)
        .with("transmissivity", transmissivity)
        .with("loss", 5e-6)
        .with("tuning", tuning)
}

fn suspension(name: &str, optic: &str, mass: impl Into<PropertyValue>) -> NodeDef {
    NodeDef::new(FreeMass, name).target(optic).with("mass", mass)
}
