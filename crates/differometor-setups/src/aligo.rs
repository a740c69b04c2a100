//! Simplified Advanced LIGO: dual-recycled Fabry-Perot Michelson with
//! suspended test masses and an injected squeezer.

use differometor_core::{ComponentKind, Derived, NodeDef, PropertyValue, Setup, SetupError, SpaceDef};

use crate::mode::Mode;

use ComponentKind::*;

const ARM_LENGTH: i32 = 3995;
const ITM_T: f64 = 0.014;
const ETM_T: f64 = 5e-6;
const MIRROR_LOSS: f64 = 37.5e-6;
const TEST_MASS: i32 = 40;

/// Builds the aLIGO topology with signals injected according to `mode`.
pub fn aligo(mode: Mode) -> Result<Setup, SetupError> {
    let mut s = Setup::new();

    s.add(NodeDef::new(Laser, "L0").with("power", 125))?;
    s.add(
        NodeDef::new(Beamsplitter, "bs")
            .with("reflectivity", 0.5)
            .with("loss", 0)
            .with("alpha", 45),
    )?;
    s.add(mirror("prm", 0.03, 90))?;
    s.add(mirror("itmx", ITM_T, 90))?;
    s.add(mirror("etmx", ETM_T, 89.999875))?;
    s.add(mirror("itmy", ITM_T, 0))?;
    s.add(mirror("etmy", ETM_T, 0.000125))?;
    s.add(mirror("srm", 0.2, -90))?;
    s.add(NodeDef::new(Squeezer, "sq1").with("db", 10).with("angle", 90))?;

    for optic in ["itmx", "etmx", "itmy", "etmy"] {
        s.add(
            NodeDef::new(FreeMass, format!("{optic}sus"))
                .target(optic)
                .with("mass", TEST_MASS),
        )?;
    }

    s.space(SpaceDef::new("L0", "prm"))?;
    s.space(SpaceDef::new("prm", "bs").length(53))?;
    s.space(SpaceDef::new("bs", "itmx").length(4.5))?;
    s.space(SpaceDef::new("itmx", "etmx").length(ARM_LENGTH))?;
    s.space(SpaceDef::new("bs", "itmy").length(4.45).source_port("top"))?;
    s.space(SpaceDef::new("itmy", "etmy").length(ARM_LENGTH))?;
    s.space(SpaceDef::new("bs", "srm").length(50.525).source_port("bottom"))?;
    s.space(SpaceDef::new("sq1", "srm").target_port("right"))?;

    s.add(NodeDef::new(Frequency, "f").with("frequency", 5))?;
    match mode {
        Mode::SpaceModulation => {
            s.add(NodeDef::new(Signal, "darmx").target("itmx_etmx"))?;
            s.add(NodeDef::new(Signal, "darmy").target("itmy_etmy").with("phase", 180))?;
        }
        Mode::FrequencyModulation => {
            s.add(NodeDef::new(Signal, "fL0").target("L0_frequency"))?;
        }
        Mode::AmplitudeModulation => {
            s.add(
                NodeDef::new(Signal, "fL0")
                    .target("L0_amplitude")
                    .with("amplitude", Derived::sqrt_of("L0", "power")),
            )?;
        }
    }

    s.add(
        NodeDef::new(Qnoised, "noise")
            .target("srm")
            .port("right")
            .direction("out"),
    )?;
    s.add(
        NodeDef::new(Detector, "detector")
            .target("srm")
            .port("right")
            .direction("out"),
    )?;

    tracing::debug!(mode = %mode, nodes = s.node_count(), "built aligo setup");
    Ok(s)
}

fn mirror(name: &str, transmissivity: f64, tuning: impl Into<PropertyValue>) -> NodeDef {
    NodeDef::new(Mirror, name)
        .with("transmissivity", transmissivity)
        .with("loss", MIRROR_LOSS)
        .with("tuning", tuning)
}
