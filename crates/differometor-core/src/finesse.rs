//! Finesse serializer.
//!
//! Emits one statement per node in insertion order, a blank line, then one
//! `s` statement per space in insertion order. Mirror and beamsplitter
//! reflectivities are stored relative to the lossless sub-system, so the
//! loss is folded back in here: `R = reflectivity * (1 - L)` and
//! `T = 1 - R - L`.

use crate::error::FinesseError;
use crate::node::{Direction, Node, Port, Space};
use crate::reference::{PseudoProperty, Reference};
use crate::schema::{ComponentKind, Properties};
use crate::setup::Setup;
use crate::value::{format_float, PropertyValue};

/// Finesse port name of `port` on a component of `kind`.
pub fn port_code(kind: ComponentKind, port: Port) -> Option<&'static str> {
    use ComponentKind::*;
    match (kind, port) {
        (Mirror | Nothing, Port::Left) => Some("p1"),
        (Mirror | Nothing, Port::Right) => Some("p2"),
        (Laser | Squeezer, Port::Left | Port::Right) => Some("p1"),
        (Beamsplitter | DirectionalBeamsplitter, Port::Left) => Some("p1"),
        (Beamsplitter | DirectionalBeamsplitter, Port::Top) => Some("p2"),
        (Beamsplitter | DirectionalBeamsplitter, Port::Right) => Some("p3"),
        (Beamsplitter | DirectionalBeamsplitter, Port::Bottom) => Some("p4"),
        _ => None,
    }
}

pub fn direction_code(direction: Direction) -> &'static str {
    match direction {
        Direction::In => "i",
        Direction::Out => "o",
    }
}

/// Finesse attribute name of a property, used when a derived value has to
/// be written as an expression over another component.
fn finesse_attribute(kind: ComponentKind, property: &str) -> &str {
    match (kind, property) {
        (ComponentKind::Laser, "power") => "P",
        (ComponentKind::Mirror | ComponentKind::Beamsplitter, "reflectivity") => "R",
        (ComponentKind::Mirror | ComponentKind::Beamsplitter, "loss") => "L",
        (ComponentKind::Mirror | ComponentKind::Beamsplitter, "tuning") => "phi",
        (ComponentKind::Space, "length") => "L",
        (ComponentKind::Space, "refractive_index") => "nr",
        (ComponentKind::Frequency, "frequency") => "f",
        _ => property,
    }
}

/// Serializes `setup` into Finesse syntax.
///
/// Fails on the first node or space that cannot be expressed: a missing
/// target, port or direction, a target of the wrong kind, or a port with no
/// Finesse name on its component.
pub fn to_finesse(setup: &Setup) -> Result<String, FinesseError> {
    let mut out = String::new();
    for (_, node) in setup.nodes().iter() {
        if let Some(statement) = node_statement(setup, node)? {
            out.push_str(&statement);
            out.push('\n');
        }
    }
    out.push('\n');
    for (_, _, space) in setup.edges().iter() {
        out.push_str(&space_statement(setup, space)?);
        out.push('\n');
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

fn node_statement(setup: &Setup, node: &Node) -> Result<Option<String>, FinesseError> {
    let name = node.name.as_str();
    let statement = match &node.properties {
        Properties::Frequency(p) => format!("fsig({})", render(setup, &p.frequency)?),
        Properties::Laser(p) => format!(
            "l {} P={} phase={}",
            name,
            render(setup, &p.power)?,
            render(setup, &p.phase)?
        ),
        Properties::Squeezer(p) => format!(
            "sq {} db={} angle={}",
            name,
            render(setup, &p.db)?,
            render(setup, &p.angle)?
        ),
        Properties::Mirror(p) => {
            let (r, t) = fold_loss(setup, &p.reflectivity, &p.loss)?;
            format!(
                "m {} R={} T={} L={} phi={}",
                name,
                format_float(r),
                format_float(t),
                render(setup, &p.loss)?,
                render(setup, &p.tuning)?
            )
        }
        Properties::Beamsplitter(p) => {
            let (r, t) = fold_loss(setup, &p.reflectivity, &p.loss)?;
            format!(
                "bs {} R={} T={} L={} phi={} alpha={}",
                name,
                format_float(r),
                format_float(t),
                render(setup, &p.loss)?,
                render(setup, &p.tuning)?,
                render(setup, &p.alpha)?
            )
        }
        Properties::FreeMass(p) => {
            let target = node_target(node)?;
            format!("free_mass {} {}.mech mass={}", name, target, render(setup, &p.mass)?)
        }
        Properties::Signal(p) => {
            let target = node.target_name().ok_or_else(|| FinesseError::MissingTarget {
                kind: ComponentKind::Signal.as_str(),
                name: name.to_string(),
            })?;
            let phase = render(setup, &p.phase)?;
            match node.target.as_ref() {
                Some(Reference::PseudoProperty { property, .. }) => match property {
                    PseudoProperty::Frequency => format!(
                        "sgen {} {}.frq.i amplitude={} phase={}",
                        name,
                        target,
                        render(setup, &p.amplitude)?,
                        phase
                    ),
                    PseudoProperty::Amplitude => format!(
                        "sgen {} {}.amp.i amplitude=sqrt({}.P) phase={}",
                        name, target, target, phase
                    ),
                },
                _ => format!(
                    "sgen {} {}.h amplitude={} phase={}",
                    name,
                    target,
                    render(setup, &p.amplitude)?,
                    phase
                ),
            }
        }
        Properties::Qnoised(_) => {
            let target = node_target(node)?;
            let missing = |field| FinesseError::MissingField {
                kind: ComponentKind::Qnoised.as_str(),
                name: name.to_string(),
                field,
            };
            let port = node.port.ok_or_else(|| missing("port"))?;
            let direction = node.direction.ok_or_else(|| missing("direction"))?;
            let target_kind = setup.node(target)?.kind();
            let code = port_code(target_kind, port).ok_or_else(|| FinesseError::UntranslatablePort {
                kind: target_kind.as_str(),
                node: target.to_string(),
                port: port.as_str(),
            })?;
            format!("qnoised {} {}.{}.{}", name, target, code, direction_code(direction))
        }
        Properties::DirectionalBeamsplitter(_) => format!("dbs {}", name),
        Properties::Nothing(_) => format!("nothing {}", name),
        Properties::Detector(_) | Properties::Qhd(_) | Properties::Space(_) => {
            tracing::debug!(kind = %node.kind(), name, "no Finesse statement for node");
            return Ok(None);
        }
    };
    Ok(Some(statement))
}

fn space_statement(setup: &Setup, space: &Space) -> Result<String, FinesseError> {
    let source_code = endpoint_code(setup, &space.source, space.source_port)?;
    let target_code = endpoint_code(setup, &space.target, space.target_port)?;
    Ok(format!(
        "s {} {}.{} {}.{} L={} nr={}",
        space.name(),
        space.source,
        source_code,
        space.target,
        target_code,
        render(setup, &space.properties.length)?,
        render(setup, &space.properties.refractive_index)?
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `(R, T)` with the loss folded back in.
fn fold_loss(
    setup: &Setup,
    reflectivity: &PropertyValue,
    loss: &PropertyValue,
) -> Result<(f64, f64), FinesseError> {
    let l = setup.evaluate(loss)?;
    let r = setup.evaluate(reflectivity)? * (1.0 - l);
    Ok((r, 1.0 - r - l))
}

/// Renders a value in a literal slot.
fn render(setup: &Setup, value: &PropertyValue) -> Result<String, FinesseError> {
    match value {
        PropertyValue::Literal(scalar) => Ok(scalar.to_string()),
        PropertyValue::Derived(derived) => {
            let kind = setup.node(&derived.source.node)?.kind();
            Ok(format!(
                "{}({}.{})",
                derived.transform.as_str(),
                derived.source.node,
                finesse_attribute(kind, &derived.source.property)
            ))
        }
    }
}

/// The node a free mass or detector is attached to.
fn node_target(node: &Node) -> Result<&str, FinesseError> {
    match &node.target {
        Some(Reference::Node(target)) => Ok(target),
        Some(other) => Err(FinesseError::WrongTargetKind {
            kind: node.kind().as_str(),
            name: node.name.clone(),
            target: other.to_string(),
            expected: "node",
        }),
        None => Err(FinesseError::MissingTarget {
            kind: node.kind().as_str(),
            name: node.name.clone(),
        }),
    }
}

fn endpoint_code(setup: &Setup, name: &str, port: Port) -> Result<&'static str, FinesseError> {
    let kind = setup.node(name)?.kind();
    port_code(kind, port).ok_or_else(|| FinesseError::UntranslatablePort {
        kind: kind.as_str(),
        node: name.to_string(),
        port: port.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::{NodeDef, SpaceDef};
    use crate::value::Derived;
    use proptest::prelude::*;

    fn toy() -> Setup {
        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::Laser, "l0")).unwrap();
        setup.add(NodeDef::new(ComponentKind::Mirror, "m1")).unwrap();
        setup.space(SpaceDef::new("l0", "m1")).unwrap();
        setup
    }

    #[test]
    fn toy_setup_serializes_exactly() {
        let r = 0.5 * (1.0 - 5e-6);
        let t = 1.0 - r - 5e-6;
        let expected = format!(
            "l l0 P=1 phase=0\nm m1 R={} T={} L=5e-06 phi=0\n\ns l0_m1 l0.p1 m1.p1 L=0 nr=1.0\n",
            format_float(r),
            format_float(t)
        );
        assert_eq!(to_finesse(&toy()).unwrap(), expected);
    }

    #[test]
    fn lossless_beamsplitter() {
        let mut setup = Setup::new();
        setup
            .add(
                NodeDef::new(ComponentKind::Beamsplitter, "bs")
                    .with("reflectivity", 0.5)
                    .with("loss", 0),
            )
            .unwrap();
        insta::assert_snapshot!(to_finesse(&setup).unwrap().trim_end(), @r"
        bs bs R=0.5 T=0.5 L=0 phi=0 alpha=45.0
        ");
    }

    #[test]
    fn signal_templates_follow_target() {
        let mut setup = toy();
        setup.add(NodeDef::new(ComponentKind::Frequency, "f")).unwrap();
        setup
            .add(NodeDef::new(ComponentKind::Signal, "sfrq").target("l0_frequency"))
            .unwrap();
        setup
            .add(
                NodeDef::new(ComponentKind::Signal, "samp")
                    .target("l0_amplitude")
                    .with("amplitude", Derived::sqrt_of("l0", "power")),
            )
            .unwrap();
        setup
            .add(
                NodeDef::new(ComponentKind::Signal, "sspace")
                    .target("l0_m1")
                    .with("phase", 180),
            )
            .unwrap();
        let out = to_finesse(&setup).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            &lines[2..6],
            &[
                "fsig(1)",
                "sgen sfrq l0.frq.i amplitude=1.0 phase=0.0",
                "sgen samp l0.amp.i amplitude=sqrt(l0.P) phase=0.0",
                "sgen sspace l0_m1.h amplitude=1.0 phase=180",
            ]
        );
    }

    #[test]
    fn detectors_translate_ports() {
        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::Beamsplitter, "bhbs")).unwrap();
        setup
            .add(
                NodeDef::new(ComponentKind::Qnoised, "noise-top")
                    .target("bhbs")
                    .port("top")
                    .direction("out")
                    .auxiliary(true),
            )
            .unwrap();
        setup
            .add(
                NodeDef::new(ComponentKind::Detector, "det")
                    .target("bhbs")
                    .port("top")
                    .direction("out"),
            )
            .unwrap();
        let out = to_finesse(&setup).unwrap();
        assert!(out.contains("qnoised noise-top bhbs.p2.o\n"));
        assert!(!out.contains("det"));
    }

    #[test]
    fn free_mass_and_passive_components() {
        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::Mirror, "m")).unwrap();
        setup
            .add(NodeDef::new(ComponentKind::FreeMass, "msus").target("m").with("mass", 200))
            .unwrap();
        setup
            .add(NodeDef::new(ComponentKind::DirectionalBeamsplitter, "dbs1"))
            .unwrap();
        setup.add(NodeDef::new(ComponentKind::Nothing, "n")).unwrap();
        setup
            .add(NodeDef::new(ComponentKind::Squeezer, "sq").with("db", 10).with("angle", 0))
            .unwrap();
        setup
            .space(SpaceDef::new("dbs1", "n").source_port("bottom").length(2.5))
            .unwrap();
        let out = to_finesse(&setup).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "free_mass msus m.mech mass=200");
        assert_eq!(lines[2], "dbs dbs1");
        assert_eq!(lines[3], "nothing n");
        assert_eq!(lines[4], "sq sq db=10 angle=0");
        assert_eq!(lines[6], "s dbs1_n dbs1.p4 n.p1 L=2.5 nr=1.0");
    }

    #[test]
    fn incomplete_nodes_fail() {
        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::FreeMass, "loose")).unwrap();
        assert_eq!(
            to_finesse(&setup).unwrap_err(),
            FinesseError::MissingTarget {
                kind: "free_mass",
                name: "loose".into()
            }
        );

        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::Mirror, "m")).unwrap();
        setup
            .add(NodeDef::new(ComponentKind::Qnoised, "q").target("m").direction("out"))
            .unwrap();
        assert_eq!(
            to_finesse(&setup).unwrap_err(),
            FinesseError::MissingField {
                kind: "qnoised",
                name: "q".into(),
                field: "port"
            }
        );
    }

    #[test]
    fn untranslatable_ports_fail() {
        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::Mirror, "a")).unwrap();
        setup.add(NodeDef::new(ComponentKind::Mirror, "b")).unwrap();
        setup.space(SpaceDef::new("a", "b").source_port("top")).unwrap();
        assert_eq!(
            to_finesse(&setup).unwrap_err(),
            FinesseError::UntranslatablePort {
                kind: "mirror",
                node: "a".into(),
                port: "top"
            }
        );
    }

    #[test]
    fn derived_values_render_as_expressions() {
        let mut setup = Setup::new();
        setup.add(NodeDef::new(ComponentKind::Laser, "l0").with("power", 4)).unwrap();
        setup
            .add(NodeDef::new(ComponentKind::Laser, "l1").with("power", Derived::sqrt_of("l0", "power")))
            .unwrap();
        let out = to_finesse(&setup).unwrap();
        assert!(out.contains("l l1 P=sqrt(l0.P) phase=0\n"));
    }

    proptest! {
        #[test]
        fn loss_fold_round_trips(t in 0.0f64..0.9, l in 0.0f64..1e-3) {
            let mut setup = Setup::new();
            setup
                .add(
                    NodeDef::new(ComponentKind::Mirror, "m")
                        .with("transmissivity", t)
                        .with("loss", l),
                )
                .unwrap();
            let props = match &setup.node("m").unwrap().properties {
                Properties::Mirror(p) => p.clone(),
                other => panic!("unexpected {:?}", other),
            };
            let (_, folded_t) = fold_loss(&setup, &props.reflectivity, &props.loss).unwrap();
            prop_assert!((folded_t - t).abs() < 1e-12);
        }
    }
}
