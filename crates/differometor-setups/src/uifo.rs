//! Universal interferometer (UIFO): a `size` x `size` grid of unit cells
//! surrounded by a ring of boundary cells.
//!
//! A unit cell at `(x, y)` has a center (beamsplitter or directional
//! beamsplitter) connected to four suspended mirrors `ml`, `mt`, `mr`, `mb`.
//! Neighbouring cells are joined mirror to mirror (`mr{x}{y-1}` to
//! `ml{x}{y}`, `mt{x}{y}` to `mb{x-1}{y}`), and every outer mirror faces a
//! boundary cell at row or column `0` or `size + 1` holding a laser, a
//! squeezer, or a detector. Every space carries a phase signal.

use std::collections::HashMap;

use differometor_core::{ComponentKind, NodeDef, Port, Setup, SetupError, SpaceDef};
use rand::Rng;

/// Component at the center of a unit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Center {
    Beamsplitter,
    DirectionalBeamsplitter,
}

/// Source or sink of a boundary cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Laser,
    Squeezer,
    Detector,
}

/// Options for [`uifo`].
#[derive(Debug, Clone)]
pub struct UifoOptions {
    /// Number of unit cells along each side.
    pub size: usize,
    /// Explicit centers and the center port facing `ml`, keyed by `(x, y)`.
    pub centers: HashMap<(usize, usize), (Center, Port)>,
    /// Explicit boundary cells, keyed by `(x, y)`.
    pub boundaries: HashMap<(usize, usize), Boundary>,
    /// Draw unspecified centers, orientations and boundaries at random and
    /// place one detector on the boundary if none is given.
    pub random: bool,
}

impl Default for UifoOptions {
    fn default() -> Self {
        UifoOptions {
            size: 1,
            centers: HashMap::new(),
            boundaries: HashMap::new(),
            random: false,
        }
    }
}

impl UifoOptions {
    pub fn new(size: usize) -> Self {
        UifoOptions {
            size,
            ..Self::default()
        }
    }

    pub fn random(mut self, random: bool) -> Self {
        self.random = random;
        self
    }

    pub fn center(mut self, x: usize, y: usize, center: Center, left_port: Port) -> Self {
        self.centers.insert((x, y), (center, left_port));
        self
    }

    pub fn boundary(mut self, x: usize, y: usize, boundary: Boundary) -> Self {
        self.boundaries.insert((x, y), boundary);
        self
    }
}

const ORIENTATIONS: [Port; 4] = [Port::Left, Port::Top, Port::Right, Port::Bottom];

/// Source ports of the center towards `ml`, `mt`, `mr`, `mb` for a given
/// orientation of the port facing `ml`.
fn center_ports(left_port: Port) -> [Port; 4] {
    match left_port {
        Port::Left => [Port::Left, Port::Top, Port::Right, Port::Bottom],
        Port::Top => [Port::Bottom, Port::Left, Port::Top, Port::Right],
        Port::Right => [Port::Right, Port::Bottom, Port::Left, Port::Top],
        Port::Bottom => [Port::Top, Port::Right, Port::Bottom, Port::Left],
    }
}

/// Phase of a signal on a space, 180 on vertical spaces.
fn phase(vertical: bool) -> i32 {
    if vertical {
        180
    } else {
        0
    }
}

struct Grid<'a, R> {
    options: &'a UifoOptions,
    boundaries: HashMap<(usize, usize), Boundary>,
    rng: &'a mut R,
}

impl<R: Rng> Grid<'_, R> {
    fn center_at(&mut self, x: usize, y: usize) -> (Center, Port) {
        if let Some(center) = self.options.centers.get(&(x, y)) {
            return *center;
        }
        if !self.options.random {
            return (Center::Beamsplitter, Port::Left);
        }
        let center = if self.rng.gen_bool(0.5) {
            Center::Beamsplitter
        } else {
            Center::DirectionalBeamsplitter
        };
        (center, ORIENTATIONS[self.rng.gen_range(0..ORIENTATIONS.len())])
    }

    fn boundary_at(&mut self, x: usize, y: usize) -> Boundary {
        if let Some(boundary) = self.boundaries.get(&(x, y)) {
            return *boundary;
        }
        if self.options.random && self.rng.gen_bool(0.5) {
            Boundary::Squeezer
        } else {
            Boundary::Laser
        }
    }

    /// Adds a detector boundary at a random position unless one is given.
    fn place_detector(&mut self) {
        if self.boundaries.values().any(|b| *b == Boundary::Detector) {
            return;
        }
        let size = self.options.size;
        let edge = if self.rng.gen_bool(0.5) { 0 } else { size + 1 };
        let along = self.rng.gen_range(1..=size);
        let key = if self.rng.gen_bool(0.5) {
            (edge, along)
        } else {
            (along, edge)
        };
        tracing::debug!(x = key.0, y = key.1, "placing detector boundary");
        self.boundaries.insert(key, Boundary::Detector);
    }
}

/// Builds a UIFO grid.
///
/// With `options.random`, unspecified centers, orientations and boundaries
/// are drawn from `rng`; otherwise they default to a beamsplitter facing
/// left and a laser.
pub fn uifo<R: Rng>(options: &UifoOptions, rng: &mut R) -> Result<Setup, SetupError> {
    let n = options.size;
    let mut grid = Grid {
        options,
        boundaries: options.boundaries.clone(),
        rng,
    };
    if options.random && n > 0 {
        grid.place_detector();
    }

    let mut s = Setup::new();
    s.add(NodeDef::new(ComponentKind::Frequency, "f"))?;

    for x in 1..=n {
        for y in 1..=n {
            let (center, left_port) = grid.center_at(x, y);
            unit_cell(&mut s, x, y, center, left_port)?;
        }
    }

    // cells are joined through the right ports, the left ones face the center
    for x in 1..=n {
        for y in 1..=n {
            if x > 1 {
                let (top, bottom) = (format!("mt{x}{y}"), format!("mb{}{y}", x - 1));
                s.space(
                    SpaceDef::new(top.as_str(), bottom.as_str())
                        .source_port("right")
                        .target_port("right"),
                )?;
                signal(&mut s, &top, &bottom, Some(phase(true)))?;
            }
            if y > 1 {
                let (right, left) = (format!("mr{x}{}", y - 1), format!("ml{x}{y}"));
                s.space(
                    SpaceDef::new(right.as_str(), left.as_str())
                        .source_port("right")
                        .target_port("right"),
                )?;
                signal(&mut s, &right, &left, None)?;
            }
        }
    }

    for x in 1..=n {
        let boundary = grid.boundary_at(x, 0);
        boundary_cell(&mut s, x, 0, boundary, false)?;
        link_boundary(&mut s, &format!("m{x}0"), &format!("ml{x}1"), None)?;

        let boundary = grid.boundary_at(x, n + 1);
        boundary_cell(&mut s, x, n + 1, boundary, false)?;
        link_boundary(&mut s, &format!("mr{x}{n}"), &format!("m{x}{}", n + 1), None)?;
    }
    for y in 1..=n {
        let boundary = grid.boundary_at(0, y);
        boundary_cell(&mut s, 0, y, boundary, true)?;
        link_boundary(&mut s, &format!("m0{y}"), &format!("mt1{y}"), Some(phase(true)))?;

        let boundary = grid.boundary_at(n + 1, y);
        boundary_cell(&mut s, n + 1, y, boundary, true)?;
        link_boundary(&mut s, &format!("mb{n}{y}"), &format!("m{}{y}", n + 1), Some(phase(true)))?;
    }

    tracing::debug!(size = n, random = options.random, nodes = s.node_count(), "built uifo setup");
    Ok(s)
}

fn unit_cell(s: &mut Setup, x: usize, y: usize, center: Center, left_port: Port) -> Result<(), SetupError> {
    let center_name = format!("center{x}{y}");
    match center {
        Center::Beamsplitter => {
            s.add(NodeDef::new(ComponentKind::Beamsplitter, center_name.as_str()))?;
            s.add(
                NodeDef::new(ComponentKind::FreeMass, format!("{center_name}sus"))
                    .target(center_name.as_str()),
            )?;
        }
        Center::DirectionalBeamsplitter => {
            s.add(NodeDef::new(
                ComponentKind::DirectionalBeamsplitter,
                center_name.as_str(),
            ))?;
        }
    }

    let mirrors = ["ml", "mt", "mr", "mb"].map(|m| format!("{m}{x}{y}"));
    for mirror in &mirrors {
        s.add(NodeDef::new(ComponentKind::Mirror, mirror.as_str()))?;
    }
    for mirror in &mirrors {
        s.add(NodeDef::new(ComponentKind::FreeMass, format!("{mirror}sus")).target(mirror.as_str()))?;
    }

    // the center always takes the left port of the cell mirrors
    for (mirror, port) in mirrors.iter().zip(center_ports(left_port)) {
        s.space(
            SpaceDef::new(center_name.as_str(), mirror.as_str())
                .length(1)
                .source_port(port.as_str()),
        )?;
    }

    let turned = matches!(left_port, Port::Top | Port::Bottom);
    let [ml, mt, mr, mb] = &mirrors;
    signal(s, &center_name, ml, Some(phase(turned)))?;
    signal(s, &center_name, mr, Some(phase(turned)))?;
    signal(s, &center_name, mt, Some(phase(!turned)))?;
    signal(s, &center_name, mb, Some(phase(!turned)))?;
    Ok(())
}

/// A boundary mirror, its suspension, and the source or detector behind it.
/// Sources and detectors always use the mirror's left port.
fn boundary_cell(
    s: &mut Setup,
    x: usize,
    y: usize,
    boundary: Boundary,
    vertical: bool,
) -> Result<(), SetupError> {
    let mirror = format!("m{x}{y}");
    s.add(NodeDef::new(ComponentKind::Mirror, mirror.as_str()))?;
    s.add(NodeDef::new(ComponentKind::FreeMass, format!("{mirror}sus")).target(mirror.as_str()))?;

    let source = format!("boundary{x}{y}");
    match boundary {
        Boundary::Detector => {
            s.add(
                NodeDef::new(ComponentKind::Detector, format!("{source}detector"))
                    .target(mirror.as_str())
                    .port("left")
                    .direction("out"),
            )?;
            s.add(
                NodeDef::new(ComponentKind::Qnoised, format!("{source}noise"))
                    .target(mirror.as_str())
                    .port("left")
                    .direction("out"),
            )?;
        }
        Boundary::Laser | Boundary::Squeezer => {
            let kind = if boundary == Boundary::Laser {
                ComponentKind::Laser
            } else {
                ComponentKind::Squeezer
            };
            s.add(NodeDef::new(kind, source.as_str()))?;
            s.space(SpaceDef::new(source.as_str(), mirror.as_str()))?;
            signal(s, &source, &mirror, Some(phase(vertical)))?;
        }
    }
    Ok(())
}

/// Joins an outer grid mirror and a boundary mirror through the right port
/// of `target`, the only one still open.
fn link_boundary(s: &mut Setup, source: &str, target: &str, phase: Option<i32>) -> Result<(), SetupError> {
    s.space(SpaceDef::new(source, target).target_port("right"))?;
    signal(s, source, target, phase)
}

/// Signal `s{source}{target}` on the space `source_target`. Without a phase
/// the signal keeps its default.
fn signal(s: &mut Setup, source: &str, target: &str, phase: Option<i32>) -> Result<(), SetupError> {
    let mut def = NodeDef::new(ComponentKind::Signal, format!("s{source}{target}"))
        .target(format!("{source}{}{target}", differometor_core::SEPARATOR));
    if let Some(phase) = phase {
        def = def.with("phase", phase);
    }
    s.add(def)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientations_rotate_ports() {
        assert_eq!(center_ports(Port::Left), ORIENTATIONS);
        for port in ORIENTATIONS {
            let ports = center_ports(port);
            let mut sorted = ports.map(|p| p.as_str());
            sorted.sort();
            assert_eq!(sorted, ["bottom", "left", "right", "top"]);
            let opposite = match port {
                Port::Top => Port::Bottom,
                Port::Bottom => Port::Top,
                other => other,
            };
            assert_eq!(ports[0], opposite);
        }
    }

    #[test]
    fn vertical_spaces_get_phase_180() {
        assert_eq!(phase(true), 180);
        assert_eq!(phase(false), 0);
    }
}
