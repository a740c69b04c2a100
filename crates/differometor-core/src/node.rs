//! Node and space records stored in the graph, plus the port and direction
//! enumerations they use.

use std::fmt;
use std::str::FromStr;

use crate::error::SetupError;
use crate::reference::{PseudoProperty, Reference};
use crate::schema::{ComponentKind, Properties, SpaceProperties};

/// Connection point on a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Left,
    Top,
    Right,
    Bottom,
}

impl Port {
    pub const NAMES: &'static [&'static str] = &["left", "top", "right", "bottom"];

    pub fn as_str(self) -> &'static str {
        match self {
            Port::Left => "left",
            Port::Top => "top",
            Port::Right => "right",
            Port::Bottom => "bottom",
        }
    }
}

impl FromStr for Port {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Port::Left),
            "top" => Ok(Port::Top),
            "right" => Ok(Port::Right),
            "bottom" => Ok(Port::Bottom),
            _ => Err(SetupError::InvalidEnum {
                field: "port",
                value: s.to_string(),
                allowed: Port::NAMES,
            }),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a detector looks at the field entering or leaving a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub const NAMES: &'static [&'static str] = &["in", "out"];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl FromStr for Direction {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            _ => Err(SetupError::InvalidEnum {
                field: "direction",
                value: s.to_string(),
                allowed: Direction::NAMES,
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component stored in the setup graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub properties: Properties,
    /// Resolved target: a node, an edge, or a node pseudo-property.
    pub target: Option<Reference>,
    pub port: Option<Port>,
    pub direction: Option<Direction>,
    pub auxiliary: Option<bool>,
    pub detector1: Option<String>,
    pub detector2: Option<String>,
}

impl Node {
    pub fn kind(&self) -> ComponentKind {
        self.properties.kind()
    }

    /// Name of the node or edge the target points at.
    ///
    /// For a pseudo-property reference this is just the node name; the
    /// property itself is returned by [`target_property`](Self::target_property).
    pub fn target_name(&self) -> Option<String> {
        self.target.as_ref().map(|t| t.entity().to_string())
    }

    pub fn target_property(&self) -> Option<PseudoProperty> {
        self.target.as_ref().and_then(Reference::pseudo_property)
    }
}

/// A propagation path between two node ports.
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    pub source: String,
    pub target: String,
    pub properties: SpaceProperties,
    pub source_port: Port,
    pub target_port: Port,
}

impl Space {
    /// Compound name `"source_target"`.
    pub fn name(&self) -> String {
        format!("{}{}{}", self.source, crate::SEPARATOR, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_parse() {
        for name in Port::NAMES {
            let port: Port = name.parse().unwrap();
            assert_eq!(port.as_str(), *name);
        }
    }

    #[test]
    fn invalid_port_names_allowed_values() {
        let err = "front".parse::<Port>().unwrap_err();
        assert_eq!(
            err,
            SetupError::InvalidEnum {
                field: "port",
                value: "front".into(),
                allowed: Port::NAMES,
            }
        );
    }

    #[test]
    fn directions_parse() {
        assert_eq!("in".parse::<Direction>().unwrap(), Direction::In);
        assert_eq!("out".parse::<Direction>().unwrap(), Direction::Out);
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn target_name_strips_pseudo_property() {
        let node = Node {
            name: "fl0".into(),
            properties: Properties::defaults(ComponentKind::Signal),
            target: Some(Reference::parse("l0_amplitude")),
            port: None,
            direction: None,
            auxiliary: None,
            detector1: None,
            detector2: None,
        };
        assert_eq!(node.target_name().as_deref(), Some("l0"));
        assert_eq!(node.target_property(), Some(PseudoProperty::Amplitude));
    }
}
