//! Compound references.
//!
//! Node names never contain the separator, so a name with one separator is
//! either an edge (`"source_target"`) or a node pseudo-property
//! (`"laser_amplitude"`, `"laser_frequency"`). [`Reference::parse`] makes
//! that distinction once; resolution against the graph happens in
//! [`Setup`](crate::setup::Setup).

use std::fmt;
use std::str::FromStr;

use crate::error::SetupError;
use crate::SEPARATOR;

/// Node attributes that can be modulated directly by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoProperty {
    Amplitude,
    Frequency,
}

impl PseudoProperty {
    pub fn as_str(self) -> &'static str {
        match self {
            PseudoProperty::Amplitude => "amplitude",
            PseudoProperty::Frequency => "frequency",
        }
    }
}

impl FromStr for PseudoProperty {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amplitude" => Ok(PseudoProperty::Amplitude),
            "frequency" => Ok(PseudoProperty::Frequency),
            _ => Err(SetupError::InvalidEnum {
                field: "pseudo-property",
                value: s.to_string(),
                allowed: &["amplitude", "frequency"],
            }),
        }
    }
}

impl fmt::Display for PseudoProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `target` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Node(String),
    Edge { source: String, target: String },
    PseudoProperty {
        node: String,
        property: PseudoProperty,
    },
}

impl Reference {
    /// Splits a reference string at its first separator.
    ///
    /// A tail naming a pseudo-property makes a [`Reference::PseudoProperty`];
    /// any other tail makes an [`Reference::Edge`]. Strings with more than one
    /// separator are kept whole as an edge source so that resolution reports
    /// them as missing.
    pub fn parse(s: &str) -> Reference {
        match s.split_once(SEPARATOR) {
            None => Reference::Node(s.to_string()),
            Some((head, tail)) => match tail.parse::<PseudoProperty>() {
                Ok(property) => Reference::PseudoProperty {
                    node: head.to_string(),
                    property,
                },
                Err(_) => Reference::Edge {
                    source: head.to_string(),
                    target: tail.to_string(),
                },
            },
        }
    }

    /// The node or edge this reference points at.
    pub fn entity(&self) -> EntityRef {
        match self {
            Reference::Node(name) | Reference::PseudoProperty { node: name, .. } => {
                EntityRef::Node(name.clone())
            }
            Reference::Edge { source, target } => EntityRef::Edge {
                source: source.clone(),
                target: target.clone(),
            },
        }
    }

    pub fn pseudo_property(&self) -> Option<PseudoProperty> {
        match self {
            Reference::PseudoProperty { property, .. } => Some(*property),
            _ => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Node(name) => f.write_str(name),
            Reference::Edge { source, target } => write!(f, "{}{}{}", source, SEPARATOR, target),
            Reference::PseudoProperty { node, property } => {
                write!(f, "{}{}{}", node, SEPARATOR, property)
            }
        }
    }
}

/// The owner of a property: a node, or a space addressed by its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Node(String),
    Edge { source: String, target: String },
}

impl EntityRef {
    pub fn edge(source: impl Into<String>, target: impl Into<String>) -> Self {
        EntityRef::Edge {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn node(name: impl Into<String>) -> Self {
        EntityRef::Node(name.into())
    }
}

impl FromStr for EntityRef {
    type Err = SetupError;

    /// Parses a node name or an edge's compound name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(SEPARATOR) {
            None => Ok(EntityRef::Node(s.to_string())),
            Some((source, target)) if !target.contains(SEPARATOR) => {
                Ok(EntityRef::edge(source, target))
            }
            Some(_) => Err(SetupError::UnresolvedReference {
                reference: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Node(name) => f.write_str(name),
            EntityRef::Edge { source, target } => write!(f, "{}{}{}", source, SEPARATOR, target),
        }
    }
}
