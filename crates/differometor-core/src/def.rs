//! Construction requests for [`Setup::add`](crate::setup::Setup::add) and
//! [`Setup::space`](crate::setup::Setup::space).
//!
//! The component kind, ports, directions and the auxiliary flag are kept as
//! raw values until the request is applied, so an invalid value fails the
//! construction call itself whether it came from code or from a JSON
//! description.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::schema::ComponentKind;
use crate::value::PropertyValue;

fn default_true() -> bool {
    true
}

fn default_source_port() -> String {
    "right".to_string()
}

fn default_target_port() -> String {
    "left".to_string()
}

/// Everything `add` needs to create one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub component: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub optimizable: bool,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub auxiliary: Option<Flag>,
    #[serde(default)]
    pub detector1: Option<String>,
    #[serde(default)]
    pub detector2: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
}

impl NodeDef {
    pub fn new(component: ComponentKind, name: impl Into<String>) -> Self {
        NodeDef {
            component: component.as_str().to_string(),
            name: name.into(),
            optimizable: true,
            target: None,
            port: None,
            direction: None,
            auxiliary: None,
            detector1: None,
            detector2: None,
            properties: IndexMap::new(),
        }
    }

    /// Overrides one property of the kind's default record.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    /// Keeps this node's properties out of the parameter list.
    pub fn fixed(mut self) -> Self {
        self.optimizable = false;
        self
    }

    pub fn optimizable(mut self, optimizable: bool) -> Self {
        self.optimizable = optimizable;
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn auxiliary(mut self, auxiliary: bool) -> Self {
        self.auxiliary = Some(Flag::Bool(auxiliary));
        self
    }

    pub fn detectors(mut self, detector1: impl Into<String>, detector2: impl Into<String>) -> Self {
        self.detector1 = Some(detector1.into());
        self.detector2 = Some(detector2.into());
        self
    }
}

/// A boolean field as written in a description, checked at `add` time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Flag {
    pub const NAMES: &'static [&'static str] = &["true", "false"];

    /// The flag's value, or `InvalidEnum` naming `field` when it is not a
    /// boolean.
    pub fn to_bool(&self, field: &'static str) -> Result<bool, SetupError> {
        match self {
            Flag::Bool(b) => Ok(*b),
            Flag::Text(s) if s == "true" => Ok(true),
            Flag::Text(s) if s == "false" => Ok(false),
            other => Err(SetupError::InvalidEnum {
                field,
                value: other.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flag::Bool(b) => write!(f, "{}", b),
            Flag::Number(n) => write!(f, "{}", n),
            Flag::Text(s) => f.write_str(s),
        }
    }
}

/// Everything `space` needs to connect two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceDef {
    pub source: String,
    pub target: String,
    #[serde(default = "default_true")]
    pub optimizable: bool,
    #[serde(default = "default_source_port")]
    pub source_port: String,
    #[serde(default = "default_target_port")]
    pub target_port: String,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
}

impl SpaceDef {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        SpaceDef {
            source: source.into(),
            target: target.into(),
            optimizable: true,
            source_port: default_source_port(),
            target_port: default_target_port(),
            properties: IndexMap::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    pub fn length(self, length: impl Into<PropertyValue>) -> Self {
        self.with("length", length)
    }

    pub fn fixed(mut self) -> Self {
        self.optimizable = false;
        self
    }

    pub fn source_port(mut self, port: impl Into<String>) -> Self {
        self.source_port = port.into();
        self
    }

    pub fn target_port(mut self, port: impl Into<String>) -> Self {
        self.target_port = port.into();
        self
    }
}

/// One construction call of a serialized setup description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Add(NodeDef),
    Space(SpaceDef),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let def = NodeDef::new(ComponentKind::Qnoised, "noise")
            .target("srm")
            .port("right")
            .direction("out")
            .auxiliary(true);
        assert_eq!(def.target.as_deref(), Some("srm"));
        assert_eq!(def.port.as_deref(), Some("right"));
        assert_eq!(def.direction.as_deref(), Some("out"));
        assert_eq!(def.auxiliary, Some(Flag::Bool(true)));
        assert_eq!(def.component, "qnoised");
        assert!(def.optimizable);
    }

    #[test]
    fn space_defaults_to_right_left() {
        let def = SpaceDef::new("a", "b");
        assert_eq!(def.source_port, "right");
        assert_eq!(def.target_port, "left");
        assert!(def.properties.is_empty());
    }

    #[test]
    fn statements_deserialize_with_defaults() {
        let json = r#"[
            {"add": {"component": "laser", "name": "l0", "properties": {"power": 2}}},
            {"add": {"component": "mirror", "name": "m1", "optimizable": false}},
            {"space": {"source": "l0", "target": "m1", "properties": {"length": 1.5}}}
        ]"#;
        let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
        assert_eq!(statements.len(), 3);
        match &statements[1] {
            Statement::Add(def) => {
                assert_eq!(def.component, "mirror");
                assert!(!def.optimizable);
            }
            other => panic!("expected add, got {other:?}"),
        }
        match &statements[2] {
            Statement::Space(def) => {
                assert_eq!(def.source_port, "right");
                assert_eq!(def.target_port, "left");
                assert!(def.optimizable);
            }
            other => panic!("expected space, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kinds_and_flags_survive_deserialization() {
        let json = r#"[{"add": {"component": "photodiode", "name": "pd", "auxiliary": "maybe"}}]"#;
        let statements: Vec<Statement> = serde_json::from_str(json).unwrap();
        match &statements[0] {
            Statement::Add(def) => {
                assert_eq!(def.component, "photodiode");
                assert_eq!(def.auxiliary, Some(Flag::Text("maybe".into())));
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn flags_accept_booleans_only() {
        assert_eq!(Flag::Bool(false).to_bool("auxiliary"), Ok(false));
        assert_eq!(Flag::Text("true".into()).to_bool("auxiliary"), Ok(true));
        let err = Flag::Number(2.0).to_bool("auxiliary").unwrap_err();
        assert!(matches!(
            err,
            SetupError::InvalidEnum { field: "auxiliary", ref value, .. } if value == "2"
        ));
    }
}
