//! Parameter entries: `(entity, property)` pairs exposed to an optimizer.
//!
//! The list is accumulated by [`Setup`](crate::setup::Setup) during
//! construction; its order is the construction order and is what external
//! code zips values against.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::reference::EntityRef;

/// One tunable property of one node or space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter {
    pub entity: EntityRef,
    pub property: String,
}

impl Parameter {
    pub fn new(entity: EntityRef, property: impl Into<String>) -> Self {
        Parameter {
            entity,
            property: property.into(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.property)
    }
}

/// Serialized as the pair `["entity", "property"]`, with edges written by
/// their compound name.
impl Serialize for Parameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.entity.to_string(), &self.property).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (entity, property) = <(String, String)>::deserialize(deserializer)?;
        let entity: EntityRef = entity.parse().map_err(D::Error::custom)?;
        Ok(Parameter::new(entity, property))
    }
}
