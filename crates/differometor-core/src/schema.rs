//! Component schema registry.
//!
//! Every [`ComponentKind`] owns a fixed-field property record whose fields
//! and defaults form the kind's schema. The records and the [`Properties`]
//! sum type over them are generated by `component_schemas!`, so the
//! schema-closure rule ("exactly the default key set") is enforced by the
//! record types themselves: an override either names a field or is rejected.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::SetupError;
use crate::value::PropertyValue;

macro_rules! component_schemas {
    (
        $(
            $variant:ident ($record:ident) = $kind_name:literal {
                $( $field:ident : $default:expr ),* $(,)?
            }
        )*
    ) => {
        /// The closed set of component kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ComponentKind {
            $( $variant, )*
        }

        impl ComponentKind {
            /// All kinds, in registry order.
            pub const ALL: &'static [ComponentKind] = &[ $( ComponentKind::$variant, )* ];

            /// Registry name of the kind.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( ComponentKind::$variant => $kind_name, )*
                }
            }

            /// Property names of the kind's schema, in schema order.
            pub fn property_names(self) -> &'static [&'static str] {
                match self {
                    $( ComponentKind::$variant => $record::NAMES, )*
                }
            }
        }

        impl FromStr for ComponentKind {
            type Err = SetupError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $kind_name => Ok(ComponentKind::$variant), )*
                    _ => Err(SetupError::UnknownComponent { kind: s.to_string() }),
                }
            }
        }

        $(
            #[doc = concat!("Properties of a `", $kind_name, "` component.")]
            #[derive(Debug, Clone, PartialEq)]
            pub struct $record {
                $( pub $field: PropertyValue, )*
            }

            impl $record {
                pub const NAMES: &'static [&'static str] = &[ $( stringify!($field), )* ];

                #[allow(unused_variables)]
                pub fn get(&self, name: &str) -> Option<&PropertyValue> {
                    $( if name == stringify!($field) { return Some(&self.$field); } )*
                    None
                }

                #[allow(unused_variables)]
                pub fn get_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
                    $( if name == stringify!($field) { return Some(&mut self.$field); } )*
                    None
                }

                /// Merges `overrides` onto the default record.
                pub fn from_overrides(
                    overrides: &IndexMap<String, PropertyValue>,
                ) -> Result<Self, SetupError> {
                    let mut record = $record::default();
                    let unknown: Vec<String> = overrides
                        .keys()
                        .filter(|name| record.get(name).is_none())
                        .cloned()
                        .collect();
                    if !unknown.is_empty() {
                        return Err(schema_mismatch($kind_name, Self::NAMES, unknown));
                    }
                    for (name, value) in overrides {
                        if let Some(slot) = record.get_mut(name) {
                            *slot = value.clone();
                        }
                    }
                    Ok(record)
                }

                pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
                    let fields: Vec<(&'static str, &PropertyValue)> =
                        vec![ $( (stringify!($field), &self.$field), )* ];
                    fields.into_iter()
                }
            }

            impl Default for $record {
                fn default() -> Self {
                    $record {
                        $( $field: PropertyValue::Literal($default), )*
                    }
                }
            }
        )*

        /// A component's properties, one record variant per kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Properties {
            $( $variant($record), )*
        }

        impl Properties {
            /// The default record of `kind`.
            pub fn defaults(kind: ComponentKind) -> Self {
                match kind {
                    $( ComponentKind::$variant => Properties::$variant($record::default()), )*
                }
            }

            pub fn kind(&self) -> ComponentKind {
                match self {
                    $( Properties::$variant(_) => ComponentKind::$variant, )*
                }
            }

            pub fn get(&self, name: &str) -> Option<&PropertyValue> {
                match self {
                    $( Properties::$variant(r) => r.get(name), )*
                }
            }

            pub fn get_mut(&mut self, name: &str) -> Option<&mut PropertyValue> {
                match self {
                    $( Properties::$variant(r) => r.get_mut(name), )*
                }
            }

            /// Merges `overrides` onto the defaults of `kind`.
            ///
            /// Any override that is not a field of the kind's record makes the
            /// merged key set differ from the schema and fails with
            /// [`SetupError::SchemaMismatch`].
            pub fn merge(
                kind: ComponentKind,
                overrides: &IndexMap<String, PropertyValue>,
            ) -> Result<Self, SetupError> {
                match kind {
                    $( ComponentKind::$variant => $record::from_overrides(overrides).map(Properties::$variant), )*
                }
            }

            /// `(name, value)` pairs in schema order.
            pub fn iter(&self) -> Box<dyn Iterator<Item = (&'static str, &PropertyValue)> + '_> {
                match self {
                    $( Properties::$variant(r) => Box::new(r.iter()), )*
                }
            }
        }
    };
}

use crate::value::Scalar::{Float, Int};

/// The merged key set is the schema plus the unknown names.
fn schema_mismatch(kind: &str, names: &[&str], unknown: Vec<String>) -> SetupError {
    let expected: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    let mut received = expected.clone();
    received.extend(unknown);
    SetupError::SchemaMismatch {
        kind: kind.to_string(),
        expected,
        received,
    }
}

component_schemas! {
    Frequency (FrequencyProperties) = "frequency" { frequency: Int(1) }
    Laser (LaserProperties) = "laser" { power: Int(1), phase: Int(0) }
    Squeezer (SqueezerProperties) = "squeezer" { db: Int(0), angle: Int(90) }
    Mirror (MirrorProperties) = "mirror" {
        loss: Float(5e-6),
        reflectivity: Float(0.5),
        tuning: Int(0),
    }
    Beamsplitter (BeamsplitterProperties) = "beamsplitter" {
        loss: Float(5e-6),
        reflectivity: Float(0.5),
        tuning: Int(0),
        alpha: Float(45.0),
    }
    FreeMass (FreeMassProperties) = "free_mass" { mass: Float(40.0) }
    Signal (SignalProperties) = "signal" { amplitude: Float(1.0), phase: Float(0.0) }
    Space (SpaceProperties) = "space" { length: Int(0), refractive_index: Float(1.0) }
    Detector (DetectorProperties) = "detector" {}
    Qnoised (QnoisedProperties) = "qnoised" {}
    Qhd (QhdProperties) = "qhd" { phase: Int(0) }
    Nothing (NothingProperties) = "nothing" {}
    DirectionalBeamsplitter (DirectionalBeamsplitterProperties) = "directional_beamsplitter" {}
}

impl ComponentKind {
    /// Kinds whose properties never enter the parameter list.
    pub fn is_never_optimized(self) -> bool {
        matches!(self, ComponentKind::Signal | ComponentKind::Frequency)
    }

    /// Kinds stored as nodes; `space` only exists as an edge.
    pub fn is_node_kind(self) -> bool {
        self != ComponentKind::Space
    }

    /// Kinds whose reflectivity is given relative to the lossless sub-system.
    pub fn is_lossy_reflector(self) -> bool {
        matches!(self, ComponentKind::Mirror | ComponentKind::Beamsplitter)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Properties {
    /// Property names in schema order.
    pub fn names(&self) -> &'static [&'static str] {
        self.kind().property_names()
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}
