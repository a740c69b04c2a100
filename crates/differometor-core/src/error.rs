//! Error types for differometor-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Construction
//! errors ([`SetupError`]) abort the single `add`/`space` call that raised
//! them and leave the graph untouched.

use thiserror::Error;

/// Errors raised while building or mutating a [`Setup`](crate::setup::Setup).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    /// A node name contains the reserved `_` separator.
    #[error("node name '{name}' cannot contain '_', use '-' instead")]
    Naming { name: String },

    /// Both `reflectivity` and `transmissivity` were given for one mirror or beamsplitter.
    #[error("'{name}' specifies both reflectivity and transmissivity, give one of them together with loss")]
    Conflict { name: String },

    /// The component kind is not a node kind of the registry.
    #[error("component '{kind}' is not recognized")]
    UnknownComponent { kind: String },

    /// The merged property set differs from the kind's schema.
    #[error("component '{kind}' has the properties {expected:?} but received {received:?}")]
    SchemaMismatch {
        kind: String,
        expected: Vec<String>,
        received: Vec<String>,
    },

    /// A target, detector, edge, or derived-value source does not exist yet.
    #[error("'{reference}' is not in the setup")]
    UnresolvedReference { reference: String },

    /// A port, direction, or mode value outside its enumeration.
    #[error("{field} '{value}' is not recognized, use one of {allowed:?}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// A node with this name was already added.
    #[error("node '{name}' already exists")]
    DuplicateNode { name: String },

    /// A value list whose length differs from the parameters it is written to.
    #[error("expected {expected} values but received {received}")]
    ValueCount { expected: usize, received: usize },

    /// A space between these two nodes was already added.
    #[error("space '{source_name}_{target_name}' already exists")]
    DuplicateEdge {
        source_name: String,
        target_name: String,
    },
}

/// Errors raised while initializing or grouping parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// No `[low, high)` bound is registered for the property.
    #[error("no bounds registered for property '{property}'")]
    MissingBound { property: String },

    /// A bound whose low end is not below its high end.
    #[error("invalid bounds for property '{property}': [{low}, {high})")]
    InvalidBound { property: String, low: f64, high: f64 },

    /// A raw-draw half-width that is not finite or too large to sample.
    #[error("uniform bound {value} is not a finite, samplable half-width")]
    InvalidUniformBound { value: f64 },

    /// The parameter's owner could not be written.
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Errors raised while serializing a setup into Finesse statements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FinesseError {
    /// A node that needs a target has none.
    #[error("{kind} '{name}' has no target")]
    MissingTarget { kind: &'static str, name: String },

    /// A detector node lacks its port or direction.
    #[error("{kind} '{name}' has no {field}")]
    MissingField {
        kind: &'static str,
        name: String,
        field: &'static str,
    },

    /// A port that has no Finesse name on the given component kind.
    #[error("port '{port}' has no Finesse name on {kind} '{node}'")]
    UntranslatablePort {
        kind: &'static str,
        node: String,
        port: &'static str,
    },

    /// A target that is not of the reference type the statement needs.
    #[error("{kind} '{name}' targets '{target}', which is not a {expected}")]
    WrongTargetKind {
        kind: &'static str,
        name: String,
        target: String,
        expected: &'static str,
    },

    /// A lookup into the graph failed.
    #[error(transparent)]
    Setup(#[from] SetupError),
}
