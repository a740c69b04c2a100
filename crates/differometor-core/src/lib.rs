pub mod error;
pub mod value;
pub mod schema;
pub mod reference;
pub mod node;
pub mod def;
pub mod parameter;
pub mod setup;
pub mod views;
pub mod init;
pub mod constrain;
pub mod finesse;

/// Reserved character joining two entity names into a compound reference.
pub const SEPARATOR: char = '_';

// Re-export commonly used types
pub use error::{FinesseError, ParameterError, SetupError};
pub use value::{Derived, PropertyRef, PropertyValue, Scalar, Transform};
pub use schema::{ComponentKind, Properties};
pub use reference::{EntityRef, PseudoProperty, Reference};
pub use node::{Direction, Node, Port, Space};
pub use def::{Flag, NodeDef, SpaceDef, Statement};
pub use parameter::Parameter;
pub use setup::Setup;
pub use init::{initialize_parameters_randomly, initialize_with_config, BoundsTable, InitConfig};
pub use constrain::{constrain_inter_grid_cell_spaces, set_group_values, ParameterGroup};
pub use finesse::to_finesse;
