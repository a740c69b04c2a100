//! Parameter tying for grid setups.
//!
//! In a grid of unit cells, the spaces joining neighbouring cells along one
//! column (horizontal spaces `mr{x}{y}_ml{x}{y+1}`) or one row (vertical
//! spaces `mt{x}{y}_mb{x-1}{y}`) share a single length. The grouper turns
//! the matching `length` parameters into one group per coordinate and
//! passes everything else through unchanged.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::parameter::Parameter;
use crate::setup::Setup;

/// One logical degree of freedom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterGroup {
    Single(Parameter),
    /// Parameters that always receive the same value.
    Tied(Vec<Parameter>),
}

impl ParameterGroup {
    pub fn members(&self) -> &[Parameter] {
        match self {
            ParameterGroup::Single(p) => std::slice::from_ref(p),
            ParameterGroup::Tied(ps) => ps,
        }
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members().is_empty()
    }
}

/// Orientation of an inter-cell space in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Classifies an inter-cell space by name and returns the coordinate its
/// length is shared along.
fn inter_cell_key(name: &str) -> Option<(Axis, char)> {
    if name.contains("center") || name.contains("boundary") {
        return None;
    }
    let source = name.split(crate::SEPARATOR).next()?;
    if name.contains("mr") && name.contains("_ml") {
        // mr{x}{y}: last character is the column
        source.chars().last().map(|c| (Axis::Horizontal, c))
    } else if name.contains("mt") && name.contains("_mb") {
        // mt{x}{y}: second to last character is the row
        source.chars().rev().nth(1).map(|c| (Axis::Vertical, c))
    } else {
        None
    }
}

/// Keeps the parameters whose property is in `optimized_properties` and ties
/// the lengths of inter-cell spaces that share a row or column coordinate.
///
/// The output lists pass-through parameters first, in input order, followed by
/// the horizontal groups and then the vertical groups, each in order of first
/// appearance. A group with one member is emitted as
/// [`ParameterGroup::Single`]. Every filtered input parameter appears exactly
/// once.
pub fn constrain_inter_grid_cell_spaces(
    parameters: &[Parameter],
    optimized_properties: &[&str],
) -> Vec<ParameterGroup> {
    let mut singles = Vec::new();
    let mut horizontal: IndexMap<char, Vec<Parameter>> = IndexMap::new();
    let mut vertical: IndexMap<char, Vec<Parameter>> = IndexMap::new();

    for parameter in parameters
        .iter()
        .filter(|p| optimized_properties.contains(&p.property.as_str()))
    {
        let key = if parameter.property == "length" {
            inter_cell_key(&parameter.entity.to_string())
        } else {
            None
        };
        match key {
            Some((Axis::Horizontal, c)) => horizontal.entry(c).or_default().push(parameter.clone()),
            Some((Axis::Vertical, c)) => vertical.entry(c).or_default().push(parameter.clone()),
            None => singles.push(ParameterGroup::Single(parameter.clone())),
        }
    }

    let tied = horizontal
        .into_values()
        .chain(vertical.into_values())
        .map(|mut group| {
            if group.len() == 1 {
                ParameterGroup::Single(group.remove(0))
            } else {
                ParameterGroup::Tied(group)
            }
        });
    singles.into_iter().chain(tied).collect()
}

/// Writes one value per group, giving every member of a group the same value.
///
/// `values` must hold exactly one value per group; nothing is written otherwise.
pub fn set_group_values(
    setup: &mut Setup,
    groups: &[ParameterGroup],
    values: &[f64],
) -> Result<(), SetupError> {
    if groups.len() != values.len() {
        return Err(SetupError::ValueCount {
            expected: groups.len(),
            received: values.len(),
        });
    }
    for (group, value) in groups.iter().zip(values) {
        for parameter in group.members() {
            setup.set_value(&parameter.entity, &parameter.property, *value)?;
        }
    }
    Ok(())
}
