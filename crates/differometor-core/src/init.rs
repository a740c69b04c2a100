//! Randomized parameter initialization.
//!
//! Raw values are drawn uniformly from `[-uniform_bound, uniform_bound]` and
//! squashed into each property's `[low, high)` bound by a sigmoid, so every
//! written value lies inside its bound whatever the raw draw. A negative
//! `uniform_bound` draws from the same interval as its magnitude.

use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::parameter::Parameter;
use crate::setup::Setup;

/// `[low, high)` bounds keyed by property name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsTable {
    bounds: IndexMap<String, (f64, f64)>,
}

impl BoundsTable {
    pub fn empty() -> Self {
        BoundsTable {
            bounds: IndexMap::new(),
        }
    }

    /// Registers or replaces the bound of `property`.
    pub fn insert(
        &mut self,
        property: impl Into<String>,
        low: f64,
        high: f64,
    ) -> Result<(), ParameterError> {
        let property = property.into();
        if !(low < high) {
            return Err(ParameterError::InvalidBound { property, low, high });
        }
        self.bounds.insert(property, (low, high));
        Ok(())
    }

    pub fn get(&self, property: &str) -> Result<(f64, f64), ParameterError> {
        self.bounds
            .get(property)
            .copied()
            .ok_or_else(|| ParameterError::MissingBound {
                property: property.to_string(),
            })
    }
}

impl Default for BoundsTable {
    /// Bounds for every optimizable property of the component registry.
    fn default() -> Self {
        let bounds = [
            ("power", 0.0, 200.0),
            ("phase", -180.0, 180.0),
            ("db", 0.0, 20.0),
            ("angle", -180.0, 180.0),
            ("loss", 0.0, 1e-4),
            ("reflectivity", 0.0, 1.0),
            ("tuning", -180.0, 180.0),
            ("alpha", -90.0, 90.0),
            ("mass", 0.01, 200.0),
            ("length", 1.0, 4000.0),
            ("refractive_index", 1.0, 4.0),
            ("frequency", 1.0, 1e4),
            ("amplitude", 0.0, 1.0),
        ];
        BoundsTable {
            bounds: bounds
                .into_iter()
                .map(|(name, low, high)| (name.to_string(), (low, high)))
                .collect(),
        }
    }
}

/// Settings for [`initialize_with_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitConfig {
    /// Raw draws come from `[-uniform_bound, uniform_bound]`.
    pub uniform_bound: f64,
    /// PRNG seed, for reproducible initializations.
    pub seed: u64,
}

impl Default for InitConfig {
    fn default() -> Self {
        InitConfig {
            uniform_bound: 10.0,
            seed: 0,
        }
    }
}

/// Numerically stable logistic function.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Largest float strictly below `x`.
fn next_below(x: f64) -> f64 {
    if x.is_nan() || x == f64::NEG_INFINITY {
        return x;
    }
    if x == 0.0 {
        return -f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits - 1)
    } else {
        f64::from_bits(bits + 1)
    }
}

/// Maps `raw` monotonically into `[low, high)`.
pub fn sigmoid_bounding(raw: f64, low: f64, high: f64) -> f64 {
    let value = low + (high - low) * sigmoid(raw);
    if value >= high {
        next_below(high)
    } else if value < low {
        low
    } else {
        value
    }
}

/// Half-width of the raw draw interval, or `InvalidUniformBound` when the
/// interval cannot be sampled.
fn half_width(uniform_bound: f64) -> Result<f64, ParameterError> {
    let width = uniform_bound.abs();
    if !width.is_finite() || width > f64::MAX / 4.0 {
        return Err(ParameterError::InvalidUniformBound {
            value: uniform_bound,
        });
    }
    Ok(width)
}

/// Draws a value for every parameter and writes it into `setup`.
///
/// Returns the written values in parameter order. Nothing is written when a
/// bound is missing or `uniform_bound` is unusable.
pub fn initialize_parameters_randomly<R: Rng>(
    setup: &mut Setup,
    parameters: &[Parameter],
    bounds: &BoundsTable,
    uniform_bound: f64,
    rng: &mut R,
) -> Result<Vec<f64>, ParameterError> {
    let uniform_bound = half_width(uniform_bound)?;
    let ranges = parameters
        .iter()
        .map(|p| bounds.get(&p.property))
        .collect::<Result<Vec<_>, _>>()?;

    let values: Vec<f64> = ranges
        .into_iter()
        .map(|(low, high)| {
            let raw = if uniform_bound > 0.0 {
                rng.gen_range(-uniform_bound..=uniform_bound)
            } else {
                0.0
            };
            sigmoid_bounding(raw, low, high)
        })
        .collect();

    setup.set_values(parameters, &values)?;
    tracing::debug!(count = values.len(), "initialized parameters");
    Ok(values)
}

/// [`initialize_parameters_randomly`] with a `ChaCha8Rng` seeded from `config`.
pub fn initialize_with_config(
    setup: &mut Setup,
    parameters: &[Parameter],
    bounds: &BoundsTable,
    config: &InitConfig,
) -> Result<Vec<f64>, ParameterError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    initialize_parameters_randomly(setup, parameters, bounds, config.uniform_bound, &mut rng)
}
