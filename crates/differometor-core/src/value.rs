//! Property values.
//!
//! A property either holds a literal number ([`Scalar`]) or a derived-value
//! marker ([`Derived`]) that takes another node's property and applies a
//! [`Transform`]. Integers and floats are kept apart because Finesse output
//! renders them differently (`1` vs `1.0`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::SEPARATOR;

/// A literal numeric property value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(i) => i as f64,
            Scalar::Float(x) => x,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Renders a float as the shortest string that round-trips.
///
/// Fixed notation is used for decimal exponents in `[-4, 16)` and always
/// carries a fractional part; anything else uses exponent notation with an
/// explicit sign and at least two exponent digits (`5e-06`, `1e+16`).
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sci = format!("{:e}", x);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };

    if !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exponent.abs());
    }

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let body = if exponent >= 0 {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
        } else {
            format!("{}.{}", &digits[..int_len], &digits[int_len..])
        }
    } else {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    };
    format!("{}{}", sign, body)
}

/// Function applied to a derived value's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Sqrt,
    Abs,
    Exp,
}

impl Transform {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Transform::Sqrt => x.sqrt(),
            Transform::Abs => x.abs(),
            Transform::Exp => x.exp(),
        }
    }

    /// Function name in Finesse expressions.
    pub fn as_str(self) -> &'static str {
        match self {
            Transform::Sqrt => "sqrt",
            Transform::Abs => "abs",
            Transform::Exp => "exp",
        }
    }
}

/// Addresses one property of one node, written `"node_property"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    pub node: String,
    pub property: String,
}

impl PropertyRef {
    pub fn new(node: impl Into<String>, property: impl Into<String>) -> Self {
        PropertyRef {
            node: node.into(),
            property: property.into(),
        }
    }
}

impl FromStr for PropertyRef {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(SEPARATOR) {
            Some((node, property))
                if !node.is_empty() && !property.is_empty() && !property.contains(SEPARATOR) =>
            {
                Ok(PropertyRef::new(node, property))
            }
            _ => Err(SetupError::UnresolvedReference {
                reference: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.node, SEPARATOR, self.property)
    }
}

/// "Take `source` and apply `transform`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub source: PropertyRef,
    pub transform: Transform,
}

impl Derived {
    pub fn new(source: PropertyRef, transform: Transform) -> Self {
        Derived { source, transform }
    }

    /// Square root of another node's property, as used for amplitude
    /// modulation driven by a laser's power.
    pub fn sqrt_of(node: impl Into<String>, property: impl Into<String>) -> Self {
        Derived::new(PropertyRef::new(node, property), Transform::Sqrt)
    }
}

/// A stored property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Literal(Scalar),
    Derived(Derived),
}

impl PropertyValue {
    pub fn literal(&self) -> Option<Scalar> {
        match self {
            PropertyValue::Literal(s) => Some(*s),
            PropertyValue::Derived(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        PropertyValue::Literal(Scalar::Float(x))
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Literal(Scalar::Int(i))
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Literal(Scalar::Int(i64::from(i)))
    }
}

impl From<Scalar> for PropertyValue {
    fn from(s: Scalar) -> Self {
        PropertyValue::Literal(s)
    }
}

impl From<Derived> for PropertyValue {
    fn from(d: Derived) -> Self {
        PropertyValue::Derived(d)
    }
}
