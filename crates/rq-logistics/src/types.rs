//! Allocation inputs and outputs.

use std::fmt;

/// A supply point: `capacity` units available on `source_street`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogisticsRequest {
    pub source_street: String,
    pub capacity:      f64,
}

impl LogisticsRequest {
    pub fn new(source_street: impl Into<String>, capacity: f64) -> Self {
        Self { source_street: source_street.into(), capacity }
    }
}

/// A demand point: `demand` units wanted on `dest_street`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogisticsDestination {
    pub dest_street: String,
    pub demand:      f64,
}

impl LogisticsDestination {
    pub fn new(dest_street: impl Into<String>, demand: f64) -> Self {
        Self { dest_street: dest_street.into(), demand }
    }
}

/// Units moved, kept integral when the learned amount is a whole number.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Quantity {
    Units(u64),
    Fraction(f64),
}

impl Quantity {
    /// `Units` for non-negative whole numbers that fit a `u64`, `Fraction`
    /// otherwise.
    pub fn from_f64(value: f64) -> Self {
        if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Quantity::Units(value as u64)
        } else {
            Quantity::Fraction(value)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Quantity::Units(n)    => n as f64,
            Quantity::Fraction(x) => x,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Quantity::Units(_))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Units(n)    => write!(f, "{n}"),
            Quantity::Fraction(x) => write!(f, "{x:.4}"),
        }
    }
}

/// One cell of the final allocation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportAllocation {
    pub source_street: String,
    pub dest_street:   String,
    pub quantity:      Quantity,
}
