//! # Rounding Policy
//!
//! Rounding is a separate stage applied after float coercion: [`to_float`]
//! never rounds, and [`round`] never coerces.
//!
//! [`to_float`]: crate::coerce::to_float

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coerce::to_float;
use crate::value::Value;

/// How to bring a float to a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Leave the value unchanged; the place count is ignored.
    #[default]
    None,
    /// Ceiling.
    Up,
    /// Floor.
    Down,
    /// Nearest, ties away from zero.
    Auto,
}

impl RoundingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Up => "up",
            Self::Down => "down",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "up" | "ceil" => Ok(Self::Up),
            "down" | "floor" => Ok(Self::Down),
            "auto" | "nearest" => Ok(Self::Auto),
            other => Err(format!(
                "unknown rounding mode {other:?} (expected none, up, down or auto)"
            )),
        }
    }
}

/// A rounding mode paired with a decimal-place count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingPolicy {
    pub mode: RoundingMode,
    pub places: i32,
}

impl RoundingPolicy {
    /// Negative `places` clamp to 0.
    pub fn new(mode: RoundingMode, places: i32) -> Self {
        Self {
            mode,
            places: places.max(0),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        round(value, self.mode, self.places)
    }
}

/// Round `value` to `places` decimal places under `mode`.
///
/// Negative `places` clamp to 0. Scaling that overflows to infinity leaves
/// the value as it was.
pub fn round(value: f64, mode: RoundingMode, places: i32) -> f64 {
    let scale = |op: fn(f64) -> f64| {
        let multiplier = 10f64.powf(f64::from(places.max(0)));
        let scaled = value * multiplier;
        if scaled.is_finite() {
            op(scaled) / multiplier
        } else {
            value
        }
    };
    match mode {
        RoundingMode::None => value,
        RoundingMode::Up => scale(f64::ceil),
        RoundingMode::Down => scale(f64::floor),
        RoundingMode::Auto => scale(f64::round),
    }
}

/// [`to_float`] followed by [`round`].
pub fn to_float_rounded(value: &Value, mode: RoundingMode, places: i32) -> f64 {
    round(to_float(value), mode, places)
}
