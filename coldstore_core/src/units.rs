//! # Unit Types
//!
//! Temperature newtypes and the time constants used by the load terms.
//! The wrappers serialize as bare numbers, so JSON stays clean.
//!
//! Struct fields elsewhere in the crate carry a unit suffix (`_c`, `_kw`,
//! `_m`) and plain `f64`; the wrappers are used where Celsius and kelvin
//! meet (Carnot COP, cascade intermediate temperature).
//!
//! ## Example
//!
//! ```rust
//! use coldstore_core::units::{Celsius, Kelvin};
//!
//! let room = Celsius(-18.0);
//! let abs: Kelvin = room.into();
//! assert!((abs.0 - 255.15).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Offset between the Celsius and Kelvin scales
pub const KELVIN_OFFSET: f64 = 273.15;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Hours in one year
pub const HOURS_PER_YEAR: f64 = 8_760.0;

// ============================================================================
// Temperature
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

/// Absolute temperature in kelvin
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kelvin(pub f64);

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Self {
        Kelvin(c.0 + KELVIN_OFFSET)
    }
}

impl From<Kelvin> for Celsius {
    fn from(k: Kelvin) -> Self {
        Celsius(k.0 - KELVIN_OFFSET)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Celsius);
impl_arithmetic!(Kelvin);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_kelvin() {
        let k: Kelvin = Celsius(0.0).into();
        assert_eq!(k.0, 273.15);
        let c: Celsius = Kelvin(300.0).into();
        assert!((c.0 - 26.85).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_arithmetic() {
        let lift = Kelvin(318.0) - Kelvin(225.0);
        assert_eq!(lift.value(), 93.0);
        assert_eq!((Celsius(-10.0) - Celsius(4.0)).value(), -14.0);
    }

    #[test]
    fn test_serialization() {
        let t = Celsius(-18.5);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "-18.5");
        let roundtrip: Celsius = serde_json::from_str(&json).unwrap();
        assert_eq!(t, roundtrip);
    }
}
