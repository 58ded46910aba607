//! Newtypes for the handful of physical quantities the importers convert.
//!
//! Source tables mix GWh and MWh, percentages and fractions. Wrapping the
//! raw `f64` keeps each conversion in one place.
//!
//! ```
//! use gridstore_core::units::{GigawattHours, MegawattHours, Percent};
//!
//! let volume = GigawattHours(0.15);
//! assert_eq!(MegawattHours::from(volume), MegawattHours(150.0));
//!
//! let eff = Percent(81.0).split_roundtrip();
//! assert!((eff - 0.9).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }
    };
}

/// Energy in MWh, the unit storage capacities are written in.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegawattHours(pub f64);

impl_unit_ops!(MegawattHours, "MWh");

/// Energy in GWh, the unit storage tables report volumes in.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct GigawattHours(pub f64);

impl_unit_ops!(GigawattHours, "GWh");

impl From<GigawattHours> for MegawattHours {
    fn from(gwh: GigawattHours) -> Self {
        MegawattHours(gwh.0 * 1000.0)
    }
}

/// A percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(pub f64);

impl_unit_ops!(Percent, "%");

impl Percent {
    pub fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }

    /// Per-direction efficiency from a roundtrip percentage.
    ///
    /// The small offset keeps a zero roundtrip strictly positive; the result
    /// is capped at 1 to stay inside the storage efficiency constraint.
    pub fn split_roundtrip(self) -> f64 {
        (self.as_fraction() + 1e-5).sqrt().min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gwh_to_mwh() {
        assert_eq!(MegawattHours::from(GigawattHours(2.5)), MegawattHours(2500.0));
    }

    #[test]
    fn test_energy_sum() {
        let total: MegawattHours = [MegawattHours(100.0), GigawattHours(0.0505).into()]
            .into_iter()
            .sum();
        assert!((total.value() - 150.5).abs() < 1e-9);
    }

    #[test]
    fn test_split_roundtrip() {
        assert_eq!(Percent(100.0).split_roundtrip(), 1.0);

        let zero = Percent(0.0).split_roundtrip();
        assert!(zero > 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(MegawattHours(12.5).to_string(), "12.5000 MWh");
        assert_eq!(GigawattHours(0.25).to_string(), "0.2500 GWh");
    }
}
