//! Luminosity readings
//!
//! Each reading is drawn independently and uniformly from
//! [`MIN_LUX`]..=[`MAX_LUX`] and published as decimal text with exactly two
//! fractional digits.

use rand::Rng;
use std::fmt;

/// Lowest value the simulated sensor reports
pub const MIN_LUX: f64 = 0.0;
/// Highest value the simulated sensor reports
pub const MAX_LUX: f64 = 1000.0;

/// A single luminosity sample in lux.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Reading(f64);

impl Reading {
    /// Draw a new reading from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(MIN_LUX..=MAX_LUX))
    }

    /// Raw value in lux
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Message body: fixed two-decimal text, e.g. `512.34`.
    pub fn payload(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
