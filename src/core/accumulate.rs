//! Floating-point accumulation drift.
//!
//! Repeatedly adding a tiny increment to a much larger accumulator loses
//! precision: every addition rounds to the nearest representable `f64`, and
//! when the increment is far below the accumulator's spacing that rounding
//! swamps it. Adding the same increment to a comparably sized accumulator
//! keeps the error near the noise floor.
//!
//! The summation here is strictly sequential. Pairwise, parallel or
//! vectorized summation would change the measured drift.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::report::DriftReport;

/// Add `increment` to `initial` exactly `iterations` times, left to right.
pub fn accumulate(initial: f64, increment: f64, iterations: u64) -> f64 {
    let mut acc = initial;
    for _ in 0..iterations {
        acc += increment;
    }
    acc
}

/// Final accumulator value minus the starting value.
///
/// Mathematically this is `increment * iterations`; in floating point it
/// generally is not.
pub fn drift(initial: f64, increment: f64, iterations: u64) -> f64 {
    accumulate(initial, increment, iterations) - initial
}

/// Kahan-compensated version of [`accumulate`].
///
/// Still a single sequential pass; the running compensation term recovers the
/// low-order bits lost at each step. Used only as a point of comparison.
pub fn accumulate_compensated(initial: f64, increment: f64, iterations: u64) -> f64 {
    let mut sum = initial;
    let mut carry = 0.0f64;
    for _ in 0..iterations {
        let y = increment - carry;
        let t = sum + y;
        carry = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Spacing between `|x|` and the next larger representable `f64`.
///
/// Returns `NaN` for non-finite input.
pub fn ulp(x: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    let a = x.abs();
    f64::from_bits(a.to_bits() + 1) - a
}

/// One drift experiment: start value, increment and repeat count.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriftScenario {
    pub initial: f64,
    pub increment: f64,
    pub iterations: u64,
}

impl Default for DriftScenario {
    fn default() -> Self {
        Self::large_accumulator()
    }
}

impl DriftScenario {
    pub const fn new(initial: f64, increment: f64, iterations: u64) -> Self {
        Self {
            initial,
            increment,
            iterations,
        }
    }

    /// `10^9 + 10^-6` repeated `10^6` times. Drifts to ~0.9537.
    pub const fn large_accumulator() -> Self {
        Self::new(1e9, 1e-6, 1_000_000)
    }

    /// `1 + 10^-6` repeated `10^6` times. Drifts by ~1e-10.
    pub const fn unit_accumulator() -> Self {
        Self::new(1.0, 1e-6, 1_000_000)
    }

    /// Both demonstration scenarios, large accumulator first.
    pub fn presets() -> [Self; 2] {
        [Self::large_accumulator(), Self::unit_accumulator()]
    }

    pub fn with_initial(mut self, initial: f64) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// The exact value the drift would have in real arithmetic.
    pub fn expected(&self) -> f64 {
        self.increment * self.iterations as f64
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial.is_finite() {
            return Err(Error::InvalidScenario("initial must be finite"));
        }
        if !self.increment.is_finite() {
            return Err(Error::InvalidScenario("increment must be finite"));
        }
        Ok(())
    }

    /// Run the naive and compensated sums and collect the comparison.
    pub fn run(&self) -> DriftReport {
        let final_value = accumulate(self.initial, self.increment, self.iterations);
        let diff = final_value - self.initial;
        let compensated_diff =
            accumulate_compensated(self.initial, self.increment, self.iterations) - self.initial;

        let expected = self.expected();
        let abs_error = (diff - expected).abs();
        let rel_error = if expected != 0.0 {
            abs_error / expected.abs()
        } else {
            abs_error
        };

        tracing::debug!(
            initial = self.initial,
            increment = self.increment,
            iterations = self.iterations,
            diff,
            abs_error,
            "drift scenario evaluated"
        );

        DriftReport {
            scenario: *self,
            final_value,
            diff,
            expected,
            abs_error,
            rel_error,
            ulp_at_initial: ulp(self.initial),
            compensated_diff,
        }
    }
}
