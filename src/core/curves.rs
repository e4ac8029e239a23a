//! Softmax curve family: one swept score against fixed competitors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::softmax::{Axis, Softmax};

/// Upper bound on the number of points a sweep may produce.
pub const MAX_POINTS: usize = 1 << 24;

/// Number of points `arange` would produce, or `None` when the range is
/// empty, `step` is not a positive finite number, or the count exceeds
/// [`MAX_POINTS`].
pub fn point_count(start: f64, stop: f64, step: f64) -> Option<usize> {
    if !(step > 0.0) || !step.is_finite() || !(stop > start) {
        return None;
    }
    let n = ((stop - start) / step).ceil();
    if !n.is_finite() || n > MAX_POINTS as f64 {
        return None;
    }
    Some(n as usize)
}

/// Evenly spaced values in `[start, stop)` (numpy `arange`).
///
/// Produces `ceil((stop - start) / step)` points `start + i * step`; empty
/// when [`point_count`] rejects the range.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    match point_count(start, stop, step) {
        Some(n) => (0..n).map(|i| start + i as f64 * step).collect(),
        None => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CurveSweep {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    /// Scores held constant across the sweep, one extra class each.
    pub constants: Vec<f64>,
}

impl Default for CurveSweep {
    /// `x` in `[-2, 6)` by `0.1`, against constant scores `1.0` and `0.2`.
    fn default() -> Self {
        Self {
            start: -2.0,
            stop: 6.0,
            step: 0.1,
            constants: vec![1.0, 0.2],
        }
    }
}

impl CurveSweep {
    pub fn with_range(mut self, start: f64, stop: f64, step: f64) -> Self {
        self.start = start;
        self.stop = stop;
        self.step = step;
        self
    }

    pub fn with_constants(mut self, constants: Vec<f64>) -> Self {
        self.constants = constants;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.stop.is_finite() {
            return Err(Error::InvalidSweep("bounds must be finite"));
        }
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(Error::InvalidSweep("step must be positive and finite"));
        }
        if self.stop <= self.start {
            return Err(Error::InvalidSweep("stop must be greater than start"));
        }
        if point_count(self.start, self.stop, self.step).is_none() {
            return Err(Error::InvalidSweep("too many points"));
        }
        Ok(())
    }

    pub fn xs(&self) -> Vec<f64> {
        arange(self.start, self.stop, self.step)
    }

    /// Stack the swept row over one constant row per competitor.
    pub fn inputs(&self) -> Result<Matrix> {
        self.validate()?;
        let xs = self.xs();
        let mut rows = Vec::with_capacity(1 + self.constants.len());
        rows.push(xs.clone());
        for &c in &self.constants {
            rows.push(vec![c; xs.len()]);
        }
        Matrix::from_rows(rows)
    }

    /// Softmax down each column of [`CurveSweep::inputs`].
    pub fn evaluate(&self, softmax: &Softmax) -> Result<SoftmaxCurves> {
        let inputs = self.inputs()?;
        let probabilities = softmax.apply_matrix(&inputs, Axis::Rows);

        let mut labels = Vec::with_capacity(inputs.rows());
        labels.push("x".to_string());
        labels.extend(self.constants.iter().map(|c| format!("{c:.1}")));

        tracing::debug!(
            points = inputs.cols(),
            classes = inputs.rows(),
            mode = ?softmax.mode,
            "softmax curves evaluated"
        );

        Ok(SoftmaxCurves {
            xs: inputs.row(0).to_vec(),
            labels,
            probabilities,
        })
    }
}

/// Swept x-values and one probability row per class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoftmaxCurves {
    pub xs: Vec<f64>,
    pub labels: Vec<String>,
    pub probabilities: Matrix,
}

impl SoftmaxCurves {
    pub fn class_count(&self) -> usize {
        self.probabilities.rows()
    }

    pub fn series(&self, class: usize) -> &[f64] {
        self.probabilities.row(class)
    }

    /// Index of the first x where the swept class overtakes every competitor.
    pub fn crossover(&self) -> Option<usize> {
        (0..self.probabilities.cols()).find(|&c| {
            let swept = self.probabilities.row(0)[c];
            (1..self.class_count()).all(|r| swept > self.probabilities.row(r)[c])
        })
    }
}
