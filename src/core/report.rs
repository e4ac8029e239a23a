//! Result records for the demonstrations and their text rendering.

use core::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::accumulate::DriftScenario;
use crate::curves::{CurveSweep, SoftmaxCurves};
#[cfg(feature = "serde")]
use crate::error::Result;
use crate::softmax::{Softmax, SoftmaxMode};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DriftReport {
    pub scenario: DriftScenario,
    pub final_value: f64,
    /// `final_value - scenario.initial`.
    pub diff: f64,
    pub expected: f64,
    pub abs_error: f64,
    pub rel_error: f64,
    pub ulp_at_initial: f64,
    pub compensated_diff: f64,
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First line is the bare diff, as the demo has always printed it.
        writeln!(f, "{}", self.diff)?;
        writeln!(
            f,
            "  x0={:e} b={:e} n={} expected={} abs_err={:.3e} rel_err={:.3e}",
            self.scenario.initial,
            self.scenario.increment,
            self.scenario.iterations,
            self.expected,
            self.abs_error,
            self.rel_error,
        )?;
        write!(
            f,
            "  ulp(x0)={:.6e} compensated_diff={}",
            self.ulp_at_initial, self.compensated_diff
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SoftmaxReport {
    pub input: Vec<f64>,
    pub mode: SoftmaxMode,
    pub probabilities: Vec<f64>,
    pub sum: f64,
}

impl SoftmaxReport {
    pub fn compute(input: &[f64], softmax: &Softmax) -> Self {
        let probabilities = softmax.apply(input);
        let sum = probabilities.iter().sum();
        Self {
            input: input.to_vec(),
            mode: softmax.mode,
            probabilities,
            sum,
        }
    }
}

impl fmt::Display for SoftmaxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, p) in self.probabilities.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{p:.8}")?;
        }
        f.write_str("]")
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CurvesReport {
    pub sweep: CurveSweep,
    pub mode: SoftmaxMode,
    pub curves: SoftmaxCurves,
    pub chart_path: Option<String>,
}

impl fmt::Display for CurvesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "softmax curves: {} classes x {} points, x in [{}, {}) step {}",
            self.curves.class_count(),
            self.curves.xs.len(),
            self.sweep.start,
            self.sweep.stop,
            self.sweep.step,
        )?;
        match self.curves.crossover() {
            Some(i) => writeln!(f, "  swept class leads from x={:.1}", self.curves.xs[i])?,
            None => writeln!(f, "  swept class never leads")?,
        }
        // Every tenth sample keeps the table short.
        for i in (0..self.curves.xs.len()).step_by(10) {
            write!(f, "  x={:>5.1}", self.curves.xs[i])?;
            for (label, class) in self.curves.labels.iter().zip(0..self.curves.class_count()) {
                write!(f, "  p[{label}]={:.4}", self.curves.series(class)[i])?;
            }
            writeln!(f)?;
        }
        match &self.chart_path {
            Some(path) => write!(f, "  chart: {path}"),
            None => write!(f, "  chart: not written"),
        }
    }
}

#[cfg(feature = "serde")]
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
