//! # floatlab
//!
//! Two small numerical demonstrations in IEEE-754 double precision:
//! accumulation drift and the softmax transform.
//!
//! ## Quick Start
//!
//! ```
//! use floatlab::prelude::*;
//!
//! // Adding 1e-6 to 1e9 a million times does not add 1.
//! let diff = drift(1e9, 1e-6, 1_000_000);
//! assert!((diff - 1.0).abs() > 0.01);
//!
//! // Softmax of the classic scores.
//! let p = softmax(&[3.0, 1.0, 0.2]);
//! assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//!
//! // A family of curves: one swept score against two constants.
//! let curves = CurveSweep::default().evaluate(&Softmax::default()).unwrap();
//! assert_eq!(curves.probabilities.shape(), (3, 80));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialize reports and configs
//! - `parallel`: Evaluate matrix lanes on rayon
//! - `simd`: Vectorize softmax normalization via the `wide` crate
//!
//! ## Modules
//!
//! - [`accumulate`]: Sequential accumulation and drift
//! - [`softmax`]: Vector and matrix softmax
//! - [`curves`]: Softmax curve sweeps
//! - [`chart`]: SVG rendering of curve families
//! - [`report`]: Result records

#[path = "core/error.rs"]
pub mod error;

#[path = "core/accumulate.rs"]
pub mod accumulate;

#[path = "core/matrix.rs"]
pub mod matrix;

#[path = "core/softmax.rs"]
pub mod softmax;

#[path = "core/curves.rs"]
pub mod curves;

#[path = "core/report.rs"]
pub mod report;

#[path = "core/chart.rs"]
pub mod chart;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use floatlab::prelude::*;
/// ```
pub mod prelude {
    pub use crate::accumulate::{accumulate, accumulate_compensated, drift, ulp, DriftScenario};
    pub use crate::chart::LineChart;
    pub use crate::curves::{arange, CurveSweep, SoftmaxCurves};
    pub use crate::matrix::Matrix;
    pub use crate::report::{CurvesReport, DriftReport, SoftmaxReport};
    pub use crate::softmax::{
        softmax, softmax_in_place, softmax_matrix, softmax_with, Axis, ExecutionTier, Softmax,
        SoftmaxMode,
    };
}
