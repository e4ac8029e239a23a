//! Softmax: `exp(x_i) / sum_j exp(x_j)`.
//!
//! The default [`SoftmaxMode::Naive`] evaluates the raw exponentials with no
//! max-subtraction, so inputs above roughly `709.78` overflow to `Inf` and the
//! affected outputs become `NaN`. [`SoftmaxMode::Shifted`] subtracts the
//! maximum first and is only used when asked for.
//!
//! Execution tiers:
//! - `Scalar`: plain loops
//! - `Simd`: normalization divides four lanes at a time (requires `simd`)
//! - `Parallel`: independent matrix lanes on rayon (requires `parallel`)
//!
//! Every tier sums exponentials sequentially, so all tiers agree bit for bit.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "simd")]
use wide::f64x4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::matrix::Matrix;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SoftmaxMode {
    /// Raw exponentials. Overflows for large inputs.
    #[default]
    Naive,
    /// Subtract the maximum before exponentiating.
    Shifted,
}

/// Reduction axis for matrix softmax, numbered as in numpy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// Axis 0: normalize down each column.
    #[default]
    Rows,
    /// Axis 1: normalize across each row.
    Columns,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::Rows => 0,
            Axis::Columns => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionTier {
    #[default]
    Scalar,
    Simd,
    Parallel,
}

impl ExecutionTier {
    /// The tier that will actually run given the compiled features.
    pub fn effective(self) -> ExecutionTier {
        match self {
            ExecutionTier::Scalar => ExecutionTier::Scalar,
            ExecutionTier::Simd => {
                #[cfg(feature = "simd")]
                {
                    ExecutionTier::Simd
                }
                #[cfg(not(feature = "simd"))]
                {
                    ExecutionTier::Scalar
                }
            }
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Scalar
                }
            }
        }
    }

    /// Best tier compiled into this build.
    pub fn auto() -> ExecutionTier {
        #[cfg(feature = "parallel")]
        {
            ExecutionTier::Parallel
        }

        #[cfg(all(not(feature = "parallel"), feature = "simd"))]
        {
            ExecutionTier::Simd
        }

        #[cfg(all(not(feature = "parallel"), not(feature = "simd")))]
        {
            ExecutionTier::Scalar
        }
    }
}

/// Softmax settings: numeric mode plus execution tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Softmax {
    pub mode: SoftmaxMode,
    pub tier: ExecutionTier,
}

impl Softmax {
    pub fn new(mode: SoftmaxMode) -> Self {
        Self {
            mode,
            tier: ExecutionTier::default(),
        }
    }

    pub fn with_mode(mut self, mode: SoftmaxMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tier(mut self, tier: ExecutionTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let mut out = x.to_vec();
        self.apply_in_place(&mut out);
        out
    }

    pub fn apply_in_place(&self, xs: &mut [f64]) {
        let simd = self.tier.effective() == ExecutionTier::Simd;
        softmax_lane(xs, self.mode, simd);
    }

    /// Softmax of every lane along `axis`. Output has the input's shape.
    pub fn apply_matrix(&self, m: &Matrix, axis: Axis) -> Matrix {
        let tier = self.tier.effective();
        tracing::trace!(rows = m.rows(), cols = m.cols(), ?axis, ?tier, "matrix softmax");

        match axis {
            Axis::Rows => self.softmax_columns(m, tier),
            Axis::Columns => self.softmax_rows(m, tier),
        }
    }

    fn softmax_columns(&self, m: &Matrix, tier: ExecutionTier) -> Matrix {
        let mode = self.mode;
        let simd = tier == ExecutionTier::Simd;

        #[cfg(feature = "parallel")]
        {
            if tier == ExecutionTier::Parallel {
                let columns: Vec<Vec<f64>> = (0..m.cols())
                    .into_par_iter()
                    .map(|c| {
                        let mut col = m.column(c);
                        softmax_lane(&mut col, mode, false);
                        col
                    })
                    .collect();
                let mut out = Matrix::new(m.rows(), m.cols());
                for (c, col) in columns.iter().enumerate() {
                    out.set_column(c, col);
                }
                return out;
            }
        }

        let mut out = Matrix::new(m.rows(), m.cols());
        for c in 0..m.cols() {
            let mut col = m.column(c);
            softmax_lane(&mut col, mode, simd);
            out.set_column(c, &col);
        }
        out
    }

    fn softmax_rows(&self, m: &Matrix, tier: ExecutionTier) -> Matrix {
        let mode = self.mode;
        let simd = tier == ExecutionTier::Simd;
        let cols = m.cols();
        let mut out = m.clone();
        if cols == 0 {
            return out;
        }

        #[cfg(feature = "parallel")]
        {
            if tier == ExecutionTier::Parallel {
                out.as_mut_slice()
                    .par_chunks_mut(cols)
                    .for_each(|row| softmax_lane(row, mode, false));
                return out;
            }
        }

        for row in out.as_mut_slice().chunks_mut(cols) {
            softmax_lane(row, mode, simd);
        }
        out
    }
}

/// Naive softmax of a vector.
pub fn softmax(x: &[f64]) -> Vec<f64> {
    Softmax::default().apply(x)
}

pub fn softmax_with(x: &[f64], mode: SoftmaxMode) -> Vec<f64> {
    Softmax::new(mode).apply(x)
}

pub fn softmax_in_place(xs: &mut [f64], mode: SoftmaxMode) {
    Softmax::new(mode).apply_in_place(xs)
}

/// Matrix softmax along `axis` on the scalar tier.
pub fn softmax_matrix(m: &Matrix, axis: Axis, mode: SoftmaxMode) -> Matrix {
    Softmax::new(mode).apply_matrix(m, axis)
}

fn softmax_lane(xs: &mut [f64], mode: SoftmaxMode, simd: bool) {
    if xs.is_empty() {
        return;
    }

    if mode == SoftmaxMode::Shifted {
        let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for x in xs.iter_mut() {
            *x -= max;
        }
    }

    let mut sum = 0.0;
    for x in xs.iter_mut() {
        *x = x.exp();
        sum += *x;
    }

    if simd {
        normalize_simd(xs, sum);
    } else {
        normalize_scalar(xs, sum);
    }
}

#[inline]
fn normalize_scalar(xs: &mut [f64], sum: f64) {
    for x in xs.iter_mut() {
        *x /= sum;
    }
}

#[cfg(feature = "simd")]
fn normalize_simd(xs: &mut [f64], sum: f64) {
    let n = xs.len();
    let denom = f64x4::splat(sum);

    // Process 4 lanes at a time.
    let simd_end = n - (n % 4);
    for i in (0..simd_end).step_by(4) {
        let v = f64x4::from([xs[i], xs[i + 1], xs[i + 2], xs[i + 3]]);
        let out = (v / denom).to_array();
        xs[i..(i + 4)].copy_from_slice(&out);
    }

    normalize_scalar(&mut xs[simd_end..], sum);
}

#[cfg(not(feature = "simd"))]
#[inline]
fn normalize_simd(xs: &mut [f64], sum: f64) {
    normalize_scalar(xs, sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() < tol, "index {i}: {x} vs {y}");
        }
    }

    #[test]
    fn literal_scores() {
        let p = softmax(&[3.0, 1.0, 0.2]);
        assert_close(&p, &[0.8360188, 0.1131428, 0.0508384], 1e-6);
    }

    #[test]
    fn sums_to_one() {
        let p = softmax(&[-4.0, 0.5, 2.25, 7.0, -0.125]);
        let s: f64 = p.iter().sum();
        assert!((s - 1.0).abs() < 1e-9, "sum={s}");
    }

    #[test]
    fn single_element_is_certain() {
        assert_eq!(softmax(&[123.0]), vec![1.0]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn naive_overflows_on_large_input() {
        let p = softmax(&[1000.0, 0.0]);
        assert!(p[0].is_nan());
        assert_eq!(p[1], 0.0);
    }

    #[test]
    fn shifted_survives_large_input() {
        let p = softmax_with(&[1000.0, 0.0], SoftmaxMode::Shifted);
        assert_close(&p, &[1.0, 0.0], 1e-12);
    }

    #[test]
    fn shifted_matches_naive_for_small_input() {
        let x = [3.0, 1.0, 0.2, -1.5];
        assert_close(
            &softmax(&x),
            &softmax_with(&x, SoftmaxMode::Shifted),
            1e-12,
        );
    }

    #[test]
    fn columns_match_per_column_vectors() {
        let m = Matrix::vstack(&[&[1.0, -2.0, 0.5], &[1.0, 1.0, 1.0], &[0.2, 0.2, 0.2]]).unwrap();
        let out = softmax_matrix(&m, Axis::Rows, SoftmaxMode::Naive);
        assert_eq!(out.shape(), m.shape());
        for c in 0..m.cols() {
            assert_eq!(out.column(c), softmax(&m.column(c)));
        }
    }

    #[test]
    fn axis_columns_normalizes_each_row() {
        let m = Matrix::vstack(&[&[3.0, 1.0, 0.2], &[0.0, 0.0, 0.0]]).unwrap();
        let out = softmax_matrix(&m, Axis::Columns, SoftmaxMode::Naive);
        assert_eq!(out.row(0), softmax(&[3.0, 1.0, 0.2]).as_slice());
        assert_close(out.row(1), &[1.0 / 3.0; 3], 1e-15);
    }

    // Without `simd`/`parallel` the other tiers fall back to scalar; see
    // `accelerated_tiers_agree_with_scalar` for the feature-gated check.
    #[test]
    fn every_tier_agrees_with_scalar() {
        let row: Vec<f64> = (0..37).map(|i| i as f64 * 0.1 - 1.0).collect();
        let ones = vec![1.0; 37];
        let small = vec![0.2; 37];
        let m = Matrix::vstack(&[row.as_slice(), ones.as_slice(), small.as_slice()]).unwrap();
        let scalar = Softmax::default().apply_matrix(&m, Axis::Rows);
        for tier in [ExecutionTier::Simd, ExecutionTier::Parallel, ExecutionTier::auto()] {
            let out = Softmax::default().with_tier(tier).apply_matrix(&m, Axis::Rows);
            assert_eq!(out, scalar, "tier {tier:?}");
            let rows = Softmax::default().with_tier(tier).apply_matrix(&m, Axis::Columns);
            assert_eq!(rows, Softmax::default().apply_matrix(&m, Axis::Columns));
        }
    }

    #[cfg(all(feature = "simd", feature = "parallel"))]
    #[test]
    fn accelerated_tiers_agree_with_scalar() {
        assert_eq!(ExecutionTier::Simd.effective(), ExecutionTier::Simd);
        assert_eq!(ExecutionTier::Parallel.effective(), ExecutionTier::Parallel);
        assert_eq!(ExecutionTier::auto(), ExecutionTier::Parallel);

        // 3 x 41 keeps a SIMD remainder lane on the row axis.
        let row: Vec<f64> = (0..41).map(|i| (i as f64 * 0.37).sin() * 4.0).collect();
        let ones = vec![1.0; 41];
        let small = vec![0.2; 41];
        let m = Matrix::vstack(&[row.as_slice(), ones.as_slice(), small.as_slice()]).unwrap();

        for mode in [SoftmaxMode::Naive, SoftmaxMode::Shifted] {
            let scalar = Softmax::new(mode);
            for tier in [ExecutionTier::Simd, ExecutionTier::Parallel] {
                let fast = Softmax::new(mode).with_tier(tier);
                for axis in [Axis::Rows, Axis::Columns] {
                    assert_eq!(
                        fast.apply_matrix(&m, axis),
                        scalar.apply_matrix(&m, axis),
                        "{tier:?} {axis:?} {mode:?}"
                    );
                }
                assert_eq!(fast.apply(&row), scalar.apply(&row));
            }
        }
    }

    #[test]
    fn simd_tier_handles_remainder_lanes() {
        let x: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let simd = Softmax::default().with_tier(ExecutionTier::Simd).apply(&x);
        assert_eq!(simd, softmax(&x));
    }

    #[test]
    fn axis_numbering_follows_numpy() {
        assert_eq!(Axis::Rows.index(), 0);
        assert_eq!(Axis::Columns.index(), 1);
    }
}
