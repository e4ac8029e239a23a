//! Property tests for the softmax transform and the drift presets.

use floatlab::prelude::*;
use proptest::prelude::*;

fn scores() -> impl Strategy<Value = Vec<f64>> {
    // Well inside the naive overflow limit.
    prop::collection::vec(-50.0f64..50.0, 1..16)
}

proptest! {
    #[test]
    fn softmax_sums_to_one(x in scores()) {
        let s: f64 = softmax(&x).iter().sum();
        prop_assert!((s - 1.0).abs() < 1e-9, "sum={}", s);
    }

    #[test]
    fn softmax_is_strictly_positive(x in prop::collection::vec(-20.0f64..20.0, 1..16)) {
        prop_assert!(softmax(&x).iter().all(|&p| p > 0.0));
    }

    #[test]
    fn softmax_preserves_rank_order(x in scores()) {
        let p = softmax(&x);
        for i in 0..x.len() {
            for j in 0..x.len() {
                if x[i] > x[j] {
                    prop_assert!(p[i] >= p[j], "x[{}]={} x[{}]={}", i, x[i], j, x[j]);
                }
            }
        }
    }

    #[test]
    fn softmax_strictly_orders_separated_scores(x in scores()) {
        let p = softmax(&x);
        for i in 0..x.len() {
            for j in 0..x.len() {
                if x[i] - x[j] >= 1e-6 {
                    prop_assert!(p[i] > p[j], "x[{}]={} x[{}]={}", i, x[i], j, x[j]);
                }
            }
        }
    }

    #[test]
    fn shifted_agrees_with_naive_in_range(x in scores()) {
        let naive = softmax(&x);
        let shifted = softmax_with(&x, SoftmaxMode::Shifted);
        for (a, b) in naive.iter().zip(&shifted) {
            prop_assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn matrix_columns_match_vector_softmax(
        rows in 1usize..5,
        cols in 1usize..12,
        seed in prop::collection::vec(-10.0f64..10.0, 60),
    ) {
        let data: Vec<Vec<f64>> = (0..rows)
            .map(|r| (0..cols).map(|c| seed[(r * cols + c) % seed.len()]).collect())
            .collect();
        let m = Matrix::from_rows(data).unwrap();
        let out = softmax_matrix(&m, Axis::Rows, SoftmaxMode::Naive);
        prop_assert_eq!(out.shape(), m.shape());
        for c in 0..cols {
            prop_assert_eq!(out.column(c), softmax(&m.column(c)));
        }
    }

    #[test]
    fn ulp_brackets_next_value(x in 1e-300f64..1e300) {
        let spacing = ulp(x);
        prop_assert!(spacing > 0.0);
        prop_assert!(x + spacing > x);
        prop_assert_eq!(x + spacing / 4.0, x);
    }
}

#[test]
fn literal_scores_match_formula() {
    let p = softmax(&[3.0, 1.0, 0.2]);
    let expected = [0.8360188, 0.1131428, 0.0508384];
    for (a, b) in p.iter().zip(expected) {
        assert!((a - b).abs() < 1e-6, "{a} vs {b}");
    }
}

#[test]
fn large_accumulator_loses_precision() {
    let report = DriftScenario::large_accumulator().run();
    assert!((report.diff - 1.0).abs() > 0.01);
    assert!((report.diff - 0.9536743).abs() < 1e-7);
}

#[test]
fn comparable_magnitude_drifts_far_less() {
    let large = DriftScenario::large_accumulator().run();
    let unit = DriftScenario::unit_accumulator().run();
    assert!(unit.abs_error < 1e-9);
    assert!(unit.abs_error < large.abs_error / 1000.0);
}

#[test]
fn default_curves_are_three_by_eighty() {
    let curves = CurveSweep::default().evaluate(&Softmax::default()).unwrap();
    assert_eq!(curves.probabilities.shape(), (3, 80));
    assert_eq!(arange(-2.0, 6.0, 0.1).len(), 80);
}
