use std::path::Path;

use floatlab::chart::{self, LineChart};
use floatlab::curves::CurveSweep;
use floatlab::report::{CurvesReport, SoftmaxReport};
use floatlab::softmax::{ExecutionTier, Softmax, SoftmaxMode};

pub const SCORES: [f64; 3] = [3.0, 1.0, 0.2];

pub fn scores(mode: SoftmaxMode) -> SoftmaxReport {
    SoftmaxReport::compute(&SCORES, &Softmax::new(mode))
}

/// Sweep, render the chart to `out`, and optionally open it.
pub fn curves(mode: SoftmaxMode, out: &Path, open: bool) -> floatlab::Result<CurvesReport> {
    let sweep = CurveSweep::default();
    let softmax = Softmax::new(mode).with_tier(ExecutionTier::auto());
    let curves = sweep.evaluate(&softmax)?;

    let title = match mode {
        SoftmaxMode::Naive => "softmax([x, 1.0, 0.2])",
        SoftmaxMode::Shifted => "softmax([x, 1.0, 0.2]) (max-shifted)",
    };
    let svg = LineChart::default().with_title(title).render_curves(&curves);
    chart::write_svg(out, &svg)?;

    if open {
        // A missing viewer should not discard the written chart.
        if let Err(e) = chart::open_in_viewer(out) {
            tracing::warn!(path = %out.display(), "failed to open chart: {e}");
        }
    }

    Ok(CurvesReport {
        sweep,
        mode,
        curves,
        chart_path: Some(out.display().to_string()),
    })
}
