use floatlab::accumulate::DriftScenario;
use floatlab::report::DriftReport;

/// Evaluate both accumulation presets, large accumulator first.
pub fn run() -> floatlab::Result<Vec<DriftReport>> {
    DriftScenario::presets()
        .iter()
        .map(|s| -> floatlab::Result<DriftReport> {
            s.validate()?;
            Ok(s.run())
        })
        .collect()
}

pub fn print(reports: &[DriftReport]) {
    for (i, r) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{r}");
    }
}
