mod experiments;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use floatlab::report::{to_json, CurvesReport, DriftReport, SoftmaxReport};
use floatlab::softmax::SoftmaxMode;

const DEFAULT_CHART_PATH: &str = "softmax_curves.svg";

/// Floating-point accumulation drift and softmax demonstrations
#[derive(Parser, Debug)]
#[command(name = "floatlab", version, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add 1e-6 a million times to 1e9 and to 1, printing the drift
    Drift,
    /// Softmax of the scores [3.0, 1.0, 0.2]
    Softmax {
        /// Subtract the maximum score before exponentiating
        #[arg(long, default_value_t = false)]
        shifted: bool,
    },
    /// Softmax curves for a swept score against constants 1.0 and 0.2
    Curves(CurvesArgs),
    /// Run every demonstration (the default)
    All(CurvesArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct CurvesArgs {
    /// Subtract the maximum score before exponentiating
    #[arg(long, default_value_t = false)]
    shifted: bool,

    /// Where to write the SVG chart
    #[arg(long, default_value = DEFAULT_CHART_PATH)]
    out: PathBuf,

    /// Open the chart in the system viewer once written
    #[arg(long, default_value_t = false)]
    open: bool,
}

impl Default for CurvesArgs {
    fn default() -> Self {
        Self {
            shifted: false,
            out: PathBuf::from(DEFAULT_CHART_PATH),
            open: false,
        }
    }
}

impl CurvesArgs {
    fn mode(&self) -> SoftmaxMode {
        mode_for(self.shifted)
    }
}

fn mode_for(shifted: bool) -> SoftmaxMode {
    if shifted {
        SoftmaxMode::Shifted
    } else {
        SoftmaxMode::Naive
    }
}

#[derive(Serialize)]
struct AllReports<'a> {
    drift: &'a [DriftReport],
    softmax: &'a SoftmaxReport,
    curves: &'a CurvesReport,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let code = exit_code(run(args));
    if code != 0 {
        process::exit(code);
    }
}

/// Log a failed run once, through tracing, and map it to a process status.
fn exit_code(result: floatlab::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

fn init_tracing(verbose: bool) {
    // Logs go to stderr; stdout carries only results.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> floatlab::Result<()> {
    let json = args.json;
    match args.command.unwrap_or_else(|| Command::All(CurvesArgs::default())) {
        Command::Drift => {
            let reports = experiments::drift::run()?;
            if json {
                println!("{}", to_json(&reports)?);
            } else {
                experiments::drift::print(&reports);
            }
        }
        Command::Softmax { shifted } => {
            let report = experiments::softmax::scores(mode_for(shifted));
            if json {
                println!("{}", to_json(&report)?);
            } else {
                println!("{report}");
            }
        }
        Command::Curves(c) => {
            let report = experiments::softmax::curves(c.mode(), &c.out, c.open)?;
            if json {
                println!("{}", to_json(&report)?);
            } else {
                println!("{report}");
            }
        }
        Command::All(c) => {
            let drift = experiments::drift::run()?;
            let softmax = experiments::softmax::scores(c.mode());
            let curves = experiments::softmax::curves(c.mode(), &c.out, c.open)?;
            if json {
                let all = AllReports {
                    drift: &drift,
                    softmax: &softmax,
                    curves: &curves,
                };
                println!("{}", to_json(&all)?);
            } else {
                println!("== accumulation drift ==");
                experiments::drift::print(&drift);
                println!();
                println!("== softmax ==");
                println!("{softmax}");
                println!();
                println!("{curves}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses() {
        let args = Args::try_parse_from(["floatlab"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.json);
    }

    #[test]
    fn curves_flags_parse() {
        let args = Args::try_parse_from([
            "floatlab", "curves", "--shifted", "--out", "x.svg", "--json",
        ])
        .unwrap();
        match args.command {
            Some(Command::Curves(c)) => {
                assert_eq!(c.mode(), SoftmaxMode::Shifted);
                assert_eq!(c.out, PathBuf::from("x.svg"));
                assert!(!c.open);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(args.json);
    }

    #[test]
    fn softmax_defaults_to_naive() {
        let args = Args::try_parse_from(["floatlab", "softmax"]).unwrap();
        assert!(matches!(args.command, Some(Command::Softmax { shifted: false })));
    }

    #[test]
    fn failed_run_maps_to_nonzero_status() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("c.svg");
        let args =
            Args::try_parse_from(["floatlab", "curves", "--out", out.to_str().unwrap()]).unwrap();
        let result = run(args);
        assert!(matches!(result, Err(floatlab::Error::Io(_))));
        assert_eq!(exit_code(result), 1);
        assert_eq!(exit_code(Ok(())), 0);
    }

    #[test]
    fn curves_default_path() {
        let args = Args::try_parse_from(["floatlab", "curves"]).unwrap();
        match args.command {
            Some(Command::Curves(c)) => assert_eq!(c.out, PathBuf::from(DEFAULT_CHART_PATH)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
