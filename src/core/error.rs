use thiserror::Error;

/// Errors raised while building inputs or emitting results.
///
/// The numeric kernels themselves never fail: non-finite input propagates
/// through IEEE-754 semantics as `NaN`/`Inf`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid drift scenario: {0}")]
    InvalidScenario(&'static str),

    #[error("invalid curve sweep: {0}")]
    InvalidSweep(&'static str),

    #[error("ragged matrix: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
