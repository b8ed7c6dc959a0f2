use thiserror::Error;

/// Per-bar validation failures. The calculator state is left untouched when
/// one of these is returned, so callers may skip the bar and continue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidBarError {
    #[error("bar {index} at {timestamp}: high {high} is below low {low}")]
    HighBelowLow {
        index: usize,
        timestamp: u64,
        high: f64,
        low: f64,
    },

    #[error("bar {index}: timestamp {timestamp} does not advance past previous {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        timestamp: u64,
        previous: u64,
    },

    #[error("bar {index} at {timestamp}: {field} is not a finite number")]
    NonFinite {
        index: usize,
        timestamp: u64,
        field: &'static str,
    },
}

impl InvalidBarError {
    pub fn index(&self) -> usize {
        match self {
            InvalidBarError::HighBelowLow { index, .. }
            | InvalidBarError::NonMonotonicTimestamp { index, .. }
            | InvalidBarError::NonFinite { index, .. } => *index,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidBar(#[from] InvalidBarError),

    #[error("Invalid window length: {0}. Length must be at least 1")]
    InvalidLength(usize),

    #[error("Input has no `{0}` column")]
    MissingColumn(&'static str),

    #[error("Line {line}: missing value for `{field}`")]
    MissingField { line: u64, field: &'static str },

    #[error("Line {line}: cannot parse `{field}` from {value:?}")]
    ParseField {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
