use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsuranceError>;

/// Every failure the loader, the dataset queries and the output sinks can report.
#[derive(Error, Debug)]
pub enum InsuranceError {
    #[error("column {column:?} has {found} values, expected {expected}")]
    Validation {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("missing column {0:?} in header")]
    MissingColumn(String),
    #[error("row {row}: expected {expected} fields, found {found}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: invalid {column} value {value:?}")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
    #[error("no clients in group {0:?}")]
    EmptyGroup(String),
    #[error("empty result: {0}")]
    EmptyResult(String),
    #[error("given age {threshold} is out of range (oldest client is {max_age}), try reducing age")]
    OutOfRange { threshold: i64, max_age: i64 },
    #[error("unsupported export format {path:?}")]
    UnsupportedExport { path: PathBuf },
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
