use std::time::Duration;

use thiserror::Error;

/// Crate-wide error type.
///
/// Local pipeline stages are total functions over their inputs: every
/// numeric edge case (empty series, zero variance, constant range) has a
/// defined fallback, so the only errors a caller sees before a result are
/// configuration errors and remote-service failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("format error: {0}")]
    Format(String),

    /// The remote imputation collaborator answered with a failure.
    /// Deliberately distinct from local computation errors so the caller
    /// can retry or fall back to local imputation.
    #[error("imputation service error: {0}")]
    ImputationService(String),

    /// The remote imputation collaborator did not answer in time.
    #[error("imputation service timed out after {0:?}")]
    ImputationTimeout(Duration),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::Format(format!("date parse error: {}", err))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
