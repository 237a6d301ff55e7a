//! Error types for the validation engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LintError>;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Check code {0} is already registered")]
    DuplicateCheck(String),

    #[error("Service '{0}' is not defined in the application graph")]
    UnknownService(String),

    #[error("Unknown severity '{0}' (expected ERROR, WARNING or INFO)")]
    UnknownSeverity(String),

    #[error("Unknown output format '{0}' (expected text or json)")]
    UnknownFormat(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
