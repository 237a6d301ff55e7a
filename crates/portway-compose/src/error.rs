//! Error types for compose loading

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposeError>;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to read compose file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Compose document {0} is not a mapping")]
    NotAMapping(String),

    #[error("No services defined in the compose document")]
    NoServices,

    #[error("Invalid value for services.{service}.{field}: {reason}")]
    InvalidField {
        service: String,
        field: String,
        reason: String,
    },

    #[error("Required variable {variable} is missing a value: {message}")]
    Interpolation { variable: String, message: String },

    #[error("Invalid interpolation syntax in '{0}'")]
    InterpolationSyntax(String),

    #[error("No compose sources given")]
    NoSources,
}

impl ComposeError {
    pub(crate) fn invalid(service: &str, field: &str, reason: impl Into<String>) -> Self {
        ComposeError::InvalidField {
            service: service.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
