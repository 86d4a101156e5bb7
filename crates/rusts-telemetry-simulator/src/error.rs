//! Simulator error types
//!
//! Every variant except `Io` is a setup-time configuration error: it is
//! reported before any point or query is generated and aborts the run.

use rusts_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Unknown placeholder '{{{{{name}}}}}' in template: {template}")]
    UnknownPlaceholder { template: String, name: String },

    #[error("Malformed placeholder in template ({reason}): {template}")]
    MalformedPlaceholder { template: String, reason: String },

    #[error("No SQL templates configured")]
    NoTemplates,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;
