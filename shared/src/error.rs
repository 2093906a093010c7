//! Error types for the finance chart pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a finance request.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request body
    #[error("Validation error: {0}")]
    Validation(String),

    /// The LLM provider rejected our credentials
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    /// The LLM provider reported a failure with a status code
    #[error("Upstream API error ({status}): {message}")]
    UpstreamApi { status: u16, message: String },

    /// LLM output did not have the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// A market-data call failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The chart tool payload is malformed
    #[error("Invalid chart data structure: {0}")]
    ChartValidation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::UpstreamAuth(_) => 401,
            Error::UpstreamApi { status, .. } => *status,
            Error::ChartValidation(_) => 422,
            _ => 500,
        }
    }
}
