//! Error taxonomy shared by every pipeline stage.

use thiserror::Error;

/// Failure of an `analyze` or `ask` invocation.
///
/// Nothing here is retried internally; callers decide whether to re-invoke.
#[derive(Debug, Error)]
pub enum BookmindError {
    /// Missing credential or unusable settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed caller input, rejected before any network I/O.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Non-success status or transport failure talking to the generator.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Generator output could not be turned into a usable document.
    #[error("invalid response format: {0}")]
    ResponseFormat(String),
}

impl From<reqwest::Error> for BookmindError {
    fn from(e: reqwest::Error) -> Self {
        BookmindError::Upstream(format!("request to generator failed: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, BookmindError>;
