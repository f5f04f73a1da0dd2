//! Trigger boundary errors

use thiserror::Error;

/// Failure starting a research workflow
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The request never produced an HTTP response
    #[error("trigger request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The bearer token was rejected
    #[error("authentication rejected: {0}")]
    Unauthorized(String),

    /// The backend refused to start the workflow
    #[error("workflow not started ({status}): {message}")]
    Rejected {
        /// HTTP status code of the refusal
        status: u16,
        /// Message extracted from the error body
        message: String,
    },
}
