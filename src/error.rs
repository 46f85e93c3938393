//! Error types for Synheart Screen

use thiserror::Error;

/// Errors that can occur while administering or scoring a screening
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Response out of range: question {index} = {value} (expected question 1-10, value 0-3)")]
    OutOfRange { index: u8, value: u8 },

    #[error("Incomplete responses: {} question(s) unanswered {missing:?}", .missing.len())]
    IncompleteResponses { missing: Vec<u8> },

    #[error("Session already finalized")]
    SessionFinalized,

    #[error("Invalid question index: {0} (expected 1-10)")]
    InvalidIndex(u8),

    #[error("Invalid question catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid screening result: {0}")]
    InvalidResult(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
