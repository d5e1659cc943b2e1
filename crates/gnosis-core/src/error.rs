//! Error types for generation requests and quiz sessions.
//!
//! Generation errors are defined here rather than in `gnosis-client` so the
//! parser and front end can classify failures without string matching.

use thiserror::Error;

use crate::model::QuestionKey;

/// Errors that can occur when asking the generation API for a quiz or notes.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request was rejected locally before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The API replied successfully but reported an error in the body.
    #[error("generation rejected: {0}")]
    Rejected(String),

    /// The API returned a non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match any known result shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl GenerationError {
    /// The text shown to the user for this failure.
    ///
    /// API and rejection errors surface the server's message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Rejected(message) | GenerationError::Api { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// Errors raised by quiz session transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The question index does not exist in the current quiz.
    #[error("no such question: {0}")]
    UnknownQuestion(QuestionKey),

    /// The option index does not exist for the given question.
    #[error("question {key} has no option {option}")]
    UnknownOption { key: QuestionKey, option: usize },
}
