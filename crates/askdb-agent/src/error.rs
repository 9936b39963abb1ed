//! Error types for askdb-agent

use thiserror::Error;

/// Result type alias using askdb-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while answering a question
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the model client layer
    #[error(transparent)]
    Ai(#[from] askdb_ai::Error),

    /// The loop hit its turn limit without a final answer
    #[error("No final answer after {0} turns")]
    TurnLimit(u32),

    /// The model returned neither text nor tool calls
    #[error("Model returned an empty response")]
    EmptyResponse,
}
