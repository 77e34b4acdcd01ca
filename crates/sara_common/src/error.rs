//! Error types for Sara.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaraError {
    #[error("Ollama error: {0}")]
    Ollama(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Context store error: {0}")]
    Context(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
