//! Fact collector error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactsError {
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Unparseable output: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FactsError>;
