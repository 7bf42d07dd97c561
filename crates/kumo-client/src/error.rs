//! Kumo API client error types

use kumo_engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Incompatible backend version: {0}")]
    IncompatibleVersion(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl ClientError {
    /// Map into the engine taxonomy for adapter trait methods.
    ///
    /// Configuration-shaped failures stay configuration errors; everything
    /// else surfaces as an adapter failure with the message passed through
    /// verbatim.
    pub fn into_engine(self) -> EngineError {
        match self {
            ClientError::Engine(e) => e,
            ClientError::MissingEnvVar(_)
            | ClientError::InvalidEndpoint(_)
            | ClientError::IncompatibleVersion(_) => {
                EngineError::Configuration(self.to_string())
            }
            other => EngineError::Adapter(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
