//! Reconciliation engine error types

use thiserror::Error;

/// Reconciliation engine errors
///
/// Every variant is fatal to the invocation that raised it. The engine
/// never retries and never returns partial-success results; re-run policy
/// belongs to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Transport or API failure while enumerating or reading remote
    /// objects. Raised before any mutating call.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// A strict name-to-ID resolution found zero matches for a non-empty
    /// request.
    #[error("Invalid or non-existent {param}: {values:?}")]
    InvalidReference { param: String, values: Vec<String> },

    /// Desired state attempts to change fields marked immutable on an
    /// existing object. No partial update is applied.
    #[error("Cannot update immutable fields: {fields:?}")]
    ImmutableFieldViolation { fields: Vec<String> },

    /// Failure during create/update/delete. Remote state is left exactly
    /// as the failed call left it.
    #[error("API error: {0}")]
    Adapter(String),

    /// Missing or incompatible backend version, malformed endpoint or
    /// desired state. Raised before any lookup.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Reclassify adapter-level failures raised during enumeration or
    /// read as lookup failures. Other variants pass through unchanged.
    pub(crate) fn into_lookup(self) -> Self {
        match self {
            EngineError::Adapter(msg) => EngineError::Lookup(msg),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
