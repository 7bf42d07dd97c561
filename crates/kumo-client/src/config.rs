//! Kumo API connection configuration

use crate::error::{ClientError, Result};

const ENDPOINT_VAR: &str = "KUMO_ENDPOINT";
const API_KEY_VAR: &str = "KUMO_API_KEY";

/// Connection settings for the Kumo orchestrator API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the orchestrator, without the `/api/v1` suffix.
    pub endpoint: String,

    /// Bearer credential sent with every request.
    pub api_key: String,
}

impl ApiConfig {
    /// Build a config, normalizing the endpoint (trailing slash stripped)
    /// and rejecting malformed input before any lookup happens.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ClientError::InvalidEndpoint(endpoint));
        }
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ClientError::MissingEnvVar(API_KEY_VAR.to_string()));
        }
        Ok(Self { endpoint, api_key })
    }

    /// Create ApiConfig from `KUMO_ENDPOINT` and `KUMO_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(ENDPOINT_VAR)
            .map_err(|_| ClientError::MissingEnvVar(ENDPOINT_VAR.to_string()))?;
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| ClientError::MissingEnvVar(API_KEY_VAR.to_string()))?;
        Self::new(endpoint, api_key)
    }

    /// Versioned API root.
    pub fn base_url(&self) -> String {
        format!("{}/api/v1", self.endpoint)
    }
}
