//! Manifest loading
//!
//! A manifest is a YAML file describing the orchestrator connection and
//! the desired state of managed resources:
//!
//! ```yaml
//! endpoint: https://kumo.acme.com
//! projects:
//!   - name: my-project
//!     teams: [dev, ops]
//!     regions: [eu-west-1]
//!   - name: scratch
//!     state: absent
//! ```
//!
//! The API key is deliberately env-only friendly: `api_key` may be set in
//! the file, but `KUMO_API_KEY`/`KUMO_ENDPOINT` fill in whatever the file
//! omits.

use anyhow::Context;
use kumo_client::{ApiConfig, ClientError};
use kumo_engine::{DesiredState, Presence};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default)]
    pub projects: Vec<ResourceEntry>,
}

/// One desired resource. Everything except `state` is a resource field.
#[derive(Debug, Deserialize)]
pub struct ResourceEntry {
    #[serde(default)]
    pub state: Presence,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ResourceEntry {
    pub fn desired(&self) -> DesiredState {
        DesiredState::from_values(self.state, self.fields.clone())
    }

    pub fn display_name(&self) -> &str {
        self.fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
    }
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Manifest = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// Connection config, with environment variables filling in missing
    /// manifest values.
    pub fn api_config(&self) -> Result<ApiConfig, ClientError> {
        match (&self.endpoint, &self.api_key) {
            (Some(endpoint), Some(api_key)) => ApiConfig::new(endpoint, api_key),
            (Some(endpoint), None) => {
                let api_key = std::env::var("KUMO_API_KEY")
                    .map_err(|_| ClientError::MissingEnvVar("KUMO_API_KEY".to_string()))?;
                ApiConfig::new(endpoint, api_key)
            }
            (None, _) => ApiConfig::from_env(),
        }
    }
}
