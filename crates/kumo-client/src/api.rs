//! Kumo orchestrator API client
//!
//! Thin JSON-over-HTTP client for the orchestrator's REST surface. Auth
//! is a static API key sent as the `X-API-Key` header. Server error
//! messages pass through verbatim; the client adds no retry and no
//! backoff; re-run policy belongs to the caller.

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use kumo_engine::{ApiVersion, RemoteObject, ResourceKind};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Oldest backend version this client speaks to.
pub const MINIMUM_BACKEND_VERSION: ApiVersion = ApiVersion::new(0, 52, 5);

/// Newest backend version this client speaks to, if bounded.
pub const MAXIMUM_BACKEND_VERSION: Option<ApiVersion> = None;

const API_KEY_HEADER: &str = "X-API-Key";

/// Check a backend version against the client's supported range,
/// optionally narrowed by per-resource bounds.
pub fn ensure_compatibility(
    version: ApiVersion,
    min_version: Option<ApiVersion>,
    max_version: Option<ApiVersion>,
) -> Result<()> {
    let min = match min_version {
        Some(v) => v.max(MINIMUM_BACKEND_VERSION),
        None => MINIMUM_BACKEND_VERSION,
    };
    let max = match (max_version, MAXIMUM_BACKEND_VERSION) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    };

    if version < min {
        return Err(ClientError::IncompatibleVersion(format!(
            "backend version {} is smaller than minimum supported version {}",
            version, min
        )));
    }
    if let Some(max) = max {
        if version > max {
            return Err(ClientError::IncompatibleVersion(format!(
                "backend version {} is larger than maximum supported version {}",
                version, max
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    version: String,
}

/// JSON client for one orchestrator endpoint.
pub struct ApiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Fetch the backend version and verify it falls inside the supported
    /// range. Run once per invocation, before any lookup.
    pub async fn connect(&self) -> Result<ApiVersion> {
        let info: VersionInfo = self.get_json("/version").await?;
        let version: ApiVersion = info
            .version
            .parse()
            .map_err(|e: kumo_engine::EngineError| ClientError::ApiError(e.to_string()))?;
        ensure_compatibility(version, None, None)?;
        tracing::debug!(%version, endpoint = %self.config.endpoint, "connected to backend");
        Ok(version)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        Err(ClientError::ApiError(message))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Enumerate identifiers of all objects of a resource type.
    pub async fn list_ids(&self, kind: ResourceKind) -> Result<Vec<String>> {
        self.get_json(&format!("/{}s", kind)).await
    }

    /// Read one object by identifier.
    pub async fn read_object(&self, kind: ResourceKind, id: &str) -> Result<RemoteObject> {
        let value: Value = self.get_json(&format!("/{}/{}", kind, id)).await?;
        object_from_value(kind, value)
    }

    /// Create an object. `query` carries create-only extras (e.g. the
    /// requested subnet size for projects).
    pub async fn create_object(
        &self,
        kind: ResourceKind,
        payload: &Map<String, Value>,
        query: &[(String, String)],
    ) -> Result<RemoteObject> {
        let response = self
            .client
            .post(self.url(&format!("/{}", kind)))
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(query)
            .json(payload)
            .send()
            .await?;
        let value: Value = Self::check(response).await?.json().await?;
        object_from_value(kind, value)
    }

    /// Replace an object.
    pub async fn update_object(
        &self,
        kind: ResourceKind,
        id: &str,
        object: &RemoteObject,
    ) -> Result<RemoteObject> {
        let response = self
            .client
            .put(self.url(&format!("/{}/{}", kind, id)))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&object.to_map())
            .send()
            .await?;
        let value: Value = Self::check(response).await?.json().await?;
        object_from_value(kind, value)
    }

    /// Delete an object.
    pub async fn delete_object(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/{}/{}", kind, id)))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Split a server-side JSON object into id + attributes.
fn object_from_value(kind: ResourceKind, value: Value) -> Result<RemoteObject> {
    let Value::Object(mut map) = value else {
        return Err(ClientError::ApiError(format!(
            "expected a JSON object for {}, got {}",
            kind, value
        )));
    };
    let id = match map.remove("id") {
        Some(Value::String(id)) => id,
        _ => {
            return Err(ClientError::ApiError(format!(
                "{} object is missing a string id",
                kind
            )));
        }
    };
    Ok(RemoteObject {
        id,
        attributes: map,
    })
}
