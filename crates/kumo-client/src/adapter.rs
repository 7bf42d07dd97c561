//! Engine adapters backed by the orchestrator API
//!
//! One [`ApiAdapter`] per resource kind satisfies the engine's
//! [`ResourceAdapter`] contract over the REST surface. Create-only extras
//! travel as query parameters on the create call (the orchestrator takes
//! e.g. a project's requested subnet size that way).

use crate::api::ApiClient;
use async_trait::async_trait;
use kumo_engine::{RemoteObject, ResourceAdapter, ResourceKind};
use serde_json::{Map, Value};
use std::sync::Arc;

/// REST-backed adapter for one resource kind.
pub struct ApiAdapter {
    client: Arc<ApiClient>,
    kind: ResourceKind,
}

impl ApiAdapter {
    pub fn new(client: Arc<ApiClient>, kind: ResourceKind) -> Self {
        Self { client, kind }
    }

    pub fn project(client: Arc<ApiClient>) -> Self {
        Self::new(client, ResourceKind::Project)
    }

    pub fn team(client: Arc<ApiClient>) -> Self {
        Self::new(client, ResourceKind::Team)
    }

    pub fn region(client: Arc<ApiClient>) -> Self {
        Self::new(client, ResourceKind::Region)
    }
}

/// Flatten create-only extras into query parameters.
///
/// Scalars serialize to their plain string form; anything structured
/// keeps its JSON encoding.
pub fn extras_to_query(extras: &Map<String, Value>) -> Vec<(String, String)> {
    extras
        .iter()
        .map(|(name, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), rendered)
        })
        .collect()
}

#[async_trait]
impl ResourceAdapter for ApiAdapter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn list(&self) -> kumo_engine::Result<Vec<String>> {
        self.client
            .list_ids(self.kind)
            .await
            .map_err(|e| e.into_engine())
    }

    async fn read(&self, id: &str) -> kumo_engine::Result<RemoteObject> {
        self.client
            .read_object(self.kind, id)
            .await
            .map_err(|e| e.into_engine())
    }

    async fn create(
        &self,
        payload: &Map<String, Value>,
        extras: &Map<String, Value>,
    ) -> kumo_engine::Result<RemoteObject> {
        let query = extras_to_query(extras);
        self.client
            .create_object(self.kind, payload, &query)
            .await
            .map_err(|e| e.into_engine())
    }

    async fn update(&self, id: &str, object: &RemoteObject) -> kumo_engine::Result<RemoteObject> {
        self.client
            .update_object(self.kind, id, object)
            .await
            .map_err(|e| e.into_engine())
    }

    async fn delete(&self, id: &str) -> kumo_engine::Result<()> {
        self.client
            .delete_object(self.kind, id)
            .await
            .map_err(|e| e.into_engine())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extras_render_scalars_plainly() {
        let mut extras = Map::new();
        extras.insert("subnet_size".into(), json!(26));
        extras.insert("label".into(), json!("edge"));
        extras.insert("flags".into(), json!(["a", "b"]));

        let mut query = extras_to_query(&extras);
        query.sort();
        assert_eq!(
            query,
            vec![
                ("flags".to_string(), "[\"a\",\"b\"]".to_string()),
                ("label".to_string(), "edge".to_string()),
                ("subnet_size".to_string(), "26".to_string()),
            ]
        );
    }
}
