//! Resource adapter contract and lookup helpers
//!
//! The engine is adapter-agnostic: everything it needs from a concrete
//! resource client is the [`ResourceAdapter`] capability trait. One
//! implementation exists per resource type, selected through a registry
//! keyed by [`ResourceKind`] rather than by string-derived dispatch.

use crate::error::Result;
use crate::object::RemoteObject;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Team,
    Region,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Team => "team",
            ResourceKind::Region => "region",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability contract the engine requires from a resource client.
///
/// `create` receives the creation payload built from the descriptor's
/// creatable fields, plus the create-only extras (fields carrying no
/// mutability flag) for the adapter to consume out-of-band.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Enumerate identifiers of all remote objects of this type.
    async fn list(&self) -> Result<Vec<String>>;

    /// Read one remote object by identifier.
    async fn read(&self, id: &str) -> Result<RemoteObject>;

    /// Create a resource and return the resulting object.
    async fn create(
        &self,
        payload: &Map<String, Value>,
        extras: &Map<String, Value>,
    ) -> Result<RemoteObject>;

    /// Replace a resource with the given object and return the result.
    async fn update(&self, id: &str, object: &RemoteObject) -> Result<RemoteObject>;

    /// Delete a resource.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Find a remote object whose id or name matches `identifier`.
///
/// Enumerates all objects of the adapter's type and linearly scans for
/// the first match. Adapter failures during the scan surface as lookup
/// errors; there is no retry and no caching, so a full re-scan happens on
/// every invocation.
pub async fn find(
    adapter: &dyn ResourceAdapter,
    identifier: &str,
) -> Result<Option<RemoteObject>> {
    let ids = adapter.list().await.map_err(|e| e.into_lookup())?;
    for id in ids {
        let obj = adapter.read(&id).await.map_err(|e| e.into_lookup())?;
        if obj.id == identifier || obj.name() == Some(identifier) {
            return Ok(Some(obj));
        }
    }
    Ok(None)
}

/// Resolve a list of human names (or ids) to identifiers with a single
/// scan.
///
/// With `strict`, a non-empty request that resolves to nothing is a hard
/// [`InvalidReference`](crate::EngineError::InvalidReference) failure
/// reported under `param`; a typo must not silently create a resource
/// with zero linked references. An empty request is not a violation and
/// resolves to an empty list without touching the adapter.
pub async fn find_many(
    adapter: &dyn ResourceAdapter,
    param: &str,
    names: &[String],
    strict: bool,
) -> Result<Vec<String>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    let all = adapter.list().await.map_err(|e| e.into_lookup())?;
    for id in all {
        let obj = adapter.read(&id).await.map_err(|e| e.into_lookup())?;
        for name in names {
            if *name == obj.id || obj.name() == Some(name.as_str()) {
                ids.push(id.clone());
                break;
            }
        }
    }

    if strict && ids.is_empty() {
        return Err(crate::EngineError::InvalidReference {
            param: param.to_string(),
            values: names.to_vec(),
        });
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct FakeAdapter {
        objects: Mutex<BTreeMap<String, RemoteObject>>,
    }

    impl FakeAdapter {
        fn with_objects(objects: Vec<RemoteObject>) -> Self {
            Self {
                objects: Mutex::new(
                    objects.into_iter().map(|o| (o.id.clone(), o)).collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl ResourceAdapter for FakeAdapter {
        fn kind(&self) -> ResourceKind {
            ResourceKind::Team
        }

        async fn list(&self) -> Result<Vec<String>> {
            Ok(self.objects.lock().unwrap().keys().cloned().collect())
        }

        async fn read(&self, id: &str) -> Result<RemoteObject> {
            self.objects
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| EngineError::Lookup(format!("team {} not found", id)))
        }

        async fn create(
            &self,
            _payload: &Map<String, Value>,
            _extras: &Map<String, Value>,
        ) -> Result<RemoteObject> {
            unimplemented!("read-only fake")
        }

        async fn update(&self, _id: &str, _object: &RemoteObject) -> Result<RemoteObject> {
            unimplemented!("read-only fake")
        }

        async fn delete(&self, _id: &str) -> Result<()> {
            unimplemented!("read-only fake")
        }
    }

    fn teams() -> FakeAdapter {
        FakeAdapter::with_objects(vec![
            RemoteObject::new("t-1").with_attribute("name", json!("dev")),
            RemoteObject::new("t-2").with_attribute("name", json!("ops")),
        ])
    }

    #[tokio::test]
    async fn find_matches_name_or_id() {
        let adapter = teams();
        let by_name = find(&adapter, "ops").await.unwrap().unwrap();
        assert_eq!(by_name.id, "t-2");
        let by_id = find(&adapter, "t-1").await.unwrap().unwrap();
        assert_eq!(by_id.name(), Some("dev"));
        assert!(find(&adapter, "qa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_many_resolves_names_to_ids() {
        let adapter = teams();
        let ids = find_many(&adapter, "teams", &["dev".into(), "ops".into()], true)
            .await
            .unwrap();
        assert_eq!(ids, ["t-1", "t-2"]);
    }

    #[tokio::test]
    async fn find_many_empty_request_is_not_a_violation() {
        let adapter = teams();
        let ids = find_many(&adapter, "teams", &[], true).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn find_many_strict_fails_on_zero_matches() {
        let adapter = teams();
        let err = find_many(&adapter, "teams", &["nonexistent".into()], true)
            .await
            .unwrap_err();
        match err {
            EngineError::InvalidReference { param, values } => {
                assert_eq!(param, "teams");
                assert_eq!(values, ["nonexistent"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn find_many_lenient_returns_empty() {
        let adapter = teams();
        let ids = find_many(&adapter, "teams", &["nonexistent".into()], false)
            .await
            .unwrap();
        assert!(ids.is_empty());
    }
}
