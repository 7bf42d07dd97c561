//! Adapter registry and reference resolution
//!
//! Adapters are selected through a map keyed by [`ResourceKind`], so the
//! resource-type-to-adapter mapping is checked at compile time instead of
//! being derived from strings at call time.

use crate::adapter::ApiAdapter;
use crate::api::ApiClient;
use kumo_engine::{
    DesiredState, EngineError, ResourceAdapter, ResourceDescriptor, ResourceKind, find_many,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of resource adapters keyed by kind.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ResourceKind, Arc<dyn ResourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an API-backed adapter for every resource kind.
    pub fn for_client(client: Arc<ApiClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ApiAdapter::project(client.clone())));
        registry.register(Arc::new(ApiAdapter::team(client.clone())));
        registry.register(Arc::new(ApiAdapter::region(client)));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn ResourceAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: ResourceKind) -> kumo_engine::Result<&Arc<dyn ResourceAdapter>> {
        self.adapters.get(&kind).ok_or_else(|| {
            EngineError::Configuration(format!("No adapter registered for {}", kind))
        })
    }
}

/// Resolve every reference-list field of `desired` from human names to
/// identifiers.
///
/// Fields whose spec declares a `lookup` kind are replaced by the IDs the
/// corresponding adapter resolves them to, with strict semantics: a
/// non-empty name list that matches nothing is an
/// [`InvalidReference`](EngineError::InvalidReference) failure rather than
/// a silently empty membership. Runs before payload construction and
/// diffing, so diffs compare IDs against IDs.
pub async fn resolve_references(
    registry: &AdapterRegistry,
    descriptor: &ResourceDescriptor,
    desired: &DesiredState,
) -> kumo_engine::Result<DesiredState> {
    let mut values = desired.values().clone();

    for spec in descriptor.fields() {
        let Some(kind) = spec.lookup else { continue };
        let Some(value) = desired.get(&spec.name) else {
            continue;
        };
        let names: Vec<String> = match value {
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(EngineError::Configuration(format!(
                        "{} entries must be names, got {}",
                        spec.name, other
                    ))),
                })
                .collect::<kumo_engine::Result<_>>()?,
            other => {
                return Err(EngineError::Configuration(format!(
                    "{} must be a list of names, got {}",
                    spec.name, other
                )));
            }
        };

        let adapter = registry.get(kind)?;
        let ids = find_many(adapter.as_ref(), &spec.name, &names, true).await?;
        values.insert(
            spec.name.clone(),
            Value::Array(ids.into_iter().map(Value::String).collect()),
        );
    }

    Ok(DesiredState::from_values(desired.presence(), values))
}
