//! Desired and remote resource state
//!
//! A [`DesiredState`] is the caller-supplied target for one resource and
//! is built fresh per invocation. A [`RemoteObject`] is a snapshot of the
//! resource as it currently exists server-side; the engine never mutates
//! one in place; updates always go through [`RemoteObject::with_updates`],
//! which produces an independent copy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether the resource should exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    #[default]
    Present,
    Absent,
}

/// Caller-supplied target configuration for a resource.
///
/// The value map may be partial: a field that is omitted (or null) means
/// "leave unspecified", never "reset to default": partial updates never
/// revert fields the caller did not name.
#[derive(Debug, Clone, Default)]
pub struct DesiredState {
    presence: Presence,
    values: Map<String, Value>,
}

impl DesiredState {
    pub fn new(presence: Presence) -> Self {
        Self {
            presence,
            values: Map::new(),
        }
    }

    pub fn from_values(presence: Presence, values: Map<String, Value>) -> Self {
        Self { presence, values }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Non-null value for a field, if the caller specified one.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }
}

/// Externally-owned snapshot of a resource's current server-side state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl RemoteObject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Field-value view used for diff comparison and output
    /// serialization, id included.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.attributes.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map
    }

    /// Independent copy with `updates` applied on top. The original
    /// snapshot is left untouched and shares no state with the copy.
    pub fn with_updates(&self, updates: &Map<String, Value>) -> RemoteObject {
        let mut copy = self.clone();
        for (name, value) in updates {
            copy.attributes.insert(name.clone(), value.clone());
        }
        copy
    }
}
