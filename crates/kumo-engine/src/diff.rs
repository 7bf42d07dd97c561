//! Diff computation and change decision
//!
//! Pure functions: nothing here performs a remote call, which is what
//! makes dry-run/preview mode possible: [`will_change`] answers "would
//! reconciling mutate anything" from the desired values and a
//! previously-fetched snapshot alone.

use crate::descriptor::{FieldSpec, ResourceDescriptor};
use crate::error::{EngineError, Result};
use crate::object::{Presence, RemoteObject};
use serde_json::{Map, Value};

/// Value equality on the field's semantic type.
///
/// Reference-list fields (`unordered`) compare as order-independent
/// sets; everything else compares order-sensitively.
fn values_equal(spec: &FieldSpec, desired: &Value, remote: &Value) -> bool {
    if spec.unordered {
        if let (Value::Array(a), Value::Array(b)) = (desired, remote) {
            if a.len() != b.len() {
                return false;
            }
            let key = |v: &Value| v.to_string();
            let mut a: Vec<String> = a.iter().map(key).collect();
            let mut b: Vec<String> = b.iter().map(key).collect();
            a.sort();
            b.sort();
            return a == b;
        }
    }
    desired == remote
}

/// Compute the minimal attribute diff between desired values and a
/// remote snapshot.
///
/// Immutable fields set to a value differing from the remote one are a
/// hard [`ImmutableFieldViolation`](EngineError::ImmutableFieldViolation)
/// listing every offending field, never silently ignored or coerced.
/// A field absent from `desired` is never considered different,
/// regardless of its remote value: partial updates do not revert
/// unspecified fields.
///
/// Returns `(false, remote-copy)` when nothing differs, otherwise
/// `(true, copy-with-attributes-applied)`. The original snapshot is
/// never modified and shares no state with the returned copy.
pub fn compute_diff(
    descriptor: &ResourceDescriptor,
    desired: &Map<String, Value>,
    remote: &RemoteObject,
) -> Result<(bool, RemoteObject)> {
    let remote_map = remote.to_map();

    let violations: Vec<String> = descriptor
        .immutable_fields()
        .filter(|spec| {
            let Some(wanted) = desired.get(&spec.name).filter(|v| !v.is_null()) else {
                return false;
            };
            match remote_map.get(&spec.name) {
                Some(current) => !values_equal(spec, wanted, current),
                None => false,
            }
        })
        .map(|spec| spec.name.clone())
        .collect();

    if !violations.is_empty() {
        return Err(EngineError::ImmutableFieldViolation { fields: violations });
    }

    let mut attributes = Map::new();
    for spec in descriptor.mutable_fields() {
        let Some(wanted) = desired.get(&spec.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let differs = match remote_map.get(&spec.name) {
            Some(current) => !values_equal(spec, wanted, current),
            None => true,
        };
        if differs {
            attributes.insert(spec.name.clone(), wanted.clone());
        }
    }

    if attributes.is_empty() {
        return Ok((false, remote.clone()));
    }

    tracing::debug!(
        kind = %descriptor.kind(),
        fields = ?attributes.keys().collect::<Vec<_>>(),
        "attribute diff computed"
    );
    Ok((true, remote.with_updates(&attributes)))
}

/// Decide whether reconciling would change remote state, without
/// performing any mutating call.
pub fn will_change(
    descriptor: &ResourceDescriptor,
    presence: Presence,
    desired: &Map<String, Value>,
    remote: Option<&RemoteObject>,
) -> Result<bool> {
    match (presence, remote) {
        (Presence::Present, None) => Ok(true),
        (Presence::Present, Some(obj)) => Ok(compute_diff(descriptor, desired, obj)?.0),
        (Presence::Absent, Some(_)) => Ok(true),
        (Presence::Absent, None) => Ok(false),
    }
}
