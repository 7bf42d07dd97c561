//! Reconciliation driver
//!
//! The decide-and-apply cycle converging remote state toward desired
//! state: four terminal outcomes (create, update, delete, no-op), no
//! intermediate persisted state, at most one mutating adapter call per
//! invocation.

use crate::adapter::{self, ResourceAdapter};
use crate::descriptor::{ApiVersion, ResourceDescriptor};
use crate::diff::compute_diff;
use crate::error::{EngineError, Result};
use crate::object::{DesiredState, Presence, RemoteObject};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action decided for a reconciliation invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    Create,
    Update,
    Delete,
    NoOp,
}

impl std::fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileAction::Create => write!(f, "create"),
            ReconcileAction::Update => write!(f, "update"),
            ReconcileAction::Delete => write!(f, "delete"),
            ReconcileAction::NoOp => write!(f, "no-op"),
        }
    }
}

/// Outcome of one reconciliation invocation.
///
/// `changed` is false only when the decided action performed zero
/// mutating calls. `object` is the post-action remote object for create
/// and update, and `None` for delete, no-op, and every dry run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub action: ReconcileAction,
    pub changed: bool,
    pub object: Option<RemoteObject>,
}

/// Creation payload from the descriptor's creatable fields, in the
/// descriptor's stable field order.
pub fn creation_payload(
    descriptor: &ResourceDescriptor,
    values: &Map<String, Value>,
) -> Map<String, Value> {
    descriptor
        .creatable_fields()
        .into_iter()
        .filter_map(|spec| {
            values
                .get(&spec.name)
                .filter(|v| !v.is_null())
                .map(|v| (spec.name.clone(), v.clone()))
        })
        .collect()
}

/// Create-only extras: values for fields carrying no mutability flag,
/// consumed by the adapter out-of-band.
pub fn creation_extras(
    descriptor: &ResourceDescriptor,
    values: &Map<String, Value>,
) -> Map<String, Value> {
    descriptor
        .extra_fields()
        .filter_map(|spec| {
            values
                .get(&spec.name)
                .filter(|v| !v.is_null())
                .map(|v| (spec.name.clone(), v.clone()))
        })
        .collect()
}

/// Reconcile one resource against its remote state.
///
/// The state machine:
///
/// ```text
/// present, remote missing  -> create
/// present, remote exists   -> diff? update : no-op
/// absent,  remote exists   -> delete
/// absent,  remote missing  -> no-op
/// ```
///
/// With `dry_run` the engine stops after the decision: no adapter call
/// is made and the outcome carries `object: None`. Otherwise exactly one
/// mutating call is performed. Immutable-violation and lookup failures
/// abort before any mutation; adapter failures during the mutating call
/// propagate unmodified, leaving remote state as the failed call left it
/// (no rollback, no retry).
///
/// Concurrent reconciliations of the same named resource are not
/// coordinated; last write wins at the remote API. Callers that may run
/// concurrently must apply their own per-resource mutual exclusion.
pub async fn reconcile(
    descriptor: &ResourceDescriptor,
    desired: &DesiredState,
    adapter: &dyn ResourceAdapter,
    backend_version: Option<ApiVersion>,
    dry_run: bool,
) -> Result<ReconcileOutcome> {
    let mut effective = descriptor.apply_defaults(desired.values());
    if let Some(backend) = backend_version {
        effective = descriptor.filter_by_version(backend, &effective);
    }

    if desired.presence() == Presence::Present {
        descriptor.validate_required(&effective)?;
    }

    let identifier = effective
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            EngineError::Configuration(format!(
                "A name is required to reconcile a {}",
                descriptor.kind()
            ))
        })?;

    let remote = adapter::find(adapter, &identifier).await?;

    enum Decision {
        Create,
        Update(RemoteObject),
        Delete(RemoteObject),
        NoOp,
    }

    let decision = match (desired.presence(), remote) {
        (Presence::Present, None) => Decision::Create,
        (Presence::Present, Some(obj)) => {
            let (changed, updated) = compute_diff(descriptor, &effective, &obj)?;
            if changed {
                Decision::Update(updated)
            } else {
                Decision::NoOp
            }
        }
        (Presence::Absent, Some(obj)) => Decision::Delete(obj),
        (Presence::Absent, None) => Decision::NoOp,
    };

    let (action, changed) = match &decision {
        Decision::Create => (ReconcileAction::Create, true),
        Decision::Update(_) => (ReconcileAction::Update, true),
        Decision::Delete(_) => (ReconcileAction::Delete, true),
        Decision::NoOp => (ReconcileAction::NoOp, false),
    };

    if dry_run {
        tracing::debug!(kind = %descriptor.kind(), %identifier, %action, changed, "dry run");
        return Ok(ReconcileOutcome {
            action,
            changed,
            object: None,
        });
    }

    let object = match decision {
        Decision::Create => {
            tracing::info!(kind = %descriptor.kind(), %identifier, "creating resource");
            let payload = creation_payload(descriptor, &effective);
            let extras = creation_extras(descriptor, &effective);
            Some(adapter.create(&payload, &extras).await?)
        }
        Decision::Update(updated) => {
            tracing::info!(kind = %descriptor.kind(), %identifier, "updating resource");
            Some(adapter.update(&updated.id, &updated).await?)
        }
        Decision::Delete(obj) => {
            tracing::info!(kind = %descriptor.kind(), %identifier, "deleting resource");
            adapter.delete(&obj.id).await?;
            None
        }
        Decision::NoOp => None,
    };

    Ok(ReconcileOutcome {
        action,
        changed,
        object,
    })
}
