//! `kumo apply`: reconcile a manifest against the orchestrator.

use crate::manifest::Manifest;
use anyhow::bail;
use colored::Colorize;
use kumo_client::{AdapterRegistry, ApiClient, project_descriptor, resolve_references};
use kumo_engine::{ReconcileAction, ReconcileOutcome, ResourceKind, reconcile};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;

/// Caller-facing result shape, with `action` and `project` absent for
/// no-ops and dry runs.
fn render_result(outcome: &ReconcileOutcome, check: bool) -> Value {
    if check {
        return json!({ "changed": outcome.changed });
    }
    let mut result = json!({ "changed": outcome.changed });
    if outcome.action != ReconcileAction::NoOp {
        result["action"] = json!(outcome.action);
    }
    if let Some(object) = &outcome.object {
        result["project"] = Value::Object(object.to_map());
    }
    result
}

pub async fn run(file: &Path, check: bool) -> anyhow::Result<()> {
    let manifest = Manifest::load(file)?;
    tracing::debug!(
        manifest = %file.display(),
        projects = manifest.projects.len(),
        check,
        "applying manifest"
    );
    let config = manifest.api_config()?;
    let client = Arc::new(ApiClient::new(config));
    let backend = client.connect().await?;

    let registry = AdapterRegistry::for_client(client);
    let descriptor = project_descriptor();
    let adapter = registry.get(ResourceKind::Project)?;

    for entry in &manifest.projects {
        let name = entry.display_name();
        let desired = resolve_references(&registry, &descriptor, &entry.desired()).await;
        let outcome = match desired {
            Ok(desired) => {
                reconcile(&descriptor, &desired, adapter.as_ref(), Some(backend), check).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(outcome) => {
                let status = if outcome.changed {
                    outcome.action.to_string().yellow()
                } else {
                    "ok".to_string().green()
                };
                eprintln!("{} project {}", status, name);
                println!("{}", render_result(&outcome, check));
            }
            Err(e) => {
                println!("{}", json!({ "changed": false, "error": e.to_string() }));
                bail!("Failed to reconcile project {}: {}", name, e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumo_engine::RemoteObject;

    #[test]
    fn check_mode_reports_changed_only() {
        let outcome = ReconcileOutcome {
            action: ReconcileAction::Create,
            changed: true,
            object: None,
        };
        assert_eq!(render_result(&outcome, true), json!({ "changed": true }));
    }

    #[test]
    fn apply_result_carries_action_and_object() {
        let outcome = ReconcileOutcome {
            action: ReconcileAction::Update,
            changed: true,
            object: Some(RemoteObject::new("p-1").with_attribute("name", json!("p1"))),
        };
        let result = render_result(&outcome, false);
        assert_eq!(result["changed"], json!(true));
        assert_eq!(result["action"], json!("update"));
        assert_eq!(result["project"]["id"], json!("p-1"));
        assert_eq!(result["project"]["name"], json!("p1"));
    }

    #[test]
    fn noop_result_has_no_action() {
        let outcome = ReconcileOutcome {
            action: ReconcileAction::NoOp,
            changed: false,
            object: None,
        };
        let result = render_result(&outcome, false);
        assert_eq!(result, json!({ "changed": false }));
    }
}
