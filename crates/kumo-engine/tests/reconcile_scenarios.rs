//! End-to-end reconciliation scenarios against an in-memory adapter.

use async_trait::async_trait;
use kumo_engine::{
    ApiVersion, DesiredState, EngineError, FieldSpec, Presence, ReconcileAction, RemoteObject,
    ResourceAdapter, ResourceDescriptor, ResourceKind, Result, reconcile,
};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory resource store standing in for the remote API.
struct InMemoryAdapter {
    kind: ResourceKind,
    objects: Mutex<BTreeMap<String, RemoteObject>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    list_error: Option<String>,
}

impl InMemoryAdapter {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            objects: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            calls: Mutex::new(Vec::new()),
            list_error: None,
        }
    }

    /// Adapter whose enumeration always fails with the given message.
    fn unreachable(kind: ResourceKind, message: &str) -> Self {
        Self {
            list_error: Some(message.to_string()),
            ..Self::new(kind)
        }
    }

    fn seed(&self, object: RemoteObject) {
        self.objects
            .lock()
            .unwrap()
            .insert(object.id.clone(), object);
    }

    fn mutating_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceAdapter for InMemoryAdapter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn list(&self) -> Result<Vec<String>> {
        if let Some(message) = &self.list_error {
            return Err(EngineError::Adapter(message.clone()));
        }
        Ok(self.objects.lock().unwrap().keys().cloned().collect())
    }

    async fn read(&self, id: &str) -> Result<RemoteObject> {
        self.objects
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::Lookup(format!("{} {} not found", self.kind, id)))
    }

    async fn create(
        &self,
        payload: &Map<String, Value>,
        _extras: &Map<String, Value>,
    ) -> Result<RemoteObject> {
        self.calls.lock().unwrap().push("create".into());
        let id = format!("p-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let object = RemoteObject {
            id: id.clone(),
            attributes: payload.clone(),
        };
        self.objects.lock().unwrap().insert(id, object.clone());
        Ok(object)
    }

    async fn update(&self, id: &str, object: &RemoteObject) -> Result<RemoteObject> {
        self.calls.lock().unwrap().push("update".into());
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(id) {
            return Err(EngineError::Adapter(format!("{} {} not found", self.kind, id)));
        }
        objects.insert(id.to_string(), object.clone());
        Ok(object.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.calls.lock().unwrap().push("delete".into());
        self.objects.lock().unwrap().remove(id);
        Ok(())
    }
}

fn project_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(
        ResourceKind::Project,
        vec![
            FieldSpec::new("name").immutable().required(),
            FieldSpec::new("teams").mutable().required().unordered(),
            FieldSpec::new("regions").mutable().required().unordered(),
        ],
    )
}

fn desired_p1() -> DesiredState {
    DesiredState::new(Presence::Present)
        .with_value("name", json!("p1"))
        .with_value("teams", json!(["dev"]))
        .with_value("regions", json!(["eu-west-1"]))
}

#[tokio::test]
async fn creates_missing_resource() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    let descriptor = project_descriptor();

    let outcome = reconcile(&descriptor, &desired_p1(), &adapter, None, false)
        .await
        .unwrap();

    assert_eq!(outcome.action, ReconcileAction::Create);
    assert!(outcome.changed);
    let object = outcome.object.unwrap();
    assert_eq!(object.get("name"), Some(&json!("p1")));
    assert_eq!(object.get("teams"), Some(&json!(["dev"])));
    assert_eq!(adapter.mutating_calls(), ["create"]);
}

#[tokio::test]
async fn updates_drifted_resource() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    adapter.seed(
        RemoteObject::new("p-9")
            .with_attribute("name", json!("p1"))
            .with_attribute("teams", json!(["dev"]))
            .with_attribute("regions", json!(["eu-west-1"])),
    );
    let descriptor = project_descriptor();
    let desired = desired_p1().with_value("teams", json!(["dev", "ops"]));

    let outcome = reconcile(&descriptor, &desired, &adapter, None, false)
        .await
        .unwrap();

    assert_eq!(outcome.action, ReconcileAction::Update);
    assert!(outcome.changed);
    let object = outcome.object.unwrap();
    assert_eq!(object.id, "p-9");
    assert_eq!(object.get("teams"), Some(&json!(["dev", "ops"])));
    assert_eq!(adapter.mutating_calls(), ["update"]);
}

#[tokio::test]
async fn converged_resource_is_a_noop() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    adapter.seed(
        RemoteObject::new("p-9")
            .with_attribute("name", json!("p1"))
            .with_attribute("teams", json!(["dev"]))
            .with_attribute("regions", json!(["eu-west-1"])),
    );
    let descriptor = project_descriptor();

    let outcome = reconcile(&descriptor, &desired_p1(), &adapter, None, false)
        .await
        .unwrap();

    assert_eq!(outcome.action, ReconcileAction::NoOp);
    assert!(!outcome.changed);
    assert!(outcome.object.is_none());
    assert!(adapter.mutating_calls().is_empty());
}

#[tokio::test]
async fn deletes_then_noops_when_absent() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    adapter.seed(
        RemoteObject::new("p-9")
            .with_attribute("name", json!("p1"))
            .with_attribute("teams", json!(["dev"]))
            .with_attribute("regions", json!(["eu-west-1"])),
    );
    let descriptor = project_descriptor();
    let desired = DesiredState::new(Presence::Absent).with_value("name", json!("p1"));

    let outcome = reconcile(&descriptor, &desired, &adapter, None, false)
        .await
        .unwrap();
    assert_eq!(outcome.action, ReconcileAction::Delete);
    assert!(outcome.changed);
    assert!(outcome.object.is_none());

    // second run: already absent
    let outcome = reconcile(&descriptor, &desired, &adapter, None, false)
        .await
        .unwrap();
    assert_eq!(outcome.action, ReconcileAction::NoOp);
    assert!(!outcome.changed);
    assert_eq!(adapter.mutating_calls(), ["delete"]);
}

#[tokio::test]
async fn dry_run_decides_without_touching_the_adapter() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    let descriptor = project_descriptor();

    let outcome = reconcile(&descriptor, &desired_p1(), &adapter, None, true)
        .await
        .unwrap();

    assert_eq!(outcome.action, ReconcileAction::Create);
    assert!(outcome.changed);
    assert!(outcome.object.is_none());
    assert!(adapter.mutating_calls().is_empty());
    assert!(adapter.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn immutable_drift_aborts_before_any_mutation() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    adapter.seed(
        RemoteObject::new("p-9")
            .with_attribute("name", json!("p1"))
            .with_attribute("root_password", json!("hunter2"))
            .with_attribute("teams", json!(["dev"]))
            .with_attribute("regions", json!(["eu-west-1"])),
    );
    let descriptor = ResourceDescriptor::new(
        ResourceKind::Project,
        vec![
            FieldSpec::new("name").immutable().required(),
            FieldSpec::new("root_password").immutable(),
            FieldSpec::new("teams").mutable().required().unordered(),
            FieldSpec::new("regions").mutable().required().unordered(),
        ],
    );
    let desired = desired_p1().with_value("root_password", json!("changed"));

    let err = reconcile(&descriptor, &desired, &adapter, None, false)
        .await
        .unwrap_err();
    match err {
        EngineError::ImmutableFieldViolation { fields } => {
            assert_eq!(fields, ["root_password"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(adapter.mutating_calls().is_empty());
}

#[tokio::test]
async fn failing_lookup_aborts_before_any_mutation() {
    let adapter = InMemoryAdapter::unreachable(ResourceKind::Project, "backend unavailable");
    let descriptor = project_descriptor();

    let err = reconcile(&descriptor, &desired_p1(), &adapter, None, false)
        .await
        .unwrap_err();

    // the adapter failure surfaces as a lookup error, message verbatim
    match err {
        EngineError::Lookup(message) => assert_eq!(message, "backend unavailable"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(adapter.mutating_calls().is_empty());
}

#[tokio::test]
async fn version_gated_field_is_dropped_from_creation() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    let descriptor = ResourceDescriptor::new(
        ResourceKind::Project,
        vec![
            FieldSpec::new("name").immutable().required(),
            FieldSpec::new("teams").mutable().required().unordered(),
            FieldSpec::new("regions").mutable().required().unordered(),
            FieldSpec::new("quota")
                .mutable()
                .min_ver(ApiVersion::new(1, 0, 0)),
        ],
    );
    let desired = desired_p1().with_value("quota", json!(100));

    let outcome = reconcile(
        &descriptor,
        &desired,
        &adapter,
        Some(ApiVersion::new(0, 9, 0)),
        false,
    )
    .await
    .unwrap();

    let object = outcome.object.unwrap();
    assert!(object.get("quota").is_none());
}

#[tokio::test]
async fn version_gated_drift_is_never_surfaced_as_changed() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    adapter.seed(
        RemoteObject::new("p-9")
            .with_attribute("name", json!("p1"))
            .with_attribute("teams", json!(["dev"]))
            .with_attribute("regions", json!(["eu-west-1"]))
            .with_attribute("quota", json!(50)),
    );
    let descriptor = ResourceDescriptor::new(
        ResourceKind::Project,
        vec![
            FieldSpec::new("name").immutable().required(),
            FieldSpec::new("teams").mutable().required().unordered(),
            FieldSpec::new("regions").mutable().required().unordered(),
            FieldSpec::new("quota")
                .mutable()
                .min_ver(ApiVersion::new(1, 0, 0)),
        ],
    );
    let desired = desired_p1().with_value("quota", json!(100));

    let outcome = reconcile(
        &descriptor,
        &desired,
        &adapter,
        Some(ApiVersion::new(0, 9, 0)),
        false,
    )
    .await
    .unwrap();

    assert_eq!(outcome.action, ReconcileAction::NoOp);
    assert!(!outcome.changed);
    assert!(adapter.mutating_calls().is_empty());
}

#[tokio::test]
async fn missing_required_field_fails_before_lookup() {
    let adapter = InMemoryAdapter::new(ResourceKind::Project);
    let descriptor = project_descriptor();
    let desired = DesiredState::new(Presence::Present).with_value("name", json!("p1"));

    let err = reconcile(&descriptor, &desired, &adapter, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Configuration(_)));
}
