//! Resource descriptors
//!
//! A [`ResourceDescriptor`] is the static schema for one resource type:
//! its fields, their mutability, defaults, and the backend-version bounds
//! under which each field is recognized. Descriptors are built once per
//! resource type and never mutated afterwards, so a single descriptor is
//! safe to share across any number of reconciliation calls.

use crate::adapter::ResourceKind;
use crate::error::{EngineError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Backend API version as a numeric triple.
///
/// Parsed leniently: missing components default to zero, so `"0.52"`
/// compares as `0.52.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ApiVersion {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, '.');
        let mut next = |name: &str| -> Result<u32> {
            match parts.next() {
                None => Ok(0),
                Some(p) => p.parse::<u32>().map_err(|_| {
                    EngineError::Configuration(format!(
                        "Invalid {} component in version {:?}",
                        name, s
                    ))
                }),
            }
        };
        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether a field may change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// May be set at creation and updated afterwards.
    Mutable,
    /// May be set at creation, never changed afterwards.
    Immutable,
}

/// Schema for one resource attribute.
///
/// A field without a [`Mutability`] flag is excluded from diffing
/// entirely: it is create-only informational (passed to the adapter as a
/// creation extra) or computed server-side.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub mutability: Option<Mutability>,
    pub default: Option<Value>,
    /// Minimum backend version that recognizes this field.
    pub min_ver: Option<ApiVersion>,
    /// Maximum backend version that recognizes this field.
    pub max_ver: Option<ApiVersion>,
    /// Compare list values as unordered sets (reference-list fields such
    /// as team or region membership).
    pub unordered: bool,
    /// Values are human names to be resolved into IDs of this resource
    /// kind before payload construction.
    pub lookup: Option<ResourceKind>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            mutability: None,
            default: None,
            min_ver: None,
            max_ver: None,
            unordered: false,
            lookup: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn mutable(mut self) -> Self {
        self.mutability = Some(Mutability::Mutable);
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mutability = Some(Mutability::Immutable);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn min_ver(mut self, version: ApiVersion) -> Self {
        self.min_ver = Some(version);
        self
    }

    pub fn max_ver(mut self, version: ApiVersion) -> Self {
        self.max_ver = Some(version);
        self
    }

    pub fn unordered(mut self) -> Self {
        self.unordered = true;
        self
    }

    pub fn lookup(mut self, kind: ResourceKind) -> Self {
        self.lookup = Some(kind);
        self
    }

    /// Whether the connected backend version recognizes this field.
    pub fn in_version(&self, backend: ApiVersion) -> bool {
        if let Some(min) = self.min_ver {
            if backend < min {
                return false;
            }
        }
        if let Some(max) = self.max_ver {
            if backend > max {
                return false;
            }
        }
        true
    }
}

/// Ordered field schema for one resource type.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    fields: Vec<FieldSpec>,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, fields: Vec<FieldSpec>) -> Self {
        Self { kind, fields }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that may appear in update payloads.
    pub fn mutable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.mutability == Some(Mutability::Mutable))
    }

    /// Fields that may never change after creation.
    pub fn immutable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.mutability == Some(Mutability::Immutable))
    }

    /// Fields that may appear in creation payloads: mutable fields first,
    /// then immutable ones, each partition in descriptor insertion order.
    /// The order is stable across runs so creation payloads are
    /// deterministic.
    pub fn creatable_fields(&self) -> Vec<&FieldSpec> {
        self.mutable_fields().chain(self.immutable_fields()).collect()
    }

    /// Fields carrying no mutability flag: create-only extras consumed by
    /// the adapter, excluded from diffing.
    pub fn extra_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.mutability.is_none())
    }

    /// Drop every value whose field falls outside the connected backend
    /// version. Unknown field names pass through untouched.
    ///
    /// This is intentionally a silent filter, applied before both create
    /// and diff computation: a version-gated field absent from the
    /// backend is never surfaced as a change.
    pub fn filter_by_version(
        &self,
        backend: ApiVersion,
        values: &Map<String, Value>,
    ) -> Map<String, Value> {
        values
            .iter()
            .filter(|(name, _)| match self.field(name) {
                Some(spec) => spec.in_version(backend),
                None => true,
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Fill in declared defaults for fields absent from `values`.
    pub fn apply_defaults(&self, values: &Map<String, Value>) -> Map<String, Value> {
        let mut out = values.clone();
        for spec in &self.fields {
            if let Some(default) = &spec.default {
                out.entry(spec.name.clone()).or_insert_with(|| default.clone());
            }
        }
        out
    }

    /// Check that every required field is present and non-null.
    pub fn validate_required(&self, values: &Map<String, Value>) -> Result<()> {
        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| !matches!(values.get(&f.name), Some(v) if !v.is_null()))
            .map(|f| f.name.as_str())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Configuration(format!(
                "Missing required fields for {}: {:?}",
                self.kind, missing
            )))
        }
    }
}
