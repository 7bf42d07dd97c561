//! Kumo reconciliation engine
//!
//! This crate is the core of Kumo's declarative resource management: an
//! idempotent reconciliation engine that, given a resource descriptor, a
//! desired-state description, and an adapter over the remote store,
//! decides whether a create, update, or delete is needed, computes the
//! minimal attribute diff, and rejects illegal mutations of immutable
//! fields.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   Kumo CLI                       │
//! │                 (kumo apply)                     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                kumo-engine                       │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  ResourceDescriptor  (static schema)      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │  diff/decide │  │ trait ResourceAdapter │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └───────────────────────────┬─────────────────────┘
//!                             │
//!                   ┌─────────▼─────────┐
//!                   │    kumo-client     │
//!                   │  (HTTP adapters)   │
//!                   └───────────────────┘
//! ```
//!
//! The engine is single-threaded and stateless per invocation: one
//! lookup scan, zero or one mutating call. Descriptors are immutable
//! after construction and safe to share across invocations.

pub mod adapter;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod object;
pub mod reconcile;

// Re-exports
pub use adapter::{ResourceAdapter, ResourceKind, find, find_many};
pub use descriptor::{ApiVersion, FieldSpec, Mutability, ResourceDescriptor};
pub use diff::{compute_diff, will_change};
pub use error::{EngineError, Result};
pub use object::{DesiredState, Presence, RemoteObject};
pub use reconcile::{ReconcileAction, ReconcileOutcome, creation_extras, creation_payload, reconcile};
