//! Kumo orchestrator API client
//!
//! This crate connects the reconciliation engine to a running Kumo
//! orchestrator: connection configuration, the JSON REST client, one
//! engine adapter per resource kind, and strict name-to-ID reference
//! resolution for team/region membership.
//!
//! # Example
//!
//! ```ignore
//! use kumo_client::{AdapterRegistry, ApiClient, ApiConfig, project_descriptor, resolve_references};
//! use kumo_engine::{DesiredState, Presence, ResourceKind, reconcile};
//! use std::sync::Arc;
//!
//! let config = ApiConfig::from_env()?;
//! let client = Arc::new(ApiClient::new(config));
//! let backend = client.connect().await?;
//!
//! let registry = AdapterRegistry::for_client(client);
//! let descriptor = project_descriptor();
//! let desired = resolve_references(&registry, &descriptor, &desired).await?;
//!
//! let adapter = registry.get(ResourceKind::Project)?;
//! let outcome = reconcile(&descriptor, &desired, adapter.as_ref(), Some(backend), false).await?;
//! ```

pub mod adapter;
pub mod api;
pub mod config;
pub mod error;
pub mod project;
pub mod registry;

pub use adapter::ApiAdapter;
pub use api::{ApiClient, MINIMUM_BACKEND_VERSION, ensure_compatibility};
pub use config::ApiConfig;
pub use error::{ClientError, Result};
pub use project::project_descriptor;
pub use registry::{AdapterRegistry, resolve_references};
