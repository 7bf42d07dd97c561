//! Project resource schema
//!
//! A project groups kompute instances under shared teams and regions.
//! The schema mirrors the orchestrator's project API:
//!
//! - `name`: project name; cannot be updated.
//! - `description`: free-form description.
//! - `domain`: fully qualified domain name for the project's instances.
//! - `root_password`: default root password for instances to be created
//!   (auto-generated server-side if unspecified); cannot be updated.
//! - `bootstrap_user` / `bootstrap_pubkey`: templated bootstrap account
//!   for new instances; cannot be updated.
//! - `subnet_size`: private subnet netmask size requested at creation
//!   (e.g. 26 for a /26); consumed as a create-only extra, never diffed.
//! - `teams`: names of teams with access to the project; resolved to IDs.
//! - `regions`: names of regions the project can create instances in;
//!   resolved to IDs.

use kumo_engine::{FieldSpec, ResourceDescriptor, ResourceKind};
use serde_json::json;

/// Descriptor for the project resource type.
pub fn project_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(
        ResourceKind::Project,
        vec![
            FieldSpec::new("name").immutable().required(),
            FieldSpec::new("description").mutable(),
            FieldSpec::new("domain").mutable(),
            FieldSpec::new("root_password").immutable(),
            FieldSpec::new("bootstrap_user").immutable(),
            FieldSpec::new("bootstrap_pubkey").immutable(),
            FieldSpec::new("subnet_size").with_default(json!(26)),
            FieldSpec::new("teams")
                .mutable()
                .required()
                .unordered()
                .lookup(ResourceKind::Team),
            FieldSpec::new("regions")
                .mutable()
                .required()
                .unordered()
                .lookup(ResourceKind::Region),
        ],
    )
}
