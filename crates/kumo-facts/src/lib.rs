//! Kumo host fact collectors
//!
//! Independent probes that populate configuration facts before
//! provisioning: EC2 instance metadata, network-interface role
//! classification, and virtualization detection. The reconciliation
//! engine consumes none of this directly; facts are merged into the
//! orchestration input as plain key-value data.

pub mod error;
pub mod facts;
pub mod metadata;
pub mod network;
pub mod virt;

pub use error::{FactsError, Result};
pub use facts::{HostFacts, collect, flatten};
pub use metadata::{ImdsClient, InstanceMetadata, NicMetadata};
pub use network::{
    ClassifyOptions, DeviceRole, InterfaceFacts, NetworkDevices, PublicMode, classify, enumerate,
};
pub use virt::{VirtEngine, Virtualization};
