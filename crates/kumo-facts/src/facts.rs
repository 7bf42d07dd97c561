//! Fact assembly and flattening
//!
//! Collects every probe into one [`HostFacts`] value and flattens it into
//! the flat key-path map the orchestration layer merges into its
//! configuration input before reconciliation runs.

use crate::error::Result;
use crate::metadata::{self, ImdsClient, InstanceMetadata};
use crate::network::{self, ClassifyOptions, InterfaceFacts, NetworkDevices};
use crate::virt::{self, Virtualization};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Everything the collectors learned about this host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFacts {
    pub metadata: Option<InstanceMetadata>,
    pub interfaces: Vec<InterfaceFacts>,
    pub devices: NetworkDevices,
    pub virtualization: Virtualization,
}

/// Run all collectors.
pub async fn collect(mut options: ClassifyOptions) -> Result<HostFacts> {
    let metadata = metadata::detect(&ImdsClient::new()).await?;
    if let Some(meta) = &metadata {
        options.nat_hint = meta.nat_hint();
    }

    let interfaces = network::enumerate().await?;
    let devices = network::classify(&interfaces, &options);
    let virtualization = virt::detect().await;

    Ok(HostFacts {
        metadata,
        interfaces,
        devices,
        virtualization,
    })
}

/// Flatten facts into dotted key paths.
pub fn flatten(facts: &HostFacts) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    let mut set = |key: &str, value: Value| {
        out.insert(key.to_string(), value);
    };

    set("general.type", json!(facts.virtualization.machine_type()));
    set(
        "general.virtualization",
        json!(facts.virtualization.engine_name()),
    );

    if let Some(meta) = &facts.metadata {
        let mut opt = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                out.insert(key.to_string(), json!(v));
            }
        };
        opt("aws.availability-zone", &meta.availability_zone);
        opt("aws.region", &meta.region);
        opt("aws.instance-id", &meta.instance_id);
        opt("aws.instance-type", &meta.instance_type);
        opt("aws.network.ipv4.private", &meta.private_ipv4);
        opt("aws.network.ipv4.public", &meta.public_ipv4);
        opt("aws.network.hostname.private", &meta.private_hostname);
        opt("aws.network.hostname.public", &meta.public_hostname);

        for nic in &meta.nics {
            let base = format!("aws.network.nics.{}", nic.mac);
            let mut opt = |suffix: &str, value: &Option<String>| {
                if let Some(v) = value {
                    out.insert(format!("{}.{}", base, suffix), json!(v));
                }
            };
            opt("id", &nic.id);
            opt("subnet.id", &nic.subnet_id);
            opt("subnet.ipv4", &nic.subnet_ipv4);
            opt("vpc.id", &nic.vpc_id);
            opt("vpc.ipv4", &nic.vpc_ipv4);
            opt("hostname.private", &nic.private_hostname);
            opt("hostname.public", &nic.public_hostname);
            out.insert(
                format!("{}.security-groups", base),
                json!(nic.security_groups),
            );
            out.insert(format!("{}.ipv4.private", base), json!(nic.private_ipv4s));
            out.insert(format!("{}.ipv4.public", base), json!(nic.public_ipv4s));
        }
    }

    let mut role = |key: &str, device: &Option<crate::network::DeviceRole>| {
        if let Some(d) = device {
            out.insert(format!("{}.dev", key), json!(d.dev));
            out.insert(format!("{}.ip", key), json!(d.ip.to_string()));
            out.insert(format!("{}.netmask", key), json!(d.netmask.to_string()));
            if let Some(raw) = &d.raw_dev {
                out.insert(format!("{}.raw-dev", key), json!(raw));
            }
            if let Some(gw) = &d.gateway {
                out.insert(format!("{}.gateway", key), json!(gw));
            }
        }
    };
    role("network.devices.private.primary", &facts.devices.private_primary);
    role(
        "network.devices.private.secondary",
        &facts.devices.private_secondary,
    );
    role("network.devices.public.primary", &facts.devices.public_primary);
    out.insert(
        "network.devices.public.primary.mode".to_string(),
        json!(facts.devices.public_mode.to_string()),
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{DeviceRole, PublicMode};
    use crate::virt::VirtEngine;

    fn sample_facts() -> HostFacts {
        HostFacts {
            metadata: Some(InstanceMetadata {
                availability_zone: Some("eu-west-1a".into()),
                region: Some("eu-west-1".into()),
                instance_id: Some("i-0123".into()),
                private_ipv4: Some("10.0.0.5".into()),
                public_ipv4: Some("203.0.113.7".into()),
                ..Default::default()
            }),
            interfaces: Vec::new(),
            devices: NetworkDevices {
                private_primary: Some(DeviceRole {
                    dev: "eth0".into(),
                    raw_dev: None,
                    ip: "10.0.0.5".parse().unwrap(),
                    netmask: "255.255.255.0".parse().unwrap(),
                    gateway: Some("10.0.0.1".into()),
                }),
                private_secondary: None,
                public_primary: Some(DeviceRole {
                    dev: "eth0".into(),
                    raw_dev: None,
                    ip: "10.0.0.5".parse().unwrap(),
                    netmask: "255.255.255.0".parse().unwrap(),
                    gateway: Some("10.0.0.1".into()),
                }),
                public_mode: PublicMode::Nat,
            },
            virtualization: Virtualization {
                engine: Some(VirtEngine::Kvm),
            },
        }
    }

    #[test]
    fn flat_keys_cover_roles_and_metadata() {
        let flat = flatten(&sample_facts());
        assert_eq!(flat.get("general.type"), Some(&json!("virtual")));
        assert_eq!(flat.get("general.virtualization"), Some(&json!("kvm")));
        assert_eq!(flat.get("aws.region"), Some(&json!("eu-west-1")));
        assert_eq!(
            flat.get("network.devices.private.primary.dev"),
            Some(&json!("eth0"))
        );
        assert_eq!(
            flat.get("network.devices.public.primary.mode"),
            Some(&json!("nat"))
        );
        // nothing was enumerated for the secondary slot
        assert!(!flat.contains_key("network.devices.private.secondary.dev"));
    }

    #[test]
    fn physical_host_without_metadata_still_has_general_facts() {
        let facts = HostFacts {
            metadata: None,
            interfaces: Vec::new(),
            devices: NetworkDevices::default(),
            virtualization: Virtualization::default(),
        };
        let flat = flatten(&facts);
        assert_eq!(flat.get("general.type"), Some(&json!("physical")));
        assert_eq!(flat.get("general.virtualization"), Some(&json!("none")));
        assert!(!flat.contains_key("aws.region"));
    }
}
