//! Network interface enumeration and role classification
//!
//! Enumerates host NICs (via `ip -json`), keeps the ethernet-like ones,
//! and elects primary/secondary private and public devices from the
//! unordered set: a forced override wins, then the default-route holder,
//! then the first interface in name order. The public primary falls back
//! to the private primary on hosts with no public address, with
//! `mode: nat` when instance metadata shows a distinct public IPv4 on a
//! single NIC.

use crate::error::{FactsError, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::process::Stdio;
use tokio::process::Command;

const NIC_ETHERNET_PREFIX: &[&str] = &[
    "en", "eth", "vlan", "macvlan", "ipvlan", "ipvl", "bond", "br", "wan", "lan",
];
const NIC_ETHERNET_PREFIX_BLACKLIST: &[&str] = &["docker", "br-"];

/// One enumerated host interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceFacts {
    pub name: String,
    pub hw: Option<String>,
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub private: bool,
    pub gateway: Option<String>,
    pub default_route: bool,
    pub vlan_dev: Option<String>,
    pub vlan_id: Option<u16>,
}

/// Role assignment for one elected device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRole {
    pub dev: String,
    /// Underlying device for VLAN interfaces.
    pub raw_dev: Option<String>,
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Option<String>,
}

impl DeviceRole {
    fn from_interface(iface: &InterfaceFacts) -> Self {
        Self {
            dev: iface.name.clone(),
            raw_dev: iface.vlan_dev.clone(),
            ip: iface.ip,
            netmask: iface.netmask,
            gateway: iface.gateway.clone(),
        }
    }
}

/// How the public side reaches the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicMode {
    #[default]
    Direct,
    Nat,
}

impl std::fmt::Display for PublicMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublicMode::Direct => write!(f, "direct"),
            PublicMode::Nat => write!(f, "nat"),
        }
    }
}

/// Elected device roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDevices {
    pub private_primary: Option<DeviceRole>,
    pub private_secondary: Option<DeviceRole>,
    pub public_primary: Option<DeviceRole>,
    pub public_mode: PublicMode,
}

/// Operator overrides for the election.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    pub forced_primary_private: Option<String>,
    pub forced_secondary_private: Option<String>,
    pub forced_primary_public: Option<String>,
    /// Metadata says a distinct public IPv4 is NAT'd onto this host.
    pub nat_hint: bool,
}

/// Whether an interface name looks like a role-eligible ethernet device.
fn is_ethernet_like(name: &str) -> bool {
    if NIC_ETHERNET_PREFIX_BLACKLIST
        .iter()
        .any(|b| name.starts_with(b))
    {
        return false;
    }
    NIC_ETHERNET_PREFIX.iter().any(|p| name.starts_with(p))
}

fn prefix_to_netmask(prefixlen: u8) -> Ipv4Addr {
    let bits: u32 = if prefixlen == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefixlen.min(32)))
    };
    Ipv4Addr::from(bits)
}

/// Parse `/proc/net/vlan/<iface>` into (underlying device, VLAN id).
fn parse_vlan_config(contents: &str) -> Option<(String, u16)> {
    let mut dev = None;
    let mut id = None;
    for line in contents.lines() {
        if let Some(rest) = line.trim().strip_prefix("Device: ") {
            dev = Some(rest.trim().to_string());
        } else if let Some(idx) = line.find("VID:") {
            id = line[idx + 4..]
                .trim()
                .split_whitespace()
                .next()
                .and_then(|v| v.parse().ok());
        }
    }
    Some((dev?, id?))
}

#[derive(Debug, Deserialize)]
struct IpAddrEntry {
    ifname: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    addr_info: Vec<IpAddrInfo>,
}

#[derive(Debug, Deserialize)]
struct IpAddrInfo {
    family: String,
    local: String,
    prefixlen: u8,
}

#[derive(Debug, Deserialize)]
struct IpRouteEntry {
    #[serde(default)]
    gateway: Option<String>,
    #[serde(default)]
    dev: Option<String>,
}

async fn run_ip(args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("ip");
    cmd.arg("-json");
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Running: ip -json {}", args.join(" "));

    let output = cmd.output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FactsError::CommandFailed(stderr.to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Enumerate ethernet-like interfaces with an IPv4 address, in name
/// order.
pub async fn enumerate() -> Result<Vec<InterfaceFacts>> {
    let addrs: Vec<IpAddrEntry> = serde_json::from_str(&run_ip(&["addr", "show"]).await?)?;
    let routes: Vec<IpRouteEntry> =
        serde_json::from_str(&run_ip(&["route", "show", "default"]).await?)?;

    let mut interfaces = Vec::new();
    for entry in addrs {
        if !is_ethernet_like(&entry.ifname) {
            continue;
        }
        let Some(inet) = entry.addr_info.iter().find(|a| a.family == "inet") else {
            continue;
        };
        let Ok(ip) = inet.local.parse::<Ipv4Addr>() else {
            continue;
        };

        let route = routes
            .iter()
            .find(|r| r.dev.as_deref() == Some(entry.ifname.as_str()));

        let (vlan_dev, vlan_id) = if entry.ifname.contains('.') || entry.ifname.starts_with("vlan")
        {
            std::fs::read_to_string(format!("/proc/net/vlan/{}", entry.ifname))
                .ok()
                .and_then(|c| parse_vlan_config(&c))
                .map(|(dev, id)| (Some(dev), Some(id)))
                .unwrap_or((None, None))
        } else {
            (None, None)
        };

        interfaces.push(InterfaceFacts {
            name: entry.ifname,
            hw: entry.address,
            ip,
            netmask: prefix_to_netmask(inet.prefixlen),
            private: ip.is_private(),
            gateway: route.and_then(|r| r.gateway.clone()),
            default_route: route.is_some(),
            vlan_dev,
            vlan_id,
        });
    }

    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(interfaces)
}

/// Elect one interface from `candidates`: forced override first, then
/// the default-route holder, then the first one left.
fn elect(candidates: &mut Vec<&InterfaceFacts>, forced: Option<&str>) -> Option<DeviceRole> {
    if let Some(name) = forced {
        if let Some(pos) = candidates.iter().position(|i| i.name == name) {
            return Some(DeviceRole::from_interface(candidates.remove(pos)));
        }
    }
    if let Some(pos) = candidates.iter().position(|i| i.default_route) {
        return Some(DeviceRole::from_interface(candidates.remove(pos)));
    }
    if candidates.is_empty() {
        None
    } else {
        Some(DeviceRole::from_interface(candidates.remove(0)))
    }
}

/// Classify enumerated interfaces into device roles.
pub fn classify(interfaces: &[InterfaceFacts], options: &ClassifyOptions) -> NetworkDevices {
    let mut devices = NetworkDevices::default();

    let mut private: Vec<&InterfaceFacts> = interfaces.iter().filter(|i| i.private).collect();
    devices.private_primary = elect(&mut private, options.forced_primary_private.as_deref());
    if !private.is_empty() {
        devices.private_secondary = if let Some(name) = options.forced_secondary_private.as_deref()
        {
            private
                .iter()
                .position(|i| i.name == name)
                .map(|pos| DeviceRole::from_interface(private.remove(pos)))
                .or_else(|| Some(DeviceRole::from_interface(private.remove(0))))
        } else {
            Some(DeviceRole::from_interface(private.remove(0)))
        };
    }

    // a forced public override wins even when the named interface carries
    // a private address
    let mut public: Vec<&InterfaceFacts> = interfaces.iter().filter(|i| !i.private).collect();
    devices.public_primary = options
        .forced_primary_public
        .as_deref()
        .and_then(|name| interfaces.iter().find(|i| i.name == name))
        .map(DeviceRole::from_interface)
        .or_else(|| elect(&mut public, None));

    // hosts with no public address route out through the private primary
    if devices.public_primary.is_none() {
        devices.public_primary = devices.private_primary.clone();
    }

    devices.public_mode = if options.nat_hint {
        PublicMode::Nat
    } else {
        PublicMode::Direct
    };

    devices
}
