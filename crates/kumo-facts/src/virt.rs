//! Virtualization detection
//!
//! Wraps `systemd-detect-virt` and maps its answer onto the supported
//! engine set. Anything unrecognized, including a failed probe, reads as
//! physical hardware.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

const SYSTEMD_DETECT_VIRT: &str = "systemd-detect-virt";

/// Supported virtualization engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtEngine {
    Qemu,
    Kvm,
    Vmware,
    Xen,
    Microsoft,
    Lxc,
}

impl VirtEngine {
    const ALL: &[VirtEngine] = &[
        VirtEngine::Qemu,
        VirtEngine::Kvm,
        VirtEngine::Vmware,
        VirtEngine::Xen,
        VirtEngine::Microsoft,
        VirtEngine::Lxc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VirtEngine::Qemu => "qemu",
            VirtEngine::Kvm => "kvm",
            VirtEngine::Vmware => "vmware",
            VirtEngine::Xen => "xen",
            VirtEngine::Microsoft => "microsoft",
            VirtEngine::Lxc => "lxc",
        }
    }
}

/// Host machine classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Virtualization {
    pub engine: Option<VirtEngine>,
}

impl Virtualization {
    pub fn machine_type(&self) -> &'static str {
        if self.engine.is_some() {
            "virtual"
        } else {
            "physical"
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.map(|e| e.as_str()).unwrap_or("none")
    }
}

/// Map `systemd-detect-virt` output onto a supported engine.
fn parse(output: &str) -> Virtualization {
    let engine = VirtEngine::ALL
        .iter()
        .copied()
        .find(|e| output.trim_start().starts_with(e.as_str()));
    Virtualization { engine }
}

/// Probe the host. A missing tool or unknown engine reads as physical.
pub async fn detect() -> Virtualization {
    let output = Command::new(SYSTEMD_DETECT_VIRT)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await;

    match output {
        Ok(out) => parse(&String::from_utf8_lossy(&out.stdout)),
        Err(_) => {
            tracing::debug!("systemd-detect-virt unavailable, assuming physical host");
            Virtualization::default()
        }
    }
}
