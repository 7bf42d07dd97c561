//! EC2 instance metadata collection
//!
//! Scrapes the instance metadata service (IMDS) for placement, identity,
//! and per-NIC network facts. A host that is not an EC2 instance is not
//! an error: the probe times out quickly and detection yields `None`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const METADATA_URL: &str = "http://169.254.169.254/latest";

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Client for the instance metadata service.
pub struct ImdsClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImdsClient {
    pub fn new() -> Self {
        Self::with_base_url(METADATA_URL)
    }

    /// Point the client at a different base URL (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Whether the metadata service answers at all.
    pub async fn probe(&self) -> bool {
        self.client
            .get(&self.base_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    /// Fetch a meta-data path as text; non-200 yields `None`.
    async fn text(&self, path: &str) -> Option<String> {
        self.fetch(&format!("{}/meta-data{}", self.base_url, path))
            .await
    }

    /// Fetch a dynamic-data path and parse it as JSON.
    async fn dynamic_json(&self, path: &str) -> Option<serde_json::Value> {
        let body = self
            .fetch(&format!("{}/dynamic{}", self.base_url, path))
            .await?;
        serde_json::from_str(&body).ok()
    }

    async fn fetch(&self, url: &str) -> Option<String> {
        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }
}

impl Default for ImdsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Network facts for one elastic network interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NicMetadata {
    pub mac: String,
    pub id: Option<String>,
    pub subnet_id: Option<String>,
    pub subnet_ipv4: Option<String>,
    pub vpc_id: Option<String>,
    pub vpc_ipv4: Option<String>,
    pub security_groups: Vec<String>,
    pub private_hostname: Option<String>,
    pub public_hostname: Option<String>,
    pub private_ipv4s: Vec<String>,
    pub public_ipv4s: Vec<String>,
}

/// Instance-level metadata facts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub availability_zone: Option<String>,
    pub region: Option<String>,
    pub instance_id: Option<String>,
    pub instance_type: Option<String>,
    pub private_ipv4: Option<String>,
    pub public_ipv4: Option<String>,
    pub private_hostname: Option<String>,
    pub public_hostname: Option<String>,
    pub nics: Vec<NicMetadata>,
}

impl InstanceMetadata {
    /// A single NIC carrying a distinct public address means the public
    /// side is NAT'd rather than directly attached.
    pub fn nat_hint(&self) -> bool {
        match (&self.private_ipv4, &self.public_ipv4) {
            (Some(private), Some(public)) => !public.is_empty() && private != public,
            _ => false,
        }
    }
}

/// Collect instance metadata, or `None` when the host is not an EC2
/// instance.
pub async fn detect(imds: &ImdsClient) -> Result<Option<InstanceMetadata>> {
    if !imds.probe().await {
        tracing::debug!("metadata service unreachable, skipping EC2 facts");
        return Ok(None);
    }

    let mut meta = InstanceMetadata {
        availability_zone: imds.text("/placement/availability-zone").await,
        region: None,
        instance_id: imds.text("/instance-id").await,
        instance_type: imds.text("/instance-type").await,
        private_ipv4: imds.text("/local-ipv4").await,
        public_ipv4: imds.text("/public-ipv4").await,
        private_hostname: None,
        public_hostname: None,
        nics: Vec::new(),
    };

    if let Some(identity) = imds.dynamic_json("/instance-identity/document").await {
        meta.region = identity
            .get("region")
            .and_then(|v| v.as_str())
            .map(str::to_owned);
    }

    let macs: Vec<String> = imds
        .text("/network/interfaces/macs")
        .await
        .unwrap_or_default()
        .lines()
        .map(|line| line.trim_end_matches('/').to_string())
        .filter(|mac| !mac.is_empty())
        .collect();

    if let Some(first) = macs.first() {
        let base = format!("/network/interfaces/macs/{}", first);
        meta.private_hostname = imds.text(&format!("{}/local-hostname", base)).await;
        meta.public_hostname = imds.text(&format!("{}/public-hostname", base)).await;
    }

    for mac in macs {
        let base = format!("/network/interfaces/macs/{}", mac);
        let lines = |text: Option<String>| -> Vec<String> {
            text.unwrap_or_default()
                .lines()
                .map(str::to_owned)
                .filter(|l| !l.is_empty())
                .collect()
        };
        let nic = NicMetadata {
            id: imds.text(&format!("{}/interface-id", base)).await,
            subnet_id: imds.text(&format!("{}/subnet-id", base)).await,
            subnet_ipv4: imds.text(&format!("{}/subnet-ipv4-cidr-block", base)).await,
            vpc_id: imds.text(&format!("{}/vpc-id", base)).await,
            vpc_ipv4: imds.text(&format!("{}/vpc-ipv4-cidr-block", base)).await,
            security_groups: lines(imds.text(&format!("{}/security-groups", base)).await),
            private_hostname: imds.text(&format!("{}/local-hostname", base)).await,
            public_hostname: imds.text(&format!("{}/public-hostname", base)).await,
            private_ipv4s: lines(imds.text(&format!("{}/local-ipv4s", base)).await),
            public_ipv4s: lines(imds.text(&format!("{}/public-ipv4s", base)).await),
            mac,
        };
        meta.nics.push(nic);
    }

    Ok(Some(meta))
}
