//! Configuration types for the aliddns worker
//!
//! A [`WorkerConfig`] describes one managed record. A [`DdnsConfig`] groups the
//! workers hosted by a single process and can be loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Default public IP echo services, tried in order
pub const DEFAULT_IP_DISCOVERY_URLS: &[&str] = &[
    "https://api.ipify.org",  // plain text IP
    "https://ifconfig.me/ip", // plain text IP
    "https://icanhazip.com",  // plain text IP, trailing newline
];

/// Configuration of a single reconciliation worker
///
/// Field names follow the JSON shape `name`, `accessKeyId`,
/// `accessKeySecret`, `domainName`, `subDomainName`, `interval`, `getIpUrls`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Label used in logs
    pub name: String,

    /// Provider access key id
    pub access_key_id: String,

    /// Provider access key secret
    /// ⚠️ NEVER log this value
    pub access_key_secret: String,

    /// Zone the record lives in (e.g. "example.com")
    pub domain_name: String,

    /// Host record under the zone (e.g. "home" for home.example.com)
    pub sub_domain_name: String,

    /// Steady-state poll period in minutes
    #[serde(
        rename = "interval",
        alias = "intervalMinutes",
        default = "default_interval_minutes"
    )]
    pub interval_minutes: u64,

    /// Ordered endpoints used to discover the public IP
    #[serde(
        rename = "getIpUrls",
        alias = "ipDiscoveryUrls",
        default = "default_ip_discovery_urls"
    )]
    pub ip_discovery_urls: Vec<String>,
}

impl WorkerConfig {
    /// Create a worker configuration with the default interval and discovery URLs
    pub fn new(
        name: impl Into<String>,
        domain_name: impl Into<String>,
        sub_domain_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            domain_name: domain_name.into(),
            sub_domain_name: sub_domain_name.into(),
            interval_minutes: default_interval_minutes(),
            ip_discovery_urls: default_ip_discovery_urls(),
        }
    }

    /// Set the provider credentials
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        self.access_key_id = access_key_id.into();
        self.access_key_secret = access_key_secret.into();
        self
    }

    /// Set the steady-state interval
    pub fn with_interval_minutes(mut self, interval_minutes: u64) -> Self {
        self.interval_minutes = interval_minutes;
        self
    }

    /// Replace the discovery URL list
    pub fn with_ip_discovery_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ip_discovery_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Fully qualified record name, `sub_domain_name.domain_name`
    pub fn record_fqdn(&self) -> String {
        format!("{}.{}", self.sub_domain_name, self.domain_name)
    }

    /// Period between ticks once the worker has fired for the first time
    pub fn steady_interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Validate the worker configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::config("Worker name cannot be empty"));
        }

        let required = [
            ("accessKeyId", &self.access_key_id),
            ("accessKeySecret", &self.access_key_secret),
            ("domainName", &self.domain_name),
            ("subDomainName", &self.sub_domain_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "[{}] {} cannot be empty",
                    self.name, field
                )));
            }
        }

        if self.interval_minutes == 0 {
            return Err(crate::Error::config(format!(
                "[{}] interval must be > 0",
                self.name
            )));
        }

        if self.ip_discovery_urls.is_empty() {
            return Err(crate::Error::config(format!(
                "[{}] at least one IP discovery URL is required",
                self.name
            )));
        }

        if self.ip_discovery_urls.iter().any(|u| u.trim().is_empty()) {
            return Err(crate::Error::config(format!(
                "[{}] IP discovery URLs cannot be empty",
                self.name
            )));
        }

        Ok(())
    }
}

// Custom Debug implementation that hides the access key secret
impl std::fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("name", &self.name)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("domain_name", &self.domain_name)
            .field("sub_domain_name", &self.sub_domain_name)
            .field("interval_minutes", &self.interval_minutes)
            .field("ip_discovery_urls", &self.ip_discovery_urls)
            .finish()
    }
}

/// Process-level configuration: every worker hosted by one process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// One entry per managed record
    pub workers: Vec<WorkerConfig>,
}

impl DdnsConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate every worker and check that worker names are unique
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.workers.is_empty() {
            return Err(crate::Error::config("No workers configured"));
        }

        let mut names = HashSet::new();
        for worker in &self.workers {
            worker.validate()?;
            if !names.insert(worker.name.as_str()) {
                return Err(crate::Error::config(format!(
                    "Duplicate worker name: {}",
                    worker.name
                )));
            }
        }

        Ok(())
    }
}

fn default_interval_minutes() -> u64 {
    5
}

fn default_ip_discovery_urls() -> Vec<String> {
    DEFAULT_IP_DISCOVERY_URLS
        .iter()
        .map(|u| u.to_string())
        .collect()
}
