// # HTTP IP Discovery Client
//
// This crate provides the reqwest-backed `IpDiscoveryClient` used by the
// aliddns worker to learn the host's public IP.
//
// ## Contract
//
// - One GET per call, no retries (the worker's next tick is the retry)
// - Transport failures, non-2xx statuses and unreadable bodies are all
//   reported as `ok == false`, never as an error
// - The body is returned as-is; the worker scans it for an IPv4 literal
//
// ## Services
//
// Any endpoint that echoes the caller's address works, plain text or HTML,
// e.g. https://api.ipify.org, https://ifconfig.me/ip, https://icanhazip.com.

use aliddns_core::traits::{FetchResponse, IpDiscoveryClient};
use aliddns_core::{Error, Result};

use std::time::Duration;

/// Default timeout for a discovery GET
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP discovery client
#[derive(Debug, Clone)]
pub struct HttpIpDiscovery {
    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpDiscovery {
    /// Create a client with the default 10 second timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl HttpIpDiscovery {
    /// Create a client with a custom request timeout, failing if the TLS
    /// backend cannot be initialised
    pub fn try_with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Default for HttpIpDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IpDiscoveryClient for HttpIpDiscovery {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("HTTP request to {} failed: {}", url, e);
                return Ok(FetchResponse::failed());
            }
        };

        if !response.status().is_success() {
            tracing::warn!("HTTP error from {}: {}", url, response.status());
            return Ok(FetchResponse::failed());
        }

        match response.text().await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) => {
                tracing::warn!("Failed to read response from {}: {}", url, e);
                Ok(FetchResponse::failed())
            }
        }
    }
}
