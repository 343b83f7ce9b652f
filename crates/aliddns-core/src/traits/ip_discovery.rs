// # IP Discovery Client Trait
//
// Defines the single capability the worker needs to learn its public IP:
// a plain GET whose body is scanned for an IPv4 literal.
//
// ## Implementations
//
// - reqwest-based: `aliddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use aliddns_core::IpDiscoveryClient;
//
// let response = client.get("https://api.ipify.org").await?;
// if response.ok {
//     println!("body: {}", response.body);
// }
// ```

use async_trait::async_trait;

/// Outcome of one discovery GET
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// `false` on any transport or non-success status failure
    pub ok: bool,
    /// Response body, scanned for the first IPv4 literal
    pub body: String,
}

impl FetchResponse {
    /// A successful response carrying `body`
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            ok: true,
            body: body.into(),
        }
    }

    /// A failed response
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Trait for public IP discovery clients
///
/// # Contract
///
/// - One GET per call, no retries (the worker's next tick is the retry)
/// - Transport and HTTP status failures are reported as `ok == false`
/// - `Err` is reserved for failures the client cannot classify; it ends the
///   current tick
/// - Timeouts are the implementation's concern; the worker imposes none
#[async_trait]
pub trait IpDiscoveryClient: Send + Sync {
    /// Issue a GET against `url`
    async fn get(&self, url: &str) -> Result<FetchResponse, crate::Error>;
}
