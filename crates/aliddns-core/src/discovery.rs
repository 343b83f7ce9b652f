//! Public IPv4 discovery with ordered fallback
//!
//! Each configured URL is fetched in turn and its body scanned for the first
//! IPv4 literal. The first URL that yields one wins; later URLs are never
//! contacted.
//!
//! The pattern is deliberately asymmetric: the first three octets accept a
//! bare `0`, the last one does not. An address ending in `.0` is therefore a
//! miss for that source. There is no boundary check either, so
//! `1.2.3.256` is read as `1.2.3.25`.

use crate::error::Result;
use crate::traits::IpDiscoveryClient;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

/// IPv4 literal pattern used to scan discovery response bodies
pub const IPV4_PATTERN: &str =
    r"((25[0-5]|2[0-4]\d|1\d\d|[1-9]\d|\d)\.){3}(25[0-5]|2[0-4]\d|1\d\d|[1-9]\d|[1-9])";

lazy_static! {
    static ref IPV4_RE: Regex = Regex::new(IPV4_PATTERN).unwrap();
}

/// Return the first IPv4 literal in `body`, if any
pub fn find_ipv4(body: &str) -> Option<&str> {
    IPV4_RE.find(body).map(|m| m.as_str())
}

/// Walk `urls` in order and return the first IPv4 address found
///
/// # Returns
///
/// - `Ok(Some(ip))`: the first source that answered with a matching body
/// - `Ok(None)`: every source failed or none matched
/// - `Err(Error)`: the client hit an unexpected failure; remaining URLs are
///   not tried
pub async fn discover_public_ip(
    name: &str,
    client: &dyn IpDiscoveryClient,
    urls: &[String],
) -> Result<Option<String>> {
    for url in urls {
        let response = client.get(url).await?;
        if response.ok {
            if let Some(ip) = find_ipv4(&response.body) {
                info!(
                    "[{}] fetch real internet ip from ( {} ) success, current ip is ( {} )",
                    name, url, ip
                );
                return Ok(Some(ip.to_string()));
            }
        }
        info!("[{}] fetch real internet ip from {} fail, try next url", name, url);
    }

    Ok(None)
}
