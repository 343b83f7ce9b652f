//! Capability interfaces consumed by the worker
//!
//! - [`IpDiscoveryClient`]: GET an endpoint that echoes the caller's IP
//! - [`DnsProviderClient`]: describe, add and update A records

pub mod ip_discovery;
pub mod dns_provider;

pub use ip_discovery::{IpDiscoveryClient, FetchResponse};
pub use dns_provider::{
    DnsProviderClient, DomainRecord, DescribeRecordsResponse, ProviderResponse, RECORD_TYPE_A,
};
