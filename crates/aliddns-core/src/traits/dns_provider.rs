// # DNS Provider Client Trait
//
// Defines the three record operations the worker consumes from the DNS
// provider: describe, add and update of A records.
//
// Request signing, transport and response parsing belong to the
// implementation. The worker only inspects `has_error`, `message` and the
// returned records.
//
// ## Usage
//
// ```rust,ignore
// use aliddns_core::{DnsProviderClient, RECORD_TYPE_A};
//
// let described = provider
//     .describe_records("example.com", "home", RECORD_TYPE_A)
//     .await?;
// for record in described.records {
//     println!("{} -> {}", record.record_id, record.value);
// }
// ```

use async_trait::async_trait;

/// The only record type this worker manages
pub const RECORD_TYPE_A: &str = "A";

/// A record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Provider-assigned identity (opaque)
    pub record_id: String,
    /// Current record value (an IPv4 string for A records)
    pub value: String,
    /// Record type, always [`RECORD_TYPE_A`] here
    pub record_type: String,
}

impl DomainRecord {
    /// Create an A record
    pub fn a(record_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            value: value.into(),
            record_type: RECORD_TYPE_A.to_string(),
        }
    }
}

/// Response to a describe call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeRecordsResponse {
    /// Provider reported a failure
    pub has_error: bool,
    /// Provider message (error description when `has_error`)
    pub message: String,
    /// Matching records; may be empty or hold more than one entry
    pub records: Vec<DomainRecord>,
}

impl DescribeRecordsResponse {
    /// A successful lookup returning `records`
    pub fn found(records: Vec<DomainRecord>) -> Self {
        Self {
            has_error: false,
            message: String::new(),
            records,
        }
    }

    /// A lookup the provider rejected
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            has_error: true,
            message: message.into(),
            records: Vec::new(),
        }
    }
}

/// Response to an add or update call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    /// Provider reported a failure
    pub has_error: bool,
    /// Provider message (error description when `has_error`)
    pub message: String,
}

impl ProviderResponse {
    /// A successful mutation
    pub fn success() -> Self {
        Self::default()
    }

    /// A mutation the provider rejected
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            has_error: true,
            message: message.into(),
        }
    }
}

/// Trait for DNS provider clients
///
/// # Contract
///
/// Implementations are stateless single-shot API wrappers:
/// - One API call per method invocation, no retries or backoff
/// - No decision about whether a change is needed (owned by the worker)
/// - Provider-side rejections are reported through `has_error`
/// - `Err` means the call could not be completed or understood (network
///   failure, malformed payload); the worker abandons the tick
///
/// Implementations must be thread-safe: overlapping ticks may call them
/// concurrently.
#[async_trait]
pub trait DnsProviderClient: Send + Sync {
    /// List records whose host is `rr` under `domain_name`
    async fn describe_records(
        &self,
        domain_name: &str,
        rr: &str,
        record_type: &str,
    ) -> Result<DescribeRecordsResponse, crate::Error>;

    /// Create a record `rr` under `domain_name` with `value`
    async fn add_record(
        &self,
        domain_name: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Point the record `record_id` at `value`
    async fn update_record(
        &self,
        record_id: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}
