// # aliddns-core
//
// Core library for the aliddns reconciliation worker.
//
// ## Architecture Overview
//
// This library keeps one DNS A record pointed at the public IPv4 address of
// the host it runs on:
// - **IpDiscoveryClient**: Trait for the GET used to learn the public IP
// - **DnsProviderClient**: Trait for describing, adding and updating A records
// - **discovery**: Ordered fallback over discovery URLs with an IPv4 scan
// - **reconcile**: One add / update / skip pass against the provider
// - **Schedule**: Repeating timer whose period the callback may rewrite
// - **ReconciliationWorker**: Run/stop lifecycle driving passes on a schedule
//
// ## Design Principles
//
// 1. **Collaborators behind traits**: Provider protocol and HTTP transport live
//    outside the core
// 2. **Never stop ticking**: No error from a pass reaches the schedule
// 3. **Stateless passes**: Each tick re-discovers and re-describes from scratch
// 4. **Library-First**: Embedders own the runtime and the worker lifecycle

pub mod traits;
pub mod discovery;
pub mod reconcile;
pub mod schedule;
pub mod worker;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{
    DescribeRecordsResponse, DnsProviderClient, DomainRecord, FetchResponse, IpDiscoveryClient,
    ProviderResponse, RECORD_TYPE_A,
};
pub use discovery::{discover_public_ip, find_ipv4};
pub use reconcile::{ReconciliationOutcome, reconcile};
pub use schedule::{Schedule, SchedulePeriod};
pub use worker::{INITIAL_PERIOD, ReconciliationWorker};
pub use config::{DdnsConfig, WorkerConfig};
pub use error::{Error, Result};
