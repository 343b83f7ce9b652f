//! One reconciliation pass
//!
//! ```text
//!  discover IP ──miss──▶ NoIpDiscovered
//!      │
//!      ▼
//!  describe records ──has_error──▶ DescribeFailed
//!      │
//!      ├── none ──▶ add ──▶ Added | AddFailed
//!      │
//!      └── each record ──▶ value == ip ──▶ Unchanged
//!                          otherwise   ──▶ update ──▶ Updated | UpdateFailed
//! ```
//!
//! Every pass starts from scratch: the IP is re-discovered and the records
//! re-described. Nothing is carried between passes.

use crate::config::WorkerConfig;
use crate::discovery::discover_public_ip;
use crate::error::Result;
use crate::traits::{DnsProviderClient, IpDiscoveryClient, RECORD_TYPE_A};
use tracing::{debug, info, warn};

/// What one pass did, one entry per affected record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// No discovery URL produced an IPv4 address; no provider call was made
    NoIpDiscovered,
    /// The provider rejected the describe call; nothing was mutated
    DescribeFailed(String),
    /// No record existed and one was created
    Added(String),
    /// No record existed and the add call was rejected
    AddFailed(String),
    /// The record already pointed at the discovered IP
    Unchanged(String),
    /// The record was pointed at the discovered IP
    Updated {
        record_id: String,
        ip: String,
    },
    /// The update call for the record was rejected
    UpdateFailed {
        record_id: String,
        reason: String,
    },
    /// A collaborator failed unexpectedly; the rest of the pass was skipped
    Aborted(String),
}

/// Run one full reconciliation pass
///
/// Never fails: collaborator errors are logged and reported as
/// [`ReconciliationOutcome::Aborted`] after whatever outcomes were already
/// produced.
pub async fn reconcile(
    config: &WorkerConfig,
    ip_client: &dyn IpDiscoveryClient,
    provider: &dyn DnsProviderClient,
) -> Vec<ReconciliationOutcome> {
    let mut outcomes = Vec::new();

    if let Err(e) = try_reconcile(config, ip_client, provider, &mut outcomes).await {
        warn!("[{}] do work exception: {}", config.name, e);
        outcomes.push(ReconciliationOutcome::Aborted(e.to_string()));
    }

    outcomes
}

async fn try_reconcile(
    config: &WorkerConfig,
    ip_client: &dyn IpDiscoveryClient,
    provider: &dyn DnsProviderClient,
    outcomes: &mut Vec<ReconciliationOutcome>,
) -> Result<()> {
    let name = config.name.as_str();

    let Some(real_ip) = discover_public_ip(name, ip_client, &config.ip_discovery_urls).await?
    else {
        info!("[{}] fetch real internet ip all failed, skip", name);
        outcomes.push(ReconciliationOutcome::NoIpDiscovered);
        return Ok(());
    };

    debug!(
        "[{}] describing {} records for {} via {}",
        name,
        RECORD_TYPE_A,
        config.record_fqdn(),
        provider.provider_name()
    );
    let described = provider
        .describe_records(&config.domain_name, &config.sub_domain_name, RECORD_TYPE_A)
        .await?;
    if described.has_error {
        info!(
            "[{}] describe domain records fail ( {} ), skip",
            name, described.message
        );
        outcomes.push(ReconciliationOutcome::DescribeFailed(described.message));
        return Ok(());
    }

    if described.records.is_empty() {
        info!("[{}] prepare to add domain record ...", name);
        let added = provider
            .add_record(
                &config.domain_name,
                &config.sub_domain_name,
                RECORD_TYPE_A,
                &real_ip,
            )
            .await?;
        if added.has_error {
            info!("[{}] add domain record fail ( {} ), skip", name, added.message);
            outcomes.push(ReconciliationOutcome::AddFailed(added.message));
        } else {
            info!("[{}] add domain record ok, now record value is {}", name, real_ip);
            outcomes.push(ReconciliationOutcome::Added(real_ip));
        }
        return Ok(());
    }

    // A host may carry more than one A record; each is reconciled
    for record in described.records {
        if record.value == real_ip {
            info!("[{}] ip not changed ( {} ), skip", name, record.record_id);
            outcomes.push(ReconciliationOutcome::Unchanged(record.record_id));
            continue;
        }

        info!(
            "[{}] prepare to update domain record {} ( {} -> {} ) ...",
            name, record.record_id, record.value, real_ip
        );
        let updated = provider
            .update_record(
                &record.record_id,
                &config.sub_domain_name,
                RECORD_TYPE_A,
                &real_ip,
            )
            .await?;
        if updated.has_error {
            info!(
                "[{}] update domain record fail ( {} ), skip",
                name, updated.message
            );
            outcomes.push(ReconciliationOutcome::UpdateFailed {
                record_id: record.record_id,
                reason: updated.message,
            });
        } else {
            info!(
                "[{}] update domain record ok, now record value is {}",
                name, real_ip
            );
            outcomes.push(ReconciliationOutcome::Updated {
                record_id: record.record_id,
                ip: real_ip.clone(),
            });
        }
    }

    Ok(())
}
