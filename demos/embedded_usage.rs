//! Minimal embedding example for aliddns-core
//!
//! Runs one reconciliation worker per configured record against an
//! in-memory DNS provider, discovering the public IP over real HTTP. The
//! application owns the runtime and the worker lifecycle.
//!
//! ## Configuration
//!
//! - `DDNS_CONFIG`: path to a JSON file with a `workers` array
//! - otherwise `DDNS_DOMAIN_NAME` (default example.com),
//!   `DDNS_SUB_DOMAIN_NAME` (default home), `DDNS_INTERVAL_MINUTES`
//!   (default 5) describe a single worker
//! - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)

use aliddns_core::traits::{
    DescribeRecordsResponse, DnsProviderClient, DomainRecord, ProviderResponse,
};
use aliddns_core::{DdnsConfig, ReconciliationWorker, Result, WorkerConfig};
use aliddns_ip_http::HttpIpDiscovery;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// In-memory zone standing in for a real DNS provider
#[derive(Default)]
struct InMemoryProvider {
    records: Mutex<Vec<(String, String, DomainRecord)>>,
    next_id: AtomicUsize,
}

#[async_trait::async_trait]
impl DnsProviderClient for InMemoryProvider {
    async fn describe_records(
        &self,
        domain_name: &str,
        rr: &str,
        record_type: &str,
    ) -> Result<DescribeRecordsResponse> {
        let records = self
            .records
            .lock()
            .await
            .iter()
            .filter(|(domain, host, record)| {
                domain == domain_name && host == rr && record.record_type == record_type
            })
            .map(|(_, _, record)| record.clone())
            .collect();
        Ok(DescribeRecordsResponse::found(records))
    }

    async fn add_record(
        &self,
        domain_name: &str,
        rr: &str,
        _record_type: &str,
        value: &str,
    ) -> Result<ProviderResponse> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.records.lock().await.push((
            domain_name.to_string(),
            rr.to_string(),
            DomainRecord::a(format!("mem-{}", id), value),
        ));
        Ok(ProviderResponse::success())
    }

    async fn update_record(
        &self,
        record_id: &str,
        _rr: &str,
        _record_type: &str,
        value: &str,
    ) -> Result<ProviderResponse> {
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|(_, _, r)| r.record_id == record_id) {
            Some((_, _, record)) => {
                record.value = value.to_string();
                Ok(ProviderResponse::success())
            }
            None => Ok(ProviderResponse::error(format!(
                "DomainRecordNotBelongToUser: {}",
                record_id
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Load the configuration from `DDNS_CONFIG` or the single-worker variables
fn load_config() -> anyhow::Result<DdnsConfig> {
    if let Ok(path) = env::var("DDNS_CONFIG") {
        return Ok(DdnsConfig::from_file(&path)?);
    }

    let domain = env::var("DDNS_DOMAIN_NAME").unwrap_or_else(|_| "example.com".to_string());
    let sub_domain = env::var("DDNS_SUB_DOMAIN_NAME").unwrap_or_else(|_| "home".to_string());
    let interval = match env::var("DDNS_INTERVAL_MINUTES") {
        Ok(s) => s.parse()?,
        Err(_) => 5,
    };

    Ok(DdnsConfig {
        workers: vec![
            WorkerConfig::new("embedded", domain, sub_domain)
                .with_credentials("in-memory", "in-memory")
                .with_interval_minutes(interval),
        ],
    })
}

fn main() -> ExitCode {
    let config = match load_config().and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(1);
        }
    };

    let log_level = match env::var("DDNS_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::from(1);
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match rt.block_on(run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Demo error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(config: DdnsConfig) -> anyhow::Result<()> {
    let ip_client = Arc::new(HttpIpDiscovery::try_with_timeout(Duration::from_secs(10))?);
    let provider = Arc::new(InMemoryProvider::default());

    let workers: Vec<ReconciliationWorker> = config
        .workers
        .into_iter()
        .map(|worker| ReconciliationWorker::new(worker, ip_client.clone(), provider.clone()))
        .collect();

    for worker in &workers {
        info!(
            "Managing {} every {} minute(s)",
            worker.config().record_fqdn(),
            worker.config().interval_minutes
        );
        worker.run();
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    for worker in &workers {
        worker.stop();
        worker.dispose();
    }

    for (domain, rr, record) in provider.records.lock().await.iter() {
        info!("{}.{} {} {}", rr, domain, record.record_type, record.value);
    }

    Ok(())
}
