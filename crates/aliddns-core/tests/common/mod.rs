//! Test doubles and common utilities for worker contract tests
//!
//! The doubles record every call they receive so tests can assert on call
//! order and count without any network access.

#![allow(dead_code)]

use aliddns_core::error::{Error, Result};
use aliddns_core::traits::{
    DescribeRecordsResponse, DnsProviderClient, DomainRecord, FetchResponse, IpDiscoveryClient,
    ProviderResponse,
};
use aliddns_core::WorkerConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What a scripted URL answers with
#[derive(Debug, Clone)]
pub enum Script {
    Respond(FetchResponse),
    Fail(String),
}

/// An IpDiscoveryClient answering from a per-URL script
///
/// URLs without a script answer `ok == false`.
#[derive(Default)]
pub struct ScriptedIpClient {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedIpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a 2xx response carrying `body`
    pub fn ok(mut self, url: &str, body: &str) -> Self {
        self.scripts
            .insert(url.to_string(), Script::Respond(FetchResponse::ok(body)));
        self
    }

    /// Answer `url` with a failed response
    pub fn failing(mut self, url: &str) -> Self {
        self.scripts
            .insert(url.to_string(), Script::Respond(FetchResponse::failed()));
        self
    }

    /// Make `url` return an unexpected error
    pub fn erroring(mut self, url: &str, message: &str) -> Self {
        self.scripts
            .insert(url.to_string(), Script::Fail(message.to_string()));
        self
    }

    /// URLs requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IpDiscoveryClient for ScriptedIpClient {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.scripts.get(url) {
            Some(Script::Respond(response)) => Ok(response.clone()),
            Some(Script::Fail(message)) => Err(Error::http(message.clone())),
            None => Ok(FetchResponse::failed()),
        }
    }
}

/// One call received by the RecordingProvider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Describe {
        domain_name: String,
        rr: String,
        record_type: String,
    },
    Add {
        domain_name: String,
        rr: String,
        record_type: String,
        value: String,
    },
    Update {
        record_id: String,
        rr: String,
        record_type: String,
        value: String,
    },
}

/// A DnsProviderClient backed by an in-memory record list
///
/// Adds and updates are applied to the list, so a later describe sees them.
pub struct RecordingProvider {
    records: Mutex<Vec<DomainRecord>>,
    describe_error: Mutex<Option<String>>,
    describe_fails: Mutex<Option<String>>,
    describe_delay: Mutex<Option<Duration>>,
    add_error: Mutex<Option<String>>,
    update_errors: Mutex<HashMap<String, String>>,
    update_fails: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<ProviderCall>>,
    next_id: AtomicUsize,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<DomainRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            describe_error: Mutex::new(None),
            describe_fails: Mutex::new(None),
            describe_delay: Mutex::new(None),
            add_error: Mutex::new(None),
            update_errors: Mutex::new(HashMap::new()),
            update_fails: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Report `has_error` on describe
    pub fn reject_describe(&self, message: &str) {
        *self.describe_error.lock().unwrap() = Some(message.to_string());
    }

    /// Return an unexpected error from describe
    pub fn break_describe(&self, message: &str) {
        *self.describe_fails.lock().unwrap() = Some(message.to_string());
    }

    /// Suspend every describe call for `delay` after taking its answer
    pub fn delay_describe(&self, delay: Duration) {
        *self.describe_delay.lock().unwrap() = Some(delay);
    }

    /// Report `has_error` on add
    pub fn reject_add(&self, message: &str) {
        *self.add_error.lock().unwrap() = Some(message.to_string());
    }

    /// Report `has_error` when updating `record_id`
    pub fn reject_update(&self, record_id: &str, message: &str) {
        self.update_errors
            .lock()
            .unwrap()
            .insert(record_id.to_string(), message.to_string());
    }

    /// Return an unexpected error when updating `record_id`
    pub fn break_update(&self, record_id: &str, message: &str) {
        self.update_fails
            .lock()
            .unwrap()
            .insert(record_id.to_string(), message.to_string());
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Describe { .. }))
            .count()
    }

    /// Add and update calls, in order
    pub fn mutations(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ProviderCall::Describe { .. }))
            .collect()
    }

    pub fn records(&self) -> Vec<DomainRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProviderClient for RecordingProvider {
    async fn describe_records(
        &self,
        domain_name: &str,
        rr: &str,
        record_type: &str,
    ) -> Result<DescribeRecordsResponse> {
        self.calls.lock().unwrap().push(ProviderCall::Describe {
            domain_name: domain_name.to_string(),
            rr: rr.to_string(),
            record_type: record_type.to_string(),
        });

        // The answer is taken when the call arrives, so a delayed describe
        // reports the zone as it was before any overlapping pass mutated it
        let answer = if let Some(message) = self.describe_fails.lock().unwrap().clone() {
            Err(Error::http(message))
        } else if let Some(message) = self.describe_error.lock().unwrap().clone() {
            Ok(DescribeRecordsResponse::error(message))
        } else {
            Ok(DescribeRecordsResponse::found(self.records()))
        };

        let delay = *self.describe_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        answer
    }

    async fn add_record(
        &self,
        domain_name: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<ProviderResponse> {
        self.calls.lock().unwrap().push(ProviderCall::Add {
            domain_name: domain_name.to_string(),
            rr: rr.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
        });

        if let Some(message) = self.add_error.lock().unwrap().clone() {
            return Ok(ProviderResponse::error(message));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .push(DomainRecord::a(format!("added-{}", id), value));
        Ok(ProviderResponse::success())
    }

    async fn update_record(
        &self,
        record_id: &str,
        rr: &str,
        record_type: &str,
        value: &str,
    ) -> Result<ProviderResponse> {
        self.calls.lock().unwrap().push(ProviderCall::Update {
            record_id: record_id.to_string(),
            rr: rr.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
        });

        if let Some(message) = self.update_fails.lock().unwrap().get(record_id).cloned() {
            return Err(Error::http(message));
        }
        if let Some(message) = self.update_errors.lock().unwrap().get(record_id).cloned() {
            return Ok(ProviderResponse::error(message));
        }

        for record in self.records.lock().unwrap().iter_mut() {
            if record.record_id == record_id {
                record.value = value.to_string();
            }
        }
        Ok(ProviderResponse::success())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal valid WorkerConfig for testing
pub fn worker_config(urls: &[&str]) -> WorkerConfig {
    WorkerConfig::new("test", "example.com", "home")
        .with_credentials("test-key-id", "test-key-secret")
        .with_interval_minutes(30)
        .with_ip_discovery_urls(urls.iter().copied())
}
