//! Self-scheduling reconciliation worker
//!
//! The ReconciliationWorker is responsible for:
//! - Owning the run/stop lifecycle behind an atomic run flag
//! - Driving a repeating schedule that starts fast and settles to the
//!   configured interval
//! - Dispatching one reconciliation pass per tick while running
//!
//! ## Lifecycle
//!
//! ```text
//!            run()              stop()
//!   Idle ───────────▶ Running ─────────▶ Stopped
//!                        ▲                  │
//!                        └──────run()───────┘
//! ```
//!
//! `run()` and `stop()` are idempotent. `dispose()` releases the schedule
//! exactly once; dropping the worker disposes it.
//!
//! ## Cadence
//!
//! The schedule is armed with [`INITIAL_PERIOD`] so the first pass happens
//! shortly after `run()`. Every fire first rewrites the period to
//! `interval_minutes × 60 s` and only then checks the run flag, so the
//! cadence settles even when the fire does no work.
//!
//! ## Overlapping ticks
//!
//! Each pass runs as its own task. The run flag gates start and stop only;
//! it does not serialize passes. A pass that outlives the period overlaps
//! with the next one, and two overlapping passes that both see no record
//! will both add one.

use crate::config::WorkerConfig;
use crate::reconcile::{ReconciliationOutcome, reconcile};
use crate::schedule::{Schedule, SchedulePeriod, TickCallback};
use crate::traits::{DnsProviderClient, IpDiscoveryClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Period of the first fire after the worker is started
pub const INITIAL_PERIOD: Duration = Duration::from_secs(2);

/// State shared between the worker handle, its schedule callback and the
/// passes in flight
struct WorkerInner {
    config: WorkerConfig,
    ip_client: Arc<dyn IpDiscoveryClient>,
    provider: Arc<dyn DnsProviderClient>,
    running: AtomicBool,
}

impl WorkerInner {
    fn on_tick(
        self: &Arc<Self>,
        period: &SchedulePeriod,
    ) -> Option<JoinHandle<Vec<ReconciliationOutcome>>> {
        period.set(self.config.steady_interval());

        if !self.running.load(Ordering::SeqCst) {
            debug!("[{}] not running, tick skipped", self.config.name);
            return None;
        }

        info!("[{}] do work ...", self.config.name);
        let inner = Arc::clone(self);
        Some(tokio::spawn(async move { inner.reconcile().await }))
    }

    async fn reconcile(&self) -> Vec<ReconciliationOutcome> {
        reconcile(&self.config, self.ip_client.as_ref(), self.provider.as_ref()).await
    }
}

/// Keeps one A record pointed at the host's public IPv4 address
pub struct ReconciliationWorker {
    inner: Arc<WorkerInner>,
    schedule: Schedule,
    /// Serializes run, stop and dispose so the run flag and the schedule
    /// driver change together
    lifecycle: Mutex<()>,
}

impl ReconciliationWorker {
    /// Create a worker
    ///
    /// The schedule is armed with [`INITIAL_PERIOD`] but not started. No
    /// runtime is needed until [`ReconciliationWorker::run`].
    pub fn new(
        config: WorkerConfig,
        ip_client: Arc<dyn IpDiscoveryClient>,
        provider: Arc<dyn DnsProviderClient>,
    ) -> Self {
        let inner = Arc::new(WorkerInner {
            config,
            ip_client,
            provider,
            running: AtomicBool::new(false),
        });

        let period = SchedulePeriod::new(INITIAL_PERIOD);
        let callback: TickCallback = {
            let inner = Arc::clone(&inner);
            let period = period.clone();
            Arc::new(move || {
                let _ = inner.on_tick(&period);
            })
        };

        Self {
            inner,
            schedule: Schedule::new(period, callback),
            lifecycle: Mutex::new(()),
        }
    }

    /// Worker name (for logging)
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Worker configuration
    pub fn config(&self) -> &WorkerConfig {
        &self.inner.config
    }

    /// Current firing period of the schedule
    pub fn current_period(&self) -> Duration {
        self.schedule.period()
    }

    /// Start the worker
    ///
    /// Only the caller that flips the run flag from "not running" starts the
    /// schedule; concurrent or repeated calls are no-ops. Must be called
    /// from within a tokio runtime.
    pub fn run(&self) {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        debug!("{} worker running ...", self.name());
        match self.schedule.start() {
            Ok(_) if self.schedule.is_disposed() => {
                warn!("[{}] worker is disposed, not starting", self.name());
                self.inner.running.store(false, Ordering::SeqCst);
            }
            Ok(_) => {}
            Err(e) => {
                error!("[{}] failed to start schedule: {}", self.name(), e);
                self.inner.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Stop the worker
    ///
    /// Clears the run flag and halts the schedule. A pass already past its
    /// flag check runs to completion.
    pub fn stop(&self) {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        debug!("{} worker stopping ...", self.name());
        self.inner.running.store(false, Ordering::SeqCst);
        self.schedule.stop();
        debug!("worker [ {} ] stopped", self.name());
    }

    /// Whether the run flag is set
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Release the schedule permanently
    ///
    /// Safe to call in any state and any number of times; returns `true`
    /// only for the call that released the schedule.
    pub fn dispose(&self) -> bool {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.running.store(false, Ordering::SeqCst);
        let released = self.schedule.dispose();
        if released {
            debug!("worker [ {} ] disposed", self.name());
        }
        released
    }

    /// Whether the schedule driver is installed
    ///
    /// Outside of a `run`/`stop` call this matches [`Self::is_running`].
    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_started()
    }

    /// Whether the schedule has been released
    pub fn is_disposed(&self) -> bool {
        self.schedule.is_disposed()
    }

    /// Fire the schedule callback once, out of band
    ///
    /// Applies the steady-state period, then dispatches a pass if the worker
    /// is running. Returns the dispatched pass, if any.
    pub fn tick(&self) -> Option<JoinHandle<Vec<ReconciliationOutcome>>> {
        self.inner.on_tick(self.schedule.period_handle())
    }

    /// Run one reconciliation pass now, ignoring the schedule and run flag
    pub async fn reconcile_once(&self) -> Vec<ReconciliationOutcome> {
        self.inner.reconcile().await
    }
}

impl std::fmt::Debug for ReconciliationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationWorker")
            .field("config", &self.inner.config)
            .field("provider", &self.inner.provider.provider_name())
            .field("running", &self.is_running())
            .field("scheduled", &self.is_scheduled())
            .field("period", &self.current_period())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
