//! Repeating timer with a mutable period
//!
//! A [`Schedule`] owns one driver task that sleeps for the current period and
//! then invokes the callback, forever, until stopped. The period lives in a
//! shared [`SchedulePeriod`] so the callback itself can rewrite it; the new
//! value applies from the next wait onward.
//!
//! The callback runs on the driver task and should return quickly. Work that
//! suspends belongs in a task the callback spawns, which also means two such
//! tasks can be in flight at once if one outlives a period.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Callback invoked on every fire
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Shared firing period, millisecond resolution
#[derive(Debug, Clone)]
pub struct SchedulePeriod(Arc<AtomicU64>);

impl SchedulePeriod {
    /// Create a period handle
    pub fn new(period: Duration) -> Self {
        Self(Arc::new(AtomicU64::new(to_millis(period))))
    }

    /// Current period
    pub fn get(&self) -> Duration {
        Duration::from_millis(self.0.load(Ordering::SeqCst))
    }

    /// Replace the period; takes effect from the next wait
    pub fn set(&self, period: Duration) {
        self.0.store(to_millis(period), Ordering::SeqCst);
    }
}

fn to_millis(period: Duration) -> u64 {
    // A zero period would spin the driver
    u64::try_from(period.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Repeating timer backed by a tokio task
pub struct Schedule {
    period: SchedulePeriod,
    callback: TickCallback,
    driver: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl Schedule {
    /// Arm a schedule without starting it
    ///
    /// No runtime is needed until [`Schedule::start`].
    pub fn new(period: SchedulePeriod, callback: TickCallback) -> Self {
        Self {
            period,
            callback,
            driver: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Handle to the shared period
    pub fn period_handle(&self) -> &SchedulePeriod {
        &self.period
    }

    /// Current firing period
    pub fn period(&self) -> Duration {
        self.period.get()
    }

    /// Replace the firing period
    pub fn set_period(&self, period: Duration) {
        self.period.set(period);
    }

    /// Start the driver task
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: this call started the driver
    /// - `Ok(false)`: the driver was already running, or the schedule is disposed
    /// - `Err(Error)`: called outside a tokio runtime
    pub fn start(&self) -> Result<bool> {
        let mut driver = self.driver.lock().unwrap_or_else(|e| e.into_inner());
        if self.is_disposed() || driver.is_some() {
            return Ok(false);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::other(format!("schedule requires a tokio runtime: {}", e)))?;

        let period = self.period.clone();
        let callback = Arc::clone(&self.callback);
        *driver = Some(runtime.spawn(async move {
            loop {
                tokio::time::sleep(period.get()).await;
                callback();
            }
        }));

        debug!("Schedule started (period={:?})", self.period.get());
        Ok(true)
    }

    /// Stop the driver task
    ///
    /// Future fires are cancelled. Work the callback already dispatched is
    /// not affected.
    pub fn stop(&self) {
        let handle = self
            .driver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("Schedule stopped");
        }
    }

    /// Whether the driver task is currently installed
    pub fn is_started(&self) -> bool {
        self.driver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Release the driver permanently
    ///
    /// Returns `true` only for the call that performed the release.
    pub fn dispose(&self) -> bool {
        // Held across the flag swap so a concurrent start cannot install a
        // driver after disposal
        let mut driver = self.driver.lock().unwrap_or_else(|e| e.into_inner());
        if self.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Some(handle) = driver.take() {
            handle.abort();
        }
        debug!("Schedule disposed");
        true
    }

    /// Whether [`Schedule::dispose`] has run
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_schedule(period: Duration) -> (Schedule, Arc<AtomicUsize>) {
        let fires = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fires);
        let callback: TickCallback = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (Schedule::new(SchedulePeriod::new(period), callback), fires)
    }

    #[test]
    fn test_construct_and_start_outside_runtime() {
        let (schedule, _) = counting_schedule(Duration::from_secs(2));
        assert!(!schedule.is_started());
        assert!(schedule.start().is_err());
        assert!(!schedule.is_started());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let period = SchedulePeriod::new(Duration::ZERO);
        assert_eq!(period.get(), Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_installs_one_driver() {
        let (schedule, fires) = counting_schedule(Duration::from_secs(2));

        assert!(schedule.start().unwrap());
        assert!(!schedule.start().unwrap());

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_period_change_applies_to_next_wait() {
        let period = SchedulePeriod::new(Duration::from_secs(2));
        let fires = Arc::new(AtomicUsize::new(0));
        let callback: TickCallback = {
            let period = period.clone();
            let fires = Arc::clone(&fires);
            Arc::new(move || {
                period.set(Duration::from_secs(60));
                fires.fetch_add(1, Ordering::SeqCst);
            })
        };
        let schedule = Schedule::new(period, callback);
        schedule.start().unwrap();

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
        assert_eq!(schedule.period(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_and_restart() {
        let (schedule, fires) = counting_schedule(Duration::from_secs(2));
        schedule.start().unwrap();
        schedule.stop();
        assert!(!schedule.is_started());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);

        assert!(schedule.start().unwrap());
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_racing_dispose_never_leaves_a_driver() {
        let handle = tokio::runtime::Handle::current();

        for _ in 0..2000 {
            let (schedule, _) = counting_schedule(Duration::from_secs(60));
            let barrier = std::sync::Barrier::new(2);

            std::thread::scope(|s| {
                s.spawn(|| {
                    let _guard = handle.enter();
                    barrier.wait();
                    let _ = schedule.start();
                });
                s.spawn(|| {
                    barrier.wait();
                    schedule.dispose();
                });
            });

            assert!(schedule.is_disposed());
            assert!(!schedule.is_started());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_is_idempotent() {
        let (schedule, fires) = counting_schedule(Duration::from_secs(2));
        schedule.start().unwrap();

        assert!(schedule.dispose());
        assert!(!schedule.dispose());
        assert!(schedule.is_disposed());
        assert!(!schedule.start().unwrap());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);
    }
}
