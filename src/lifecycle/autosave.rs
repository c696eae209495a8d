//! Autosave and eviction coordinator

use super::scheduler::{Scheduler, TaskHandle};
use crate::config::{clamp_autosave_interval, StorageConfig};
use crate::error::StorageWriteError;
use crate::progress::{PlayerId, ProgressStore, SaveReport};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Flushes the progress store on a timer, on departure and at shutdown
pub struct AutosaveCoordinator {
    store: Arc<ProgressStore>,
    scheduler: Arc<dyn Scheduler>,
    interval: Mutex<Duration>,
    task: Mutex<Option<TaskHandle>>,
}

impl AutosaveCoordinator {
    /// Create a stopped coordinator. The interval is clamped to the autosave minimum.
    pub fn new(store: Arc<ProgressStore>, scheduler: Arc<dyn Scheduler>, interval: Duration) -> Self {
        Self {
            store,
            scheduler,
            interval: Mutex::new(clamp_autosave_interval(interval)),
            task: Mutex::new(None),
        }
    }

    pub fn from_config(
        store: Arc<ProgressStore>,
        scheduler: Arc<dyn Scheduler>,
        config: &StorageConfig,
    ) -> Self {
        Self::new(store, scheduler, config.autosave_interval())
    }

    /// Arm the periodic save. No-op if already running.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            return;
        }

        let interval = *self.interval.lock();
        let store = self.store.clone();
        *task = Some(self.scheduler.run_periodically(
            interval,
            Arc::new(move || log_report("Autosave", &store.save_all())),
        ));
        info!("Autosave every {}s", interval.as_secs());
    }

    /// Re-arm with a new interval, e.g. after a config reload
    pub fn restart(&self, interval: Duration) {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
        }
        *self.interval.lock() = clamp_autosave_interval(interval);
        self.start();
    }

    pub fn interval(&self) -> Duration {
        *self.interval.lock()
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Load the player's progress into the cache
    pub fn player_joined(&self, player: PlayerId) {
        self.store.get(player);
    }

    /// Save and evict the player right away instead of waiting for the timer
    pub fn player_departed(&self, player: PlayerId) -> Result<bool, StorageWriteError> {
        let evicted = self.store.evict(player).map_err(|err| {
            warn!("{}", err);
            err
        })?;
        if evicted {
            debug!("Evicted {}", player);
        }
        Ok(evicted)
    }

    /// Save everything now without touching the timer
    pub fn flush_now(&self) -> SaveReport {
        let report = self.store.save_all();
        log_report("Flush", &report);
        report
    }

    /// Stop the timer, then run one final synchronous save
    pub fn shutdown(&self) -> SaveReport {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
        }
        let report = self.store.save_all();
        log_report("Shutdown save", &report);
        report
    }
}

fn log_report(label: &str, report: &SaveReport) {
    if report.is_clean() {
        debug!("{}: saved {} players", label, report.saved);
    } else {
        warn!(
            "{}: saved {} players, {} failed",
            label,
            report.saved,
            report.failed.len()
        );
    }
}
