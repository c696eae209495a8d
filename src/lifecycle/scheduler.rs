//! "Run every N seconds" primitive
//!
//! The engine never owns a clock. Hosts hand in a [`Scheduler`]: either the
//! tokio-backed one or a [`ManualScheduler`] driven from their own loop.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::warn;

/// Body of a periodic task
pub type PeriodicTask = Arc<dyn Fn() + Send + Sync>;

/// One-shot deferred work
pub type DeferredTask = Box<dyn FnOnce() + Send>;

pub trait Scheduler: Send + Sync {
    /// Run `task` every `interval`, first run one interval from now
    fn run_periodically(&self, interval: Duration, task: PeriodicTask) -> TaskHandle;

    /// Run `task` soon, outside the caller's stack
    fn run_once_now(&self, task: DeferredTask);
}

/// Cancels a periodic task. Dropping the handle leaves the task running.
#[derive(Debug)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Stop future runs. A run already in progress finishes.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ============================================================================
// Tokio
// ============================================================================

/// Scheduler on a tokio runtime. Task bodies run on the blocking pool.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler for the runtime we are running inside, if any
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn run_periodically(&self, interval: Duration, task: PeriodicTask) -> TaskHandle {
        // tokio panics on a zero period
        let period = interval.max(Duration::from_millis(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let join = self.handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                let body = task.clone();
                if let Err(err) = tokio::task::spawn_blocking(move || body()).await {
                    if err.is_panic() {
                        warn!("Periodic task panicked: {}", err);
                    }
                }
            }
        });

        TaskHandle::new(cancelled, Some(join.abort_handle()))
    }

    fn run_once_now(&self, task: DeferredTask) {
        drop(self.handle.spawn_blocking(task));
    }
}

// ============================================================================
// Manual
// ============================================================================

struct PeriodicEntry {
    interval: Duration,
    task: PeriodicTask,
    cancelled: Arc<AtomicBool>,
}

/// Scheduler driven by explicit calls to [`tick`](Self::tick).
///
/// Every tick runs each live periodic task once regardless of its interval.
#[derive(Default)]
pub struct ManualScheduler {
    periodic: Mutex<Vec<PeriodicEntry>>,
    pending: Mutex<Vec<DeferredTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_tasks(&self) -> Vec<PeriodicTask> {
        let mut periodic = self.periodic.lock();
        periodic.retain(|entry| !entry.cancelled.load(Ordering::Acquire));
        periodic.iter().map(|entry| entry.task.clone()).collect()
    }

    /// Run every live periodic task once; returns how many ran
    pub fn tick(&self) -> usize {
        let tasks = self.live_tasks();
        for task in &tasks {
            task();
        }
        tasks.len()
    }

    /// Drain deferred work, including work queued while draining
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch = std::mem::take(&mut *self.pending.lock());
            if batch.is_empty() {
                return ran;
            }
            ran += batch.len();
            for task in batch {
                task();
            }
        }
    }

    pub fn periodic_count(&self) -> usize {
        self.live_tasks().len()
    }

    /// Intervals of live periodic tasks, in registration order
    pub fn intervals(&self) -> Vec<Duration> {
        let mut periodic = self.periodic.lock();
        periodic.retain(|entry| !entry.cancelled.load(Ordering::Acquire));
        periodic.iter().map(|entry| entry.interval).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn run_periodically(&self, interval: Duration, task: PeriodicTask) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.periodic.lock().push(PeriodicEntry {
            interval,
            task,
            cancelled: cancelled.clone(),
        });
        TaskHandle::new(cancelled, None)
    }

    fn run_once_now(&self, task: DeferredTask) {
        self.pending.lock().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, PeriodicTask) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let task: PeriodicTask = Arc::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, task)
    }

    #[test]
    fn test_manual_tick_and_cancel() {
        let scheduler = ManualScheduler::new();
        let (count, task) = counter();
        let handle = scheduler.run_periodically(Duration::from_secs(60), task);

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.intervals(), vec![Duration::from_secs(60)]);

        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(scheduler.tick(), 0);
        assert_eq!(scheduler.periodic_count(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_manual_pending_runs_nested_work() {
        let scheduler = Arc::new(ManualScheduler::new());
        let count = Arc::new(AtomicUsize::new(0));

        let (outer_sched, outer_count) = (scheduler.clone(), count.clone());
        scheduler.run_once_now(Box::new(move || {
            outer_count.fetch_add(1, Ordering::SeqCst);
            let inner_count = outer_count.clone();
            outer_sched.run_once_now(Box::new(move || {
                inner_count.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert_eq!(scheduler.run_pending(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.run_pending(), 0);
    }

    #[test]
    fn test_task_may_schedule_from_inside_tick() {
        let scheduler = Arc::new(ManualScheduler::new());
        let inner = scheduler.clone();
        let _handle = scheduler.run_periodically(
            Duration::from_secs(1),
            Arc::new(move || inner.run_once_now(Box::new(|| {}))),
        );

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.run_pending(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tokio_periodic_runs_until_cancelled() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (count, task) = counter();
        let handle = scheduler.run_periodically(Duration::from_millis(20), task);

        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.cancel();
        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several runs, saw {}", seen);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let settled = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), settled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tokio_run_once_now() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        scheduler.run_once_now(Box::new(move || {
            let _ = tx.send(7);
        }));
        assert_eq!(rx.await.unwrap(), 7);
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(TokioScheduler::try_current().is_none());
    }
}
