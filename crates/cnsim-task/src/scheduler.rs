//! Task submission and bookkeeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tracing::debug;

use crate::handle::{TaskHandle, TaskId};

/// Counters describing scheduler activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Tasks submitted since the scheduler was created.
    pub submitted: u64,
    /// Tasks that completed with a success outcome.
    pub completed: u64,
    /// Tasks that completed with a failure outcome.
    pub failed: u64,
    /// Tasks currently running.
    pub in_flight: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Accepts units of work and runs them on the tokio runtime.
///
/// Each submission is spawned immediately; there is no queueing, no
/// retry, and no cancellation. One scheduler is instantiated per
/// simulated service so instances never share bookkeeping.
pub struct TaskScheduler {
    next_id: AtomicU64,
    in_flight: Arc<DashMap<u64, String>>,
    counters: Arc<Counters>,
}

impl TaskScheduler {
    /// Creates an idle scheduler.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            in_flight: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Submits a unit of work and returns an awaitable handle.
    ///
    /// The closure runs to completion on the runtime; its `Result` is the
    /// task-level outcome delivered through [`TaskHandle::wait`].
    pub fn submit<T, E, F>(&self, label: &str, work: F) -> TaskHandle<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let label = label.to_string();
        let (tx, rx) = oneshot::channel();

        self.in_flight.insert(id.as_u64(), label.clone());
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(task_id = %id, label = %label, "task submitted");

        let in_flight = Arc::clone(&self.in_flight);
        let counters = Arc::clone(&self.counters);
        let task_label = label.clone();
        tokio::spawn(async move {
            let outcome = work();
            let counter = if outcome.is_ok() {
                &counters.completed
            } else {
                &counters.failed
            };
            counter.fetch_add(1, Ordering::Relaxed);
            in_flight.remove(&id.as_u64());
            debug!(task_id = %id, label = %task_label, ok = outcome.is_ok(), "task finished");
            // The receiver may have been dropped; the outcome is discarded then.
            let _ = tx.send(outcome);
        });

        TaskHandle::new(id, label, rx)
    }

    /// Snapshot of the scheduler counters.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight.len() as u64,
        }
    }

    /// Labels of tasks that have been submitted but not yet finished.
    pub fn in_flight_labels(&self) -> Vec<String> {
        self.in_flight.iter().map(|e| e.value().clone()).collect()
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::TaskAborted;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Aborted,
        Boom,
    }

    impl From<TaskAborted> for TestError {
        fn from(_: TaskAborted) -> Self {
            TestError::Aborted
        }
    }

    #[tokio::test]
    async fn test_submit_and_wait() {
        let scheduler = TaskScheduler::new();
        let handle = scheduler.submit("double", || Ok::<_, TestError>(21 * 2));
        assert_eq!(handle.wait().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_failure_is_task_level() {
        let scheduler = TaskScheduler::new();
        let handle = scheduler.submit("boom", || Err::<u32, _>(TestError::Boom));
        assert_eq!(handle.wait().await.unwrap_err(), TestError::Boom);
    }

    #[tokio::test]
    async fn test_stats_track_outcomes() {
        let scheduler = TaskScheduler::new();
        scheduler
            .submit("ok", || Ok::<_, TestError>(1))
            .wait()
            .await
            .unwrap();
        scheduler
            .submit("err", || Err::<u32, _>(TestError::Boom))
            .wait()
            .await
            .unwrap_err();

        let stats = scheduler.stats();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_ids_are_unique_per_scheduler() {
        let scheduler = TaskScheduler::new();
        let a = scheduler.submit("a", || Ok::<_, TestError>(()));
        let b = scheduler.submit("b", || Ok::<_, TestError>(()));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.label(), "a");
        a.wait().await.unwrap();
        b.wait().await.unwrap();
    }
}
