//! Awaitable handles for submitted tasks.

use std::fmt;

use tokio::sync::oneshot;

/// Identifier assigned to a task at submission time, unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// Returns the raw u64 value of this task ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Marker for a worker that terminated before reporting an outcome.
///
/// Converted into the caller's error type via `From`, so domain error
/// enums decide how an abandoned task surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskAborted;

/// Handle to a submitted task.
///
/// Holds the receiving end of the task's completion channel. Dropping the
/// handle detaches from the task without cancelling it; there is no
/// cancellation support.
pub struct TaskHandle<T, E> {
    id: TaskId,
    label: String,
    rx: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(id: TaskId, label: String, rx: oneshot::Receiver<Result<T, E>>) -> Self {
        Self { id, label, rx }
    }

    /// The scheduler-assigned id of this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The label the task was submitted under.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T, E: From<TaskAborted>> TaskHandle<T, E> {
    /// Awaits the task outcome.
    ///
    /// Resolves to the task's own result; a worker that vanished without
    /// reporting yields `E::from(TaskAborted)`.
    pub async fn wait(self) -> Result<T, E> {
        match self.rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(E::from(TaskAborted)),
        }
    }
}
