//! Task definitions for the event loop.
//!
//! A task is one turn of the loop: a named closure that runs exactly once.

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

/// Unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl TaskId {
    /// Get the inner value.
    #[inline]
    pub fn inner(&self) -> usize {
        self.0
    }
}

impl From<usize> for TaskId {
    fn from(val: usize) -> Self {
        Self(val)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// Task state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting in the queue.
    Queued,
    /// Currently executing.
    Running,
    /// Ran to completion.
    Finished,
}

impl TaskState {
    /// Convert from u8 (for atomic storage).
    #[inline]
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => TaskState::Running,
            2 => TaskState::Finished,
            _ => TaskState::Queued,
        }
    }

    /// Convert to u8 (for atomic storage).
    #[inline]
    pub fn as_u8(&self) -> u8 {
        match self {
            TaskState::Queued => 0,
            TaskState::Running => 1,
            TaskState::Finished => 2,
        }
    }
}

/// Work carried by a task.
pub type Job = Box<dyn FnOnce() + Send>;

/// A unit of work queued on the event loop.
pub struct Task {
    id: TaskId,
    /// Name for tracing.
    name: &'static str,
    state: AtomicU8,
    job: Mutex<Option<Job>>,
}

impl std::fmt::Debug for Task {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

impl Task {
    /// Create a new queued task.
    pub fn new<F>(
        id: TaskId,
        name: &'static str,
        job: F,
    ) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            id,
            name,
            state: AtomicU8::new(TaskState::Queued.as_u8()),
            job: Mutex::new(Some(Box::new(job))),
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::SeqCst))
    }

    #[inline]
    pub fn set_state(
        &self,
        state: TaskState,
    ) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Run the task's job. A second call does nothing.
    pub fn run(&self) {
        let job = self.job.lock().take();
        if let Some(job) = job {
            self.set_state(TaskState::Running);
            job();
            self.set_state(TaskState::Finished);
        }
    }
}

/// Generator for task IDs.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    next_id: usize,
}

impl TaskIdGenerator {
    #[inline]
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate the next task ID.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        TaskId(id)
    }
}
