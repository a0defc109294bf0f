//! FIFO task queue for the event loop

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::task::Task;

/// Shared first-in first-out task queue.
///
/// Cloning yields another handle onto the same queue.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    inner: Arc<Mutex<VecDeque<Arc<Task>>>>,
}

impl TaskQueue {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a task to the back of the queue.
    #[inline]
    pub fn push(
        &self,
        task: Arc<Task>,
    ) {
        self.inner.lock().push_back(task);
    }

    /// Pop the oldest task.
    #[inline]
    pub fn pop_front(&self) -> Option<Arc<Task>> {
        self.inner.lock().pop_front()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
