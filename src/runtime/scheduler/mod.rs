//! Cooperative event loop
//!
//! Every reaction of a deferred value runs as a task on an [`EventLoop`]. A
//! task is only ever executed by [`EventLoop::tick`] or [`EventLoop::run`],
//! never from inside [`EventLoop::schedule`], so whoever schedules work has
//! always returned before that work starts.

pub mod queue;
pub mod task;

pub use queue::TaskQueue;
pub use task::{Job, Task, TaskId, TaskIdGenerator, TaskState};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::runtime::errors::{DeferredError, DeferredResult};
use crate::util::config::{self, EventLoopConfig};

/// Event loop statistics.
#[derive(Debug, Default)]
pub struct EventLoopStats {
    /// Total tasks scheduled.
    pub tasks_scheduled: AtomicUsize,
    /// Total turns executed.
    pub turns_run: AtomicUsize,
}

impl EventLoopStats {
    #[inline]
    pub fn record_scheduled(&self) {
        self.tasks_scheduled.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    pub fn record_turn(&self) {
        self.turns_run.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    pub fn tasks_scheduled(&self) -> usize {
        self.tasks_scheduled.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn turns_run(&self) -> usize {
        self.turns_run.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct EventLoopInner {
    config: EventLoopConfig,
    queue: TaskQueue,
    task_ids: Mutex<TaskIdGenerator>,
    /// Set while a turn is executing.
    running: AtomicBool,
    stats: EventLoopStats,
}

impl Drop for EventLoopInner {
    fn drop(&mut self) {
        let pending = self.queue.len();
        if pending > 0 {
            debug!(pending, "event loop dropped with queued tasks");
        }
    }
}

/// Single-threaded FIFO event loop.
///
/// Cloning yields another handle onto the same loop.
#[derive(Debug, Clone)]
pub struct EventLoop {
    inner: Arc<EventLoopInner>,
}

/// Non-owning handle onto an [`EventLoop`].
///
/// Deferred values and their queued reactions hold the loop this way, so
/// tasks still queued when the last [`EventLoop`] handle goes away are freed
/// together with the loop.
#[derive(Debug, Clone)]
pub struct WeakEventLoop {
    inner: Weak<EventLoopInner>,
}

impl WeakEventLoop {
    /// The loop, if some [`EventLoop`] handle still owns it.
    #[inline]
    pub fn upgrade(&self) -> Option<EventLoop> {
        self.inner.upgrade().map(|inner| EventLoop { inner })
    }
}

/// Clears the running flag when a drive call ends, even by unwinding.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> DeferredResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| RunGuard(flag))
            .map_err(|_| DeferredError::ReentrantRun)
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl EventLoop {
    /// Create an event loop configured from the process environment.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(config::global().event_loop.clone())
    }

    /// Create an event loop with an explicit configuration.
    pub fn with_config(config: EventLoopConfig) -> Self {
        debug!(max_turns = ?config.max_turns, "event loop created");
        Self {
            inner: Arc::new(EventLoopInner {
                config,
                queue: TaskQueue::new(),
                task_ids: Mutex::new(TaskIdGenerator::new()),
                running: AtomicBool::new(false),
                stats: EventLoopStats::default(),
            }),
        }
    }

    #[inline]
    pub fn config(&self) -> &EventLoopConfig {
        &self.inner.config
    }

    #[inline]
    pub fn stats(&self) -> &EventLoopStats {
        &self.inner.stats
    }

    /// Non-owning handle onto this loop.
    #[inline]
    pub fn downgrade(&self) -> WeakEventLoop {
        WeakEventLoop {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Queue `job` to run on a later turn.
    pub fn schedule<F>(
        &self,
        name: &'static str,
        job: F,
    ) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.task_ids.lock().next();
        self.inner.queue.push(Arc::new(Task::new(id, name, job)));
        self.inner.stats.record_scheduled();
        trace!(task = %id, name, "task scheduled");
        id
    }

    /// Run the oldest queued task, if any.
    ///
    /// Returns whether a task ran. Fails when called from inside a task.
    pub fn tick(&self) -> DeferredResult<bool> {
        let _guard = RunGuard::acquire(&self.inner.running)?;
        Ok(self.run_one())
    }

    /// Run tasks until the queue is empty, including tasks queued while
    /// running. Returns the number of turns executed.
    ///
    /// Stops with [`DeferredError::TurnLimitExceeded`] once `max_turns` turns
    /// have run and work is still queued.
    pub fn run(&self) -> DeferredResult<usize> {
        let _guard = RunGuard::acquire(&self.inner.running)?;
        let limit = self.inner.config.max_turns;
        let mut turns = 0;
        loop {
            if self.inner.queue.is_empty() {
                break;
            }
            if let Some(limit) = limit {
                if turns >= limit {
                    debug!(limit, pending = self.pending_tasks(), "turn limit exceeded");
                    return Err(DeferredError::TurnLimitExceeded(limit));
                }
            }
            if !self.run_one() {
                break;
            }
            turns += 1;
        }
        debug!(turns, "event loop drained");
        Ok(turns)
    }

    fn run_one(&self) -> bool {
        let Some(task) = self.inner.queue.pop_front() else {
            return false;
        };
        if self.inner.config.trace_turns {
            debug!(task = %task.id(), name = task.name(), "turn");
        }
        task.run();
        self.inner.stats.record_turn();
        true
    }

    /// Number of tasks waiting to run.
    #[inline]
    pub fn pending_tasks(&self) -> usize {
        self.inner.queue.len()
    }

    /// Check if no task is waiting.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.inner.queue.is_empty()
    }

    /// Check if a turn is currently executing.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(
        &self,
        other: &EventLoop,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
