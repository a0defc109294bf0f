//! Deferred value errors

use std::sync::Arc;

use thiserror::Error;

use crate::runtime::value::Value;

/// Result of host-side operations (event loop, wiring).
pub type DeferredResult<T> = Result<T, DeferredError>;

/// Faults produced by the core itself.
///
/// When one of these becomes a rejection reason it travels as
/// [`Value::Error`], so consumers can tell core faults apart from values
/// raised by user handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeferredError {
    #[error("Chaining cycle detected for deferred value")]
    ChainingCycle,

    #[error("Value is not callable: {0}")]
    NotCallable(String),

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Event loop exceeded {0} turns")]
    TurnLimitExceeded(usize),

    #[error("Event loop is already running")]
    ReentrantRun,
}

impl DeferredError {
    /// Check if this is the self-reference fault.
    #[inline]
    pub fn is_chaining_cycle(&self) -> bool {
        matches!(self, DeferredError::ChainingCycle)
    }
}

impl From<DeferredError> for Value {
    fn from(err: DeferredError) -> Self {
        Value::Error(Arc::new(err))
    }
}
