//! Externally settled deferred values
//!
//! Test suites often need to settle a deferred value from outside its setup
//! routine. [`harness`] hands out a pending value together with its raw
//! capabilities.

use crate::runtime::scheduler::EventLoop;

use super::{Deferred, Reject, Resolve};

/// A pending deferred value and the capabilities that settle it.
#[derive(Debug, Clone)]
pub struct Harness {
    pub deferred: Deferred,
    pub resolve: Resolve,
    pub reject: Reject,
}

/// Create a pending deferred value on `event_loop` with its capabilities.
pub fn harness(event_loop: &EventLoop) -> Harness {
    let deferred = Deferred::pending(event_loop);
    Harness {
        resolve: Resolve {
            target: deferred.clone(),
        },
        reject: Reject {
            target: deferred.clone(),
        },
        deferred,
    }
}
