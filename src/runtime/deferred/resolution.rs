//! Resolution procedure
//!
//! Decides how a value produced by a reaction settles the child deferred
//! value: directly for plain values, by adopting the eventual state for
//! thenables. A thenable is any object-like value whose `then` property is
//! callable; that includes deferred values from this crate.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::runtime::errors::DeferredError;
use crate::runtime::value::{arg, Function, Value};

use super::Deferred;

/// How many foreign `then` calls may be nested synchronously on one thread
/// before the innermost target is rejected.
pub const MAX_THENABLE_DEPTH: usize = 64;

thread_local! {
    static THENABLE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// One level of synchronous `then` nesting, released on drop.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Option<Self> {
        THENABLE_DEPTH.with(|depth| {
            let current = depth.get();
            if current >= MAX_THENABLE_DEPTH {
                return None;
            }
            depth.set(current + 1);
            Some(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        THENABLE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// One-shot flag shared by the adopt and fail callbacks of one `then` call.
#[derive(Debug, Clone, Default)]
pub(crate) struct Latch {
    fired: Arc<AtomicBool>,
}

impl Latch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fire the latch. Only the first caller gets `true`.
    #[inline]
    pub(crate) fn try_fire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }
}

/// Settle `target` from the produced value `x`.
///
/// Never leaves `target` unsettled on a terminal fault; every fault becomes
/// a rejection of `target`. A thenable that keeps adopting synchronously,
/// without ever yielding to the loop, is cut off after
/// [`MAX_THENABLE_DEPTH`] nested calls with a [`DeferredError::TypeError`].
pub fn resolve(
    target: &Deferred,
    x: Value,
) {
    if let Value::Deferred(produced) = &x {
        if produced.ptr_eq(target) {
            debug!(target = %target.id(), "chaining cycle");
            target.reject_with(DeferredError::ChainingCycle.into());
            return;
        }
    }

    if !x.is_object_like() {
        target.fulfill_with(x);
        return;
    }

    let then = match x.get("then") {
        Ok(then) => then,
        Err(fault) => {
            debug!(target = %target.id(), "reading then raised");
            target.reject_with(fault);
            return;
        }
    };

    let Value::Function(then) = then else {
        target.fulfill_with(x);
        return;
    };

    let Some(_depth) = DepthGuard::enter() else {
        debug!(target = %target.id(), limit = MAX_THENABLE_DEPTH, "thenable nesting too deep");
        let fault = DeferredError::TypeError(format!(
            "thenable adoption nested deeper than {} synchronous calls",
            MAX_THENABLE_DEPTH
        ));
        target.reject_with(fault.into());
        return;
    };

    trace!(target = %target.id(), thenable = %x, "adopting thenable");
    let latch = Latch::new();
    let adopt = {
        let target = target.clone();
        let latch = latch.clone();
        Function::named("adopt", move |_this, args| {
            if latch.try_fire() {
                resolve(&target, arg(args, 0));
            } else {
                trace!(target = %target.id(), "late adopt ignored");
            }
            Ok(Value::Undefined)
        })
    };
    let fail = {
        let target = target.clone();
        let latch = latch.clone();
        Function::named("fail", move |_this, args| {
            if latch.try_fire() {
                target.reject_with(arg(args, 0));
            } else {
                trace!(target = %target.id(), "late fail ignored");
            }
            Ok(Value::Undefined)
        })
    };

    if let Err(fault) = then.call(&x, &[adopt.into(), fail.into()]) {
        if latch.try_fire() {
            debug!(target = %target.id(), "thenable raised");
            target.reject_with(fault);
        } else {
            trace!(target = %target.id(), "fault after settlement suppressed");
        }
    }
}
