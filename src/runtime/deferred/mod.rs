//! Deferred values
//!
//! A [`Deferred`] starts pending and settles exactly once, either fulfilled
//! with a value or rejected with a reason. Reactions attached with
//! [`Deferred::then`] run on later turns of the owning [`EventLoop`] and feed
//! their result through the resolution procedure into a child deferred.

pub mod harness;
pub mod resolution;

pub use harness::{harness, Harness};

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::runtime::scheduler::{EventLoop, WeakEventLoop};
use crate::runtime::value::{arg, Function, Value};

/// Identifier used in logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeferredId(pub u64);

impl DeferredId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DeferredId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DeferredId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of a deferred value's state.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

impl DeferredState {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, DeferredState::Pending)
    }

    /// Fulfilment value, if fulfilled.
    pub fn value(&self) -> Option<&Value> {
        match self {
            DeferredState::Fulfilled(v) => Some(v),
            _ => None,
        }
    }

    /// Rejection reason, if rejected.
    pub fn reason(&self) -> Option<&Value> {
        match self {
            DeferredState::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Callback run with the settled value or reason. Invoking it only queues
/// work; the handler itself runs on a later turn.
type Reaction = Box<dyn FnOnce(Value) + Send>;

enum Slot {
    Pending {
        fulfill_reactions: Vec<Reaction>,
        reject_reactions: Vec<Reaction>,
    },
    Fulfilled(Value),
    Rejected(Value),
}

/// Which side of a settlement a reaction serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReactionPath {
    Fulfill,
    Reject,
}

impl ReactionPath {
    fn task_name(self) -> &'static str {
        match self {
            ReactionPath::Fulfill => "fulfill-reaction",
            ReactionPath::Reject => "reject-reaction",
        }
    }
}

struct DeferredInner {
    id: DeferredId,
    event_loop: WeakEventLoop,
    slot: Mutex<Slot>,
}

/// Single-assignment container for an eventual value or failure reason.
///
/// Cloning yields another handle onto the same deferred value. The owning
/// [`EventLoop`] is not kept alive by its deferred values: once every loop
/// handle is gone, reactions are dropped instead of queued.
#[derive(Clone)]
pub struct Deferred {
    inner: Arc<DeferredInner>,
}

impl Deferred {
    /// Create a deferred value, running `setup` synchronously with its
    /// resolve and reject capabilities.
    ///
    /// If `setup` raises, the raised value becomes the rejection reason
    /// (ignored when `setup` already settled the value).
    pub fn new<F>(
        event_loop: &EventLoop,
        setup: F,
    ) -> Self
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        let deferred = Self::pending(event_loop);
        let resolve = Resolve {
            target: deferred.clone(),
        };
        let reject = Reject {
            target: deferred.clone(),
        };
        if let Err(fault) = setup(resolve, reject) {
            debug!(deferred = %deferred.id(), "setup raised");
            deferred.reject_with(fault);
        }
        deferred
    }

    /// A deferred value already fulfilled with `value`.
    pub fn resolved(
        event_loop: &EventLoop,
        value: impl Into<Value>,
    ) -> Self {
        let deferred = Self::pending(event_loop);
        deferred.fulfill_with(value.into());
        deferred
    }

    /// A deferred value already rejected with `reason`.
    pub fn rejected(
        event_loop: &EventLoop,
        reason: impl Into<Value>,
    ) -> Self {
        let deferred = Self::pending(event_loop);
        deferred.reject_with(reason.into());
        deferred
    }

    pub(crate) fn pending(event_loop: &EventLoop) -> Self {
        Self::pending_on(event_loop.downgrade())
    }

    fn pending_on(event_loop: WeakEventLoop) -> Self {
        let id = DeferredId::next();
        trace!(deferred = %id, "created");
        Self {
            inner: Arc::new(DeferredInner {
                id,
                event_loop,
                slot: Mutex::new(Slot::Pending {
                    fulfill_reactions: Vec::new(),
                    reject_reactions: Vec::new(),
                }),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> DeferredId {
        self.inner.id
    }

    /// The loop this deferred value schedules its reactions on, while it
    /// is still alive.
    #[inline]
    pub fn event_loop(&self) -> Option<EventLoop> {
        self.inner.event_loop.upgrade()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DeferredState {
        match &*self.inner.slot.lock() {
            Slot::Pending { .. } => DeferredState::Pending,
            Slot::Fulfilled(v) => DeferredState::Fulfilled(v.clone()),
            Slot::Rejected(r) => DeferredState::Rejected(r.clone()),
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(&*self.inner.slot.lock(), Slot::Pending { .. })
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(
        &self,
        other: &Deferred,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------------

    /// Fulfil with `value` as is; no unwrapping. Returns whether this call
    /// settled the value.
    pub(crate) fn fulfill_with(
        &self,
        value: Value,
    ) -> bool {
        self.settle(ReactionPath::Fulfill, value)
    }

    /// Reject with `reason`. Returns whether this call settled the value.
    pub(crate) fn reject_with(
        &self,
        reason: Value,
    ) -> bool {
        self.settle(ReactionPath::Reject, reason)
    }

    fn settle(
        &self,
        path: ReactionPath,
        outcome: Value,
    ) -> bool {
        let reactions = {
            let mut slot = self.inner.slot.lock();
            let Slot::Pending {
                fulfill_reactions,
                reject_reactions,
            } = &mut *slot
            else {
                trace!(deferred = %self.id(), ?path, "already settled, ignoring");
                return false;
            };
            let reactions = match path {
                ReactionPath::Fulfill => mem::take(fulfill_reactions),
                ReactionPath::Reject => mem::take(reject_reactions),
            };
            *slot = match path {
                ReactionPath::Fulfill => Slot::Fulfilled(outcome.clone()),
                ReactionPath::Reject => Slot::Rejected(outcome.clone()),
            };
            reactions
        };
        debug!(deferred = %self.id(), ?path, reactions = reactions.len(), "settled");
        // The lock is released: reactions only queue tasks, in attach order.
        for reaction in reactions {
            reaction(outcome.clone());
        }
        true
    }

    // ------------------------------------------------------------------------
    // Chaining
    // ------------------------------------------------------------------------

    /// Attach reactions and return the derived deferred value.
    ///
    /// A handler that is not a [`Value::Function`] passes the value or reason
    /// through unchanged. Handlers run on a later turn, never inside this call,
    /// with an undefined receiver and one argument.
    pub fn then(
        &self,
        on_fulfilled: impl Into<Value>,
        on_rejected: impl Into<Value>,
    ) -> Deferred {
        let on_fulfilled = on_fulfilled.into();
        let on_rejected = on_rejected.into();
        let child = Deferred::pending_on(self.inner.event_loop.clone());

        let settled = {
            let mut slot = self.inner.slot.lock();
            let settled = match &mut *slot {
                Slot::Pending {
                    fulfill_reactions,
                    reject_reactions,
                } => {
                    trace!(parent = %self.id(), child = %child.id(), "reactions registered");
                    fulfill_reactions.push(self.reaction(
                        ReactionPath::Fulfill,
                        on_fulfilled.clone(),
                        &child,
                    ));
                    reject_reactions.push(self.reaction(
                        ReactionPath::Reject,
                        on_rejected.clone(),
                        &child,
                    ));
                    None
                }
                Slot::Fulfilled(value) => Some((ReactionPath::Fulfill, value.clone())),
                Slot::Rejected(reason) => Some((ReactionPath::Reject, reason.clone())),
            };
            settled
        };
        // Already settled: queue the matching reaction right away.
        if let Some((path, outcome)) = settled {
            let handler = match path {
                ReactionPath::Fulfill => on_fulfilled,
                ReactionPath::Reject => on_rejected,
            };
            self.reaction(path, handler, &child)(outcome);
        }
        child
    }

    /// Attach a rejection handler only.
    #[inline]
    pub fn catch(
        &self,
        on_rejected: impl Into<Value>,
    ) -> Deferred {
        self.then(Value::Undefined, on_rejected)
    }

    fn reaction(
        &self,
        path: ReactionPath,
        handler: Value,
        child: &Deferred,
    ) -> Reaction {
        let event_loop = self.inner.event_loop.clone();
        let child = child.clone();
        Box::new(move |argument| {
            let Some(event_loop) = event_loop.upgrade() else {
                trace!(child = %child.id(), ?path, "event loop gone, reaction dropped");
                return;
            };
            event_loop.schedule(path.task_name(), move || {
                run_reaction(path, &handler, argument, &child);
            });
        })
    }

    /// `then` exposed as a callable, so a deferred value stored in a [`Value`]
    /// is a thenable like any other.
    pub(crate) fn then_function(&self) -> Function {
        let deferred = self.clone();
        Function::named("then", move |_this, args| {
            Ok(Value::Deferred(deferred.then(arg(args, 0), arg(args, 1))))
        })
    }
}

/// Body of a reaction task.
fn run_reaction(
    path: ReactionPath,
    handler: &Value,
    argument: Value,
    child: &Deferred,
) {
    if !handler.is_callable() {
        match path {
            ReactionPath::Fulfill => child.fulfill_with(argument),
            ReactionPath::Reject => child.reject_with(argument),
        };
        return;
    }
    match handler.call(&Value::Undefined, std::slice::from_ref(&argument)) {
        Ok(x) => resolution::resolve(child, x),
        Err(fault) => {
            debug!(child = %child.id(), ?path, "handler raised");
            child.reject_with(fault);
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let state = match &*self.inner.slot.lock() {
            Slot::Pending { .. } => "pending",
            Slot::Fulfilled(_) => "fulfilled",
            Slot::Rejected(_) => "rejected",
        };
        f.debug_struct("Deferred")
            .field("id", &self.inner.id)
            .field("state", &state)
            .finish()
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Capability to fulfil a deferred value.
///
/// The value is stored as is: a thenable passed here is not unwrapped. Every
/// call after the first settlement, through either capability, is ignored.
#[derive(Clone)]
pub struct Resolve {
    target: Deferred,
}

impl Resolve {
    /// Returns whether this call settled the deferred value.
    pub fn resolve(
        &self,
        value: impl Into<Value>,
    ) -> bool {
        self.target.fulfill_with(value.into())
    }
}

/// Capability to reject a deferred value.
#[derive(Clone)]
pub struct Reject {
    target: Deferred,
}

impl Reject {
    /// Returns whether this call settled the deferred value.
    pub fn reject(
        &self,
        reason: impl Into<Value>,
    ) -> bool {
        self.target.reject_with(reason.into())
    }
}

impl fmt::Debug for Resolve {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Resolve({})", self.target.id())
    }
}

impl fmt::Debug for Reject {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Reject({})", self.target.id())
    }
}

impl From<Resolve> for Value {
    fn from(resolve: Resolve) -> Self {
        Value::Function(Function::named("resolve", move |_this, args| {
            resolve.resolve(arg(args, 0));
            Ok(Value::Undefined)
        }))
    }
}

impl From<Reject> for Value {
    fn from(reject: Reject) -> Self {
        Value::Function(Function::named("reject", move |_this, args| {
            reject.reject(arg(args, 0));
            Ok(Value::Undefined)
        }))
    }
}

// ============================================================================
// Event loop entry points
// ============================================================================

impl EventLoop {
    /// Create a deferred value bound to this loop. See [`Deferred::new`].
    pub fn create<F>(
        &self,
        setup: F,
    ) -> Deferred
    where
        F: FnOnce(Resolve, Reject) -> Result<(), Value>,
    {
        Deferred::new(self, setup)
    }

    /// A pending deferred value with its capabilities exposed.
    #[inline]
    pub fn harness(&self) -> Harness {
        harness(self)
    }
}

#[cfg(test)]
mod tests;
