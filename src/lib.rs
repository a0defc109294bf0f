//! Thenable
//!
//! Single-assignment deferred values with interoperable `then` chaining.
//!
//! A [`Deferred`] settles once, to a value or a failure reason. Reactions
//! attached with [`Deferred::then`] run on later turns of an [`EventLoop`],
//! and whatever they return is unwrapped by the resolution procedure, which
//! adopts the state of any thenable it is handed.
//!
//! # Example
//!
//! ```
//! use thenable::{DeferredState, EventLoop, Function, Value};
//!
//! let event_loop = EventLoop::new();
//! let failed = event_loop.create(|_resolve, reject| {
//!     reject.reject("boom");
//!     Ok(())
//! });
//! let recovered = failed.then(
//!     Value::Undefined,
//!     Function::unary(|reason| Ok(format!("{}!", reason).into())),
//! );
//!
//! event_loop.run().unwrap();
//! assert_eq!(recovered.state(), DeferredState::Fulfilled("boom!".into()));
//! ```

#![doc(html_root_url = "https://docs.rs/thenable")]
#![warn(rust_2018_idioms)]

pub mod runtime;
pub mod util;

pub use runtime::deferred::resolution::resolve;
pub use runtime::deferred::{harness, Deferred, DeferredId, DeferredState, Harness, Reject, Resolve};
pub use runtime::errors::{DeferredError, DeferredResult};
pub use runtime::scheduler::{EventLoop, TaskId, WeakEventLoop};
pub use runtime::value::{Completion, Function, Object, Property, Value, ValueType};
pub use util::config::{EventLoopConfig, RuntimeConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
