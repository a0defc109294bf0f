//! Runtime system
//!
//! Dynamic values, the cooperative event loop and the deferred value state
//! machine built on top of them.

pub mod deferred;
pub mod errors;
pub mod scheduler;
pub mod value;
