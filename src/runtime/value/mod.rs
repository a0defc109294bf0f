//! Dynamic values carried by deferred values
//!
//! Settlement values, rejection reasons and reaction handlers are all
//! [`Value`]s, so foreign thenables can be expressed without any knowledge
//! of this crate's own types.

pub mod function;
pub mod object;
pub mod runtime_value;

pub use function::{arg, Function};
pub use object::{Object, Property};
pub use runtime_value::*;
