//! Callable values

use std::fmt;
use std::sync::Arc;

use super::{Completion, Object, Value};

type NativeFn = dyn Fn(&Value, &[Value]) -> Completion + Send + Sync;

struct FunctionInner {
    name: String,
    call: Box<NativeFn>,
    properties: Object,
}

/// A shared callable.
///
/// Called with a receiver (`this`) and a list of arguments. Missing arguments
/// read as `Undefined`. A function may carry properties, so callables can be
/// thenables too.
#[derive(Clone)]
pub struct Function {
    inner: Arc<FunctionInner>,
}

impl Function {
    /// Create an anonymous function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Completion + Send + Sync + 'static,
    {
        Self::named("anonymous", f)
    }

    /// Create a function with a name used in diagnostics.
    pub fn named<F>(
        name: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> Completion + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                call: Box::new(f),
                properties: Object::new(),
            }),
        }
    }

    /// Single-argument function ignoring its receiver; the usual shape of a
    /// reaction handler.
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Value) -> Completion + Send + Sync + 'static,
    {
        Self::new(move |_this, args| f(arg(args, 0)))
    }

    /// Invoke the function.
    #[inline]
    pub fn call(
        &self,
        this: &Value,
        args: &[Value],
    ) -> Completion {
        (self.inner.call)(this, args)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Properties attached to the function itself.
    #[inline]
    pub fn properties(&self) -> &Object {
        &self.inner.properties
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(
        &self,
        other: &Function,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Function {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .finish()
    }
}

/// Positional argument, `Undefined` when absent.
#[inline]
pub fn arg(
    args: &[Value],
    index: usize,
) -> Value {
    args.get(index).cloned().unwrap_or_default()
}
