//! Runtime value type
//!
//! `Value` is the unified representation of everything that can flow through a
//! deferred value: fulfilment values, rejection reasons, handlers and foreign
//! thenables.
//! - Primitives are stored directly and compare structurally
//! - Objects, functions and deferred values are shared handles and compare by
//!   identity

use std::fmt;
use std::sync::Arc;

use crate::runtime::deferred::Deferred;
use crate::runtime::errors::DeferredError;

use super::{Function, Object};

/// Outcome of calling into a value: `Err` carries a raised value.
pub type Completion = Result<Value, Value>;

/// Value type tag, used for diagnostics and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Undefined,
    Null,
    Bool,
    Int,
    Float,
    String,
    List,
    Object,
    Function,
    Deferred,
    Error,
}

impl ValueType {
    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Undefined => "undefined",
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Object => "object",
            ValueType::Function => "function",
            ValueType::Deferred => "deferred",
            ValueType::Error => "error",
        }
    }
}

/// Runtime value
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value (missing handler, missing argument)
    #[default]
    Undefined,

    /// Explicit null
    Null,

    Bool(bool),

    Int(i64),

    Float(f64),

    /// Shared string
    String(Arc<str>),

    List(Vec<Value>),

    /// Property bag, possibly a foreign thenable
    Object(Object),

    /// Callable, possibly carrying properties of its own
    Function(Function),

    /// A deferred value; exposes a callable `then`
    Deferred(Deferred),

    /// Fault raised by the core
    Error(Arc<DeferredError>),
}

// ============================================================================
// Type Query Methods
// ============================================================================

impl Value {
    /// Get the type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undefined => ValueType::Undefined,
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Object(_) => ValueType::Object,
            Value::Function(_) => ValueType::Function,
            Value::Deferred(_) => ValueType::Deferred,
            Value::Error(_) => ValueType::Error,
        }
    }

    /// Type name for diagnostics
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// Check if the value can be called
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Objects and callables: the values that may expose a `then` property.
    ///
    /// `Undefined` and `Null` are never object-like.
    #[inline]
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Function(_) | Value::Deferred(_) | Value::Error(_)
        )
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            Value::Deferred(d) => Some(d),
            _ => None,
        }
    }

    /// Get the core fault carried by this value
    pub fn as_error(&self) -> Option<&DeferredError> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Identity comparison for shared values, structural for the rest.
    pub fn same_value(
        &self,
        other: &Value,
    ) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            (Value::Error(a), Value::Error(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }
}

// ============================================================================
// Property Access and Calls
// ============================================================================

impl Value {
    /// Read a property.
    ///
    /// Reading may raise when the property is an accessor. Primitives and
    /// values without the property yield `Undefined`.
    pub fn get(
        &self,
        key: &str,
    ) -> Completion {
        match self {
            Value::Object(obj) => obj.get(key, self),
            Value::Function(func) => func.properties().get(key, self),
            Value::Deferred(d) if key == "then" => Ok(Value::Function(d.then_function())),
            _ => Ok(Value::Undefined),
        }
    }

    /// Call this value with an explicit receiver.
    pub fn call(
        &self,
        this: &Value,
        args: &[Value],
    ) -> Completion {
        match self {
            Value::Function(func) => func.call(this, args),
            other => Err(DeferredError::NotCallable(other.type_name().to_string()).into()),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Value::Deferred(d)
    }
}

// ============================================================================
// Equality, Debug and Display
// ============================================================================

impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(fl) => write!(f, "Float({})", fl),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Object(obj) => fmt::Debug::fmt(obj, f),
            Value::Function(func) => fmt::Debug::fmt(func, f),
            Value::Deferred(d) => fmt::Debug::fmt(d, f),
            Value::Error(err) => write!(f, "Error({:?})", err),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(
                    f,
                    "[{}]",
                    items
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Object(obj) => write!(f, "object{{{}}}", obj.keys().join(", ")),
            Value::Function(func) => write!(f, "function {}", func.name()),
            Value::Deferred(d) => write!(f, "deferred({})", d.id()),
            Value::Error(err) => write!(f, "{}", err),
        }
    }
}
