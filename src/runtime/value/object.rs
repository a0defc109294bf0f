//! Shared property bags
//!
//! Objects are the shape foreign thenables take: anything with a callable
//! `then` property. Properties keep insertion order.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::{Completion, Function, Value};

/// A single property slot.
#[derive(Clone, Debug)]
pub enum Property {
    /// Plain stored value
    Data(Value),
    /// Getter invoked on every read, with the owning value as receiver.
    /// A getter that raises makes the read raise.
    Accessor(Function),
}

/// Shared, mutable property map with identity semantics.
#[derive(Clone, Default)]
pub struct Object {
    properties: Arc<RwLock<IndexMap<String, Property>>>,
}

impl Object {
    /// Create an empty object.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style data property insertion.
    pub fn with(
        self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.set(key, value);
        self
    }

    /// Set a data property, replacing any previous slot.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.properties
            .write()
            .insert(key.into(), Property::Data(value.into()));
    }

    /// Install an accessor property.
    pub fn define_getter(
        &self,
        key: impl Into<String>,
        getter: Function,
    ) {
        self.properties
            .write()
            .insert(key.into(), Property::Accessor(getter));
    }

    /// Read a property, running its getter if it has one.
    ///
    /// `receiver` is the value the read goes through, passed as `this` to
    /// getters. The lock is released before any getter runs.
    pub fn get(
        &self,
        key: &str,
        receiver: &Value,
    ) -> Completion {
        let slot = self.properties.read().get(key).cloned();
        match slot {
            None => Ok(Value::Undefined),
            Some(Property::Data(value)) => Ok(value),
            Some(Property::Accessor(getter)) => getter.call(receiver, &[]),
        }
    }

    /// Check if the property exists (accessors are not run).
    pub fn has(
        &self,
        key: &str,
    ) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Remove a property, returning its slot.
    pub fn remove(
        &self,
        key: &str,
    ) -> Option<Property> {
        self.properties.write().shift_remove(key)
    }

    /// Property names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(
        &self,
        other: &Object,
    ) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }
}

impl fmt::Debug for Object {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .finish()
    }
}
