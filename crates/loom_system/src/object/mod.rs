//! Constructed instances.
//!
//! An [`Object`] is a shared handle to an instance of a [`Class`]. It owns an
//! instance attribute table, the construction arguments its initializer chose
//! to save, and a type-keyed [`Extensions`] map where mixins keep private
//! per-instance state.
//!
//! Objects are only created through
//! [`TypeAuthority::construct`](crate::authority::TypeAuthority::construct).
//!
//! # Attribute Lookup
//!
//! [`Object::get_attr`] checks the instance table first, then walks the class
//! ancestry from most specific to most general.

mod extension;

pub use extension::{ExtensionError, ExtensionRef, ExtensionRefMut, Extensions};

use crate::class::Class;
use crate::value::{Attributes, Value};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use std::sync::Arc;

/// Boxed error raised by user code (initializers, methods, hooks).
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Errors that can occur while constructing or using an object.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// No attribute with this name exists on the object or its class chain.
    #[error("'{class}' has no attribute '{name}'")]
    MissingAttribute {
        /// Class of the receiver.
        class: String,
        /// Requested attribute name.
        name: String,
    },

    /// The attribute exists but is not a method.
    #[error("attribute '{name}' of '{class}' is not callable (found {kind})")]
    NotCallable {
        /// Class of the receiver.
        class: String,
        /// Requested attribute name.
        name: String,
        /// Kind of the value that was found.
        kind: &'static str,
    },

    /// A per-index construction was requested on a class that is not a Multiton.
    #[error("'{class}' is not bound to the Multiton authority")]
    NotMultiton {
        /// Class that was asked for.
        class: String,
    },

    /// A per-index construction named an index the counter has not reached.
    #[error("multiton index {index} of '{class}' has not been allocated")]
    UnallocatedIndex {
        /// Class that was asked for.
        class: String,
        /// Requested index value.
        index: usize,
    },

    /// A per-index construction named an index whose instance was removed.
    #[error("multiton index {index} of '{class}' has been retired")]
    RetiredIndex {
        /// Class that was asked for.
        class: String,
        /// Requested index value.
        index: usize,
    },

    /// An error raised by user code, passed through unchanged.
    #[error(transparent)]
    Custom(BoxError),
}

impl ObjectError {
    /// Wraps an error raised by an initializer, method or hook.
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Self::Custom(error.into())
    }
}

/// Unique identifier for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0
    }
}

struct ObjectData {
    id: ObjectId,
    class: Class,
    attributes: RwLock<Attributes>,
    saved_args: RwLock<Option<Vec<Value>>>,
    extensions: Extensions,
}

/// Shared handle to an instance.
///
/// Cloning is cheap. Equality is identity: two handles are equal only when
/// they refer to the same instance.
#[derive(Clone)]
pub struct Object(Arc<ObjectData>);

impl Object {
    /// Allocates a bare instance. Core construction only; no initializer runs.
    pub(crate) fn allocate(class: Class) -> Self {
        Self(Arc::new(ObjectData {
            id: ObjectId::next(),
            class,
            attributes: RwLock::new(Attributes::new()),
            saved_args: RwLock::new(None),
            extensions: Extensions::new(),
        }))
    }

    /// Returns the object id.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.0.id
    }

    /// Returns the class this object was constructed from.
    #[must_use]
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    /// Returns `true` if this object's class is `class` or descends from it.
    #[must_use]
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.0.class.is_subclass_of(class)
    }

    /// Returns `true` if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Looks up an attribute on the instance, then along the class chain.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.attributes.read().get(name) {
            return Some(value.clone());
        }
        self.0.class.get_attr(name)
    }

    /// Looks up an attribute, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectError::MissingAttribute`] if no such attribute exists.
    pub fn attr(&self, name: &str) -> Result<Value, ObjectError> {
        self.get_attr(name)
            .ok_or_else(|| ObjectError::MissingAttribute {
                class: self.0.class.name().to_owned(),
                name: name.to_owned(),
            })
    }

    /// Sets an instance attribute, returning the previous instance value.
    ///
    /// Class-level attributes are shadowed, never modified.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.attributes.write().insert(name.into(), value.into())
    }

    /// Removes an instance attribute, preserving the order of the rest.
    pub fn remove_attr(&self, name: &str) -> Option<Value> {
        self.0.attributes.write().shift_remove(name)
    }

    /// Returns `true` if the attribute is set on the instance itself.
    #[must_use]
    pub fn has_own_attr(&self, name: &str) -> bool {
        self.0.attributes.read().contains_key(name)
    }

    /// Returns a snapshot of the instance attribute table.
    #[must_use]
    pub fn own_attributes(&self) -> Attributes {
        self.0.attributes.read().clone()
    }

    /// Calls a method attribute with `self` as receiver.
    ///
    /// # Errors
    ///
    /// - [`ObjectError::MissingAttribute`] if the attribute does not exist
    /// - [`ObjectError::NotCallable`] if it is not a method
    /// - any error produced by the method itself
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ObjectError> {
        match self.attr(name)? {
            Value::Method(method) => method.call(self, args),
            other => Err(ObjectError::NotCallable {
                class: self.0.class.name().to_owned(),
                name: name.to_owned(),
                kind: other.kind(),
            }),
        }
    }

    /// Records construction arguments for replay into the hook chain.
    ///
    /// Initializers call this so that construction hooks see the arguments
    /// the instance was originally built with.
    pub fn save_args(&self, args: impl Into<Vec<Value>>) {
        *self.0.saved_args.write() = Some(args.into());
    }

    /// Returns the saved construction arguments, if any were recorded.
    #[must_use]
    pub fn saved_args(&self) -> Option<Vec<Value>> {
        self.0.saved_args.read().clone()
    }

    /// Returns the per-instance extension storage.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.0.extensions
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Attributes may reference other objects (or this one), so only
        // identity is printed.
        f.debug_struct("Object")
            .field("id", &self.0.id.get())
            .field("class", &self.0.class.name())
            .finish_non_exhaustive()
    }
}
