//! Dynamic attribute values.
//!
//! Every attribute stored on a [`Class`] or an [`Object`] is a [`Value`]. The
//! enum covers plain data, references to classes and instances, registry
//! handles, callable behavior contributed by mixins, and arbitrary Rust
//! payloads through [`Native`].
//!
//! # Example
//!
//! ```
//! use loom_system::value::{Attributes, Value};
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("title".into(), Value::from("main"));
//! attributes.insert("width".into(), Value::from(640));
//!
//! assert_eq!(attributes["title"].as_str(), Some("main"));
//! assert_eq!(attributes["width"].as_int(), Some(640));
//! ```

use crate::class::Class;
use crate::index::KeyedIndex;
use crate::object::{Object, ObjectError};
use core::fmt;
use downcast_rs::{DowncastSync, impl_downcast};
use indexmap::IndexMap;
use std::sync::Arc;

/// Insertion-ordered attribute table.
///
/// Re-inserting an existing name keeps its original position and replaces the
/// value, so merging tables from general to specific lets the most specific
/// value win without reordering.
pub type Attributes = IndexMap<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Native payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Arbitrary Rust data stored inside a [`Value`].
///
/// Implemented for every `Debug + Send + Sync + 'static` type. Use
/// [`Value::native`] to wrap a payload and [`Value::as_native`] to get it back.
pub trait Native: DowncastSync + fmt::Debug {}

impl_downcast!(sync Native);

impl<T: fmt::Debug + Send + Sync + 'static> Native for T {}

// ─────────────────────────────────────────────────────────────────────────────
// Method
// ─────────────────────────────────────────────────────────────────────────────

/// Signature of a callable attribute.
pub type MethodFn = dyn Fn(&Object, &[Value]) -> Result<Value, ObjectError> + Send + Sync;

/// A named callable attribute, usually contributed by a mixin.
///
/// Methods are invoked through [`Object::call`], which resolves the attribute
/// along the instance and class chain and passes the receiver explicitly.
#[derive(Clone)]
pub struct Method {
    name: Arc<str>,
    func: Arc<MethodFn>,
}

impl Method {
    /// Wraps a closure as a method.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, ObjectError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the method on `receiver`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the method body produces.
    pub fn call(&self, receiver: &Object, args: &[Value]) -> Result<Value, ObjectError> {
        (self.func)(receiver, args)
    }

    /// Returns `true` if both handles point at the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method({})", self.name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────────────────────────────────────

/// A dynamically typed attribute value.
///
/// Equality is structural for plain data and identity-based for classes,
/// objects, methods and native payloads.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// An owned string.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// An uninstantiated class.
    Class(Class),
    /// A constructed instance.
    Object(Object),
    /// A handle into an [`ObjectRegistry`](crate::index::ObjectRegistry).
    Index(KeyedIndex),
    /// A callable attribute.
    Method(Method),
    /// An arbitrary Rust payload.
    Native(Arc<dyn Native>),
}

impl Value {
    /// Wraps an arbitrary payload.
    pub fn native<T: Native>(payload: T) -> Self {
        Self::Native(Arc::new(payload))
    }

    /// Returns a short name for the variant, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Class(_) => "class",
            Self::Object(_) => "object",
            Self::Index(_) => "index",
            Self::Method(_) => "method",
            Self::Native(_) => "native",
        }
    }

    /// Returns `true` for [`Value::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the boolean, if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float, if this is a [`Value::Float`].
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the list items, if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the class, if this is a [`Value::Class`].
    #[must_use]
    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Returns the object, if this is a [`Value::Object`].
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the registry handle, if this is a [`Value::Index`].
    #[must_use]
    pub fn as_index(&self) -> Option<KeyedIndex> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// Returns the method, if this is a [`Value::Method`].
    #[must_use]
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Self::Method(method) => Some(method),
            _ => None,
        }
    }

    /// Downcasts a [`Value::Native`] payload to `T`.
    #[must_use]
    pub fn as_native<T: Native>(&self) -> Option<&T> {
        match self {
            Self::Native(payload) => payload.as_ref().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Index(a), Self::Index(b)) => a == b,
            (Self::Method(a), Self::Method(b)) => a.ptr_eq(b),
            (Self::Native(a), Self::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Class> for Value {
    fn from(class: Class) -> Self {
        Self::Class(class)
    }
}

impl From<&Class> for Value {
    fn from(class: &Class) -> Self {
        Self::Class(class.clone())
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<&Object> for Value {
    fn from(object: &Object) -> Self {
        Self::Object(object.clone())
    }
}

impl From<KeyedIndex> for Value {
    fn from(index: KeyedIndex) -> Self {
        Self::Index(index)
    }
}

impl From<Method> for Value {
    fn from(method: Method) -> Self {
        Self::Method(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Palette {
        name: &'static str,
    }

    #[test]
    fn plain_values_compare_structurally() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_eq!(Value::from("a"), Value::Str("a".into()));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_eq!(
            Value::from(vec![Value::from(true), Value::None]),
            Value::List(vec![Value::Bool(true), Value::None])
        );
    }

    #[test]
    fn accessors_match_variant() {
        let value = Value::from(42);
        assert_eq!(value.as_int(), Some(42));
        assert_eq!(value.as_str(), None);
        assert_eq!(value.kind(), "int");
        assert!(Value::default().is_none());
    }

    #[test]
    fn native_payload_downcasts() {
        let value = Value::native(Palette { name: "dark" });

        assert_eq!(value.as_native::<Palette>(), Some(&Palette { name: "dark" }));
        assert!(value.as_native::<String>().is_none());
        assert_eq!(value.kind(), "native");
    }

    #[test]
    fn native_payload_compares_by_identity() {
        let first = Value::native(Palette { name: "dark" });
        let second = Value::native(Palette { name: "dark" });

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn method_debug_shows_name() {
        let method = Method::new("noop", |_, _| Ok(Value::None));
        assert_eq!(format!("{method:?}"), "Method(noop)");
        assert!(method.ptr_eq(&method.clone()));
    }
}
