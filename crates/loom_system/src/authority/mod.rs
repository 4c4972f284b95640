//! Construction authority.
//!
//! [`TypeAuthority`] is the runtime that composes classes and constructs
//! objects. It owns the lifecycle caches used by the two construction
//! policies a class can be bound to:
//!
//! | [`Authority`] | Behavior |
//! |---------------|----------|
//! | none | every call builds a fresh object |
//! | [`Authority::Singleton`] | first call builds and caches, later calls return the cache |
//! | [`Authority::Multiton`] | every call builds a new object at the next [`KeyedIndex`] |
//!
//! Whatever the policy, each freshly built object goes through the full
//! construction path: initializers, then the pre and post hook chains.
//!
//! # Example
//!
//! ```
//! use loom_system::authority::{Authority, TypeAuthority};
//! use loom_system::class::ClassBuilder;
//! use loom_system::value::Value;
//!
//! let authority = TypeAuthority::new();
//! let settings = ClassBuilder::new("Settings")
//!     .init(|_, object, args| {
//!         object.set_attr("theme", args.first().cloned().unwrap_or_default());
//!         Ok(())
//!     })
//!     .build();
//! let settings = authority.compose(&settings, Authority::Singleton).unwrap();
//!
//! let first = authority.construct(&settings, vec![Value::from("dark")]).unwrap();
//! let second = authority.construct(&settings, vec![Value::from("light")]).unwrap();
//!
//! assert_eq!(first, second);
//! assert_eq!(second.get_attr("theme"), Some(Value::from("dark")));
//! ```

mod cache;

pub use cache::{MultitonCache, SingletonCache};

use crate::class::Class;
use crate::index::{IndexState, KeyedIndex, ObjectRegistry};
use core::ops::Deref;
use crate::object::{Object, ObjectError};
use crate::value::Value;
use core::fmt;
use std::borrow::Cow;

// ─────────────────────────────────────────────────────────────────────────────
// Authority
// ─────────────────────────────────────────────────────────────────────────────

/// A construction policy that replaces a class's construction entry point.
///
/// At most one authority can be bound to a lineage, and once bound it cannot
/// be replaced by a different one. An authority never appears in a class's
/// ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authority {
    /// One shared instance per class.
    Singleton,
    /// A new instance per call, each stored under its own [`KeyedIndex`].
    Multiton,
}

impl Authority {
    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Singleton => "Singleton",
            Self::Multiton => "Multiton",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AuthorityConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for a [`TypeAuthority`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    /// Prefix of the name bound to each Multiton instance (`instance_0`, ...).
    pub multiton_prefix: Cow<'static, str>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            multiton_prefix: Cow::Borrowed("instance_"),
        }
    }
}

impl AuthorityConfig {
    /// Sets the Multiton name prefix.
    #[must_use]
    pub fn with_multiton_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.multiton_prefix = prefix.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TypeAuthority
// ─────────────────────────────────────────────────────────────────────────────

/// Composes classes and constructs their instances.
///
/// Singleton and Multiton caches live here rather than in global state: two
/// authorities never share instances. Create one at startup and pass it by
/// reference; it is `Send + Sync`.
#[derive(Default)]
pub struct TypeAuthority {
    config: AuthorityConfig,
    singletons: SingletonCache,
    multitons: MultitonCache,
}

impl TypeAuthority {
    /// Creates an authority with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an authority with the given configuration.
    #[must_use]
    pub fn with_config(config: AuthorityConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    /// Constructs an instance of `class` through its bound authority.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by an initializer or construction hook.
    pub fn construct(&self, class: &Class, args: Vec<Value>) -> Result<Object, ObjectError> {
        match class.authority() {
            None => self.construct_default(class, args),
            Some(Authority::Singleton) => self.construct_singleton(class, args),
            Some(Authority::Multiton) => {
                let index = self.multitons.allocate(class.id());
                self.construct_multiton_at(class, index, args)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Singleton
    // ─────────────────────────────────────────────────────────────────────────

    fn construct_singleton(&self, class: &Class, args: Vec<Value>) -> Result<Object, ObjectError> {
        if let Some(existing) = self.singletons.get(class.id()) {
            tracing::trace!(
                target: "loom::singleton",
                class = %class.name(),
                discarded_args = args.len(),
                "returning cached singleton"
            );
            return Ok(existing);
        }

        tracing::debug!(
            target: "loom::singleton",
            class = %class.name(),
            "creating singleton instance"
        );
        let object = self.construct_default(class, args)?;
        Ok(self.singletons.insert_if_vacant(class.id(), object))
    }

    /// Returns the cached Singleton instance of `class` without constructing.
    #[must_use]
    pub fn singleton(&self, class: &Class) -> Option<Object> {
        self.singletons.get(class.id())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Multiton
    // ─────────────────────────────────────────────────────────────────────────

    /// Constructs a Multiton instance at an explicit index value.
    ///
    /// Only an index that was allocated but not yet filled is built. If the
    /// index is occupied, the existing instance is returned and nothing is
    /// rebuilt. The allocation counter is never advanced.
    ///
    /// # Errors
    ///
    /// - [`ObjectError::NotMultiton`] if `class` is not bound to
    ///   [`Authority::Multiton`]
    /// - [`ObjectError::UnallocatedIndex`] if the counter has not reached `index`
    /// - [`ObjectError::RetiredIndex`] if the instance at `index` was removed
    /// - any error raised while building the instance
    pub fn construct_at(
        &self,
        class: &Class,
        index: usize,
        args: Vec<Value>,
    ) -> Result<Object, ObjectError> {
        if class.authority() != Some(Authority::Multiton) {
            return Err(ObjectError::NotMultiton {
                class: class.name().to_owned(),
            });
        }
        let keyed = self.multitons.index_at(class.id(), index);
        match self.multitons.state(class.id(), keyed) {
            IndexState::Pending | IndexState::Ready(_) => {
                self.construct_multiton_at(class, keyed, args)
            }
            IndexState::Unallocated => Err(ObjectError::UnallocatedIndex {
                class: class.name().to_owned(),
                index,
            }),
            IndexState::Retired => Err(ObjectError::RetiredIndex {
                class: class.name().to_owned(),
                index,
            }),
        }
    }

    fn construct_multiton_at(
        &self,
        class: &Class,
        index: KeyedIndex,
        args: Vec<Value>,
    ) -> Result<Object, ObjectError> {
        if let Some(existing) = self.multitons.get(class.id(), index) {
            tracing::warn!(
                target: "loom::multiton",
                class = %class.name(),
                %index,
                "refusing multiton instance, index already populated"
            );
            return Ok(existing);
        }

        tracing::debug!(
            target: "loom::multiton",
            class = %class.name(),
            %index,
            "creating multiton instance"
        );
        let object = self.construct_default(class, args)?;
        let name = format!("{}{}", self.config.multiton_prefix, index);

        match self
            .multitons
            .insert(class.id(), index, name, object.clone())
        {
            Ok(()) => Ok(object),
            Err(error) => {
                // Filled while this instance was building.
                tracing::warn!(
                    target: "loom::multiton",
                    class = %class.name(),
                    %index,
                    %error,
                    "refusing multiton instance"
                );
                self.multitons
                    .get(class.id(), index)
                    .map_or(Ok(object), Ok)
            }
        }
    }

    /// Resolves a Multiton index of `class`.
    #[must_use]
    pub fn resolve_multiton(&self, class: &Class, index: KeyedIndex) -> Option<Object> {
        self.multitons.get(class.id(), index)
    }

    /// Looks up a Multiton instance by its bound name, e.g. `instance_0`.
    #[must_use]
    pub fn multiton_instance(&self, class: &Class, name: &str) -> Option<Object> {
        self.multitons.by_name(class.id(), name)
    }

    /// Returns a read-only snapshot of every Multiton instance of `class`.
    #[must_use]
    pub fn multiton_instances(&self, class: &Class) -> Option<MultitonInstances> {
        self.multitons.snapshot(class.id()).map(MultitonInstances)
    }

    /// Removes a Multiton instance. Its index value is never reallocated.
    pub fn remove_multiton_instance(&self, class: &Class, index: KeyedIndex) -> Option<Object> {
        self.multitons.remove(class.id(), index)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MultitonInstances
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only snapshot of the Multiton instances of one class.
///
/// Dereferences to [`ObjectRegistry`] for lookup. Its indices resolve both
/// here and through [`TypeAuthority::resolve_multiton`]. Changes to the
/// authority after the snapshot was taken are not reflected.
#[derive(Debug, Clone)]
pub struct MultitonInstances(ObjectRegistry);

impl Deref for MultitonInstances {
    type Target = ObjectRegistry;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for TypeAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeAuthority")
            .field("config", &self.config)
            .field("singletons", &self.singletons.len())
            .finish_non_exhaustive()
    }
}
