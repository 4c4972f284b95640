//! Keyed handles and the registries they point into.
//!
//! A [`KeyedIndex`] is a plain integer key bound to one specific
//! [`ObjectRegistry`]. It never owns the object it names: resolving it always
//! goes through the registry, and a handle resolved against a different
//! registry resolves to nothing.
//!
//! Registries hand out indices from a monotonic counter. An index value is
//! never reused, even after its entry has been removed. Each value moves
//! through [`IndexState`] in one direction only:
//! `Unallocated -> Pending -> Ready -> Retired`.
//!
//! # Example
//!
//! ```
//! use loom_system::index::ObjectRegistry;
//!
//! let mut registry = ObjectRegistry::new();
//! let first = registry.allocate();
//! let second = registry.allocate();
//!
//! assert_eq!(first.value(), 0);
//! assert_eq!(second.value(), 1);
//! assert!(first.is_bound_to(&registry));
//! assert!(registry.resolve(first).is_none()); // allocated but empty
//! ```

use crate::class::Class;
use crate::object::Object;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashSet;
use indexmap::IndexMap;

/// Identity of a single [`ObjectRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryId(u64);

impl RegistryId {
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

/// An integer handle bound to one registry.
///
/// Displayed as its bare integer value, which is also how it appears in
/// attribute names such as `child_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyedIndex {
    registry: RegistryId,
    value: usize,
}

impl KeyedIndex {
    /// Returns the integer value of the handle.
    #[must_use]
    pub fn value(&self) -> usize {
        self.value
    }

    /// Returns the registry this handle is bound to.
    #[must_use]
    pub fn registry(&self) -> RegistryId {
        self.registry
    }

    /// Returns `true` if this handle was issued for `registry`.
    #[must_use]
    pub fn is_bound_to(&self, registry: &ObjectRegistry) -> bool {
        self.registry == registry.id
    }
}

impl fmt::Display for KeyedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Errors that can occur when writing to a registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The index already names an object.
    #[error("index {0} is already occupied")]
    Occupied(KeyedIndex),

    /// The index was issued by a different registry.
    #[error("index {0} belongs to another registry")]
    ForeignIndex(KeyedIndex),

    /// The counter has not reached this index yet.
    #[error("index {0} has not been allocated")]
    Unallocated(KeyedIndex),

    /// The index named an object that has since been removed.
    #[error("index {0} has been retired")]
    Retired(KeyedIndex),
}

/// Lifecycle of one index value within its registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    /// The counter has not reached this value.
    Unallocated,
    /// Allocated, no object stored yet.
    Pending,
    /// Names a stored object.
    Ready(Object),
    /// Its object was removed. The value is never used again.
    Retired,
}

/// Insertion-ordered map from [`KeyedIndex`] to [`Object`].
///
/// Used both for the per-class Multiton cache and for the per-object children
/// registry populated by auto-detection.
#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    id: RegistryId,
    next: usize,
    entries: IndexMap<KeyedIndex, Object>,
    names: IndexMap<String, KeyedIndex>,
    retired: HashSet<usize>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    /// Creates an empty registry with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: RegistryId::next(),
            next: 0,
            entries: IndexMap::new(),
            names: IndexMap::new(),
            retired: HashSet::new(),
        }
    }

    /// Returns this registry's identity.
    #[must_use]
    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Allocates the next sequential index.
    ///
    /// Allocation only moves forward. Removing an entry does not make its
    /// value available again.
    pub fn allocate(&mut self) -> KeyedIndex {
        let index = self.index_at(self.next);
        self.next += 1;
        index
    }

    /// Returns a handle for an arbitrary `value` without advancing the counter.
    #[must_use]
    pub fn index_at(&self, value: usize) -> KeyedIndex {
        KeyedIndex {
            registry: self.id,
            value,
        }
    }

    /// Returns the value the next call to [`allocate`](Self::allocate) will use.
    #[must_use]
    pub fn next_value(&self) -> usize {
        self.next
    }

    /// Returns where `index` is in its lifecycle.
    ///
    /// A foreign index is reported as [`IndexState::Unallocated`].
    #[must_use]
    pub fn state(&self, index: KeyedIndex) -> IndexState {
        if !index.is_bound_to(self) || index.value >= self.next {
            IndexState::Unallocated
        } else if let Some(object) = self.entries.get(&index) {
            IndexState::Ready(object.clone())
        } else if self.retired.contains(&index.value) {
            IndexState::Retired
        } else {
            IndexState::Pending
        }
    }

    /// Stores `object` at a pending `index`.
    ///
    /// An occupied index is never overwritten and a retired one never refilled.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ForeignIndex`] if `index` was issued elsewhere
    /// - [`RegistryError::Unallocated`] if the counter has not reached `index`
    /// - [`RegistryError::Occupied`] if `index` already names an object
    /// - [`RegistryError::Retired`] if `index` was removed
    pub fn insert(&mut self, index: KeyedIndex, object: Object) -> Result<(), RegistryError> {
        match self.state(index) {
            IndexState::Pending => {
                self.entries.insert(index, object);
                Ok(())
            }
            IndexState::Unallocated if !index.is_bound_to(self) => {
                Err(RegistryError::ForeignIndex(index))
            }
            IndexState::Unallocated => Err(RegistryError::Unallocated(index)),
            IndexState::Ready(_) => Err(RegistryError::Occupied(index)),
            IndexState::Retired => Err(RegistryError::Retired(index)),
        }
    }

    /// Binds an attribute-style name to an index, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ForeignIndex`] if `index` was issued elsewhere.
    pub fn bind_name(
        &mut self,
        name: impl Into<String>,
        index: KeyedIndex,
    ) -> Result<(), RegistryError> {
        if !index.is_bound_to(self) {
            return Err(RegistryError::ForeignIndex(index));
        }
        self.names.insert(name.into(), index);
        Ok(())
    }

    /// Resolves a handle to the object it names.
    #[must_use]
    pub fn resolve(&self, index: KeyedIndex) -> Option<&Object> {
        self.entries.get(&index)
    }

    /// Resolves a bound name such as `instance_0`.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Object> {
        self.names.get(name).and_then(|index| self.entries.get(index))
    }

    /// Returns `true` if `index` names an object.
    #[must_use]
    pub fn contains(&self, index: KeyedIndex) -> bool {
        self.entries.contains_key(&index)
    }

    /// Removes the object at `index`, preserving the order of the rest.
    ///
    /// The index is retired. The counter is unaffected.
    pub fn remove(&mut self, index: KeyedIndex) -> Option<Object> {
        let removed = self.entries.shift_remove(&index);
        if removed.is_some() {
            self.names.retain(|_, bound| *bound != index);
            self.retired.insert(index.value);
        }
        removed
    }

    /// Returns all handles in insertion order.
    #[must_use]
    pub fn indices(&self) -> Vec<KeyedIndex> {
        self.entries.keys().copied().collect()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (KeyedIndex, &Object)> {
        self.entries.iter().map(|(index, object)| (*index, object))
    }

    /// Returns every handle whose object is an instance of `class`, in order.
    #[must_use]
    pub fn search_by_class(&self, class: &Class) -> Vec<KeyedIndex> {
        self.entries
            .iter()
            .filter(|(_, object)| object.is_instance_of(class))
            .map(|(index, _)| *index)
            .collect()
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
