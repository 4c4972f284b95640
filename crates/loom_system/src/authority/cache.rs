//! Lifecycle caches owned by a [`TypeAuthority`](super::TypeAuthority).
//!
//! Both caches lock only around individual reads and writes. No lock is held
//! while an instance is being built, so construction may recurse into other
//! authority-bound classes. The price is that two threads racing on the first
//! construction of the same class may both build an instance; the cache keeps
//! whichever was stored first.

use crate::class::ClassId;
use crate::index::{IndexState, KeyedIndex, ObjectRegistry, RegistryError};
use crate::object::Object;
use hashbrown::HashMap;
use parking_lot::Mutex;

/// One shared instance per class.
#[derive(Default)]
pub struct SingletonCache {
    instances: Mutex<HashMap<ClassId, Object>>,
}

impl SingletonCache {
    /// Returns the cached instance for `class`.
    #[must_use]
    pub fn get(&self, class: ClassId) -> Option<Object> {
        self.instances.lock().get(&class).cloned()
    }

    /// Caches `object` unless an instance is already cached.
    ///
    /// Returns the instance that ends up cached.
    pub fn insert_if_vacant(&self, class: ClassId, object: Object) -> Object {
        self.instances.lock().entry(class).or_insert(object).clone()
    }

    /// Returns the number of cached instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}

/// One [`ObjectRegistry`] per class.
#[derive(Default)]
pub struct MultitonCache {
    registries: Mutex<HashMap<ClassId, ObjectRegistry>>,
}

impl MultitonCache {
    /// Allocates the next index for `class`.
    pub fn allocate(&self, class: ClassId) -> KeyedIndex {
        self.registries
            .lock()
            .entry(class)
            .or_default()
            .allocate()
    }

    /// Returns the handle for an explicit index value of `class`.
    pub fn index_at(&self, class: ClassId, value: usize) -> KeyedIndex {
        self.registries
            .lock()
            .entry(class)
            .or_default()
            .index_at(value)
    }

    /// Returns the object stored at `index` for `class`.
    #[must_use]
    pub fn get(&self, class: ClassId, index: KeyedIndex) -> Option<Object> {
        self.registries
            .lock()
            .get(&class)
            .and_then(|registry| registry.resolve(index).cloned())
    }

    /// Returns where `index` of `class` is in its lifecycle.
    #[must_use]
    pub fn state(&self, class: ClassId, index: KeyedIndex) -> IndexState {
        self.registries
            .lock()
            .get(&class)
            .map_or(IndexState::Unallocated, |registry| registry.state(index))
    }

    /// Returns the object bound to `name` for `class`.
    #[must_use]
    pub fn by_name(&self, class: ClassId, name: &str) -> Option<Object> {
        self.registries
            .lock()
            .get(&class)
            .and_then(|registry| registry.by_name(name).cloned())
    }

    /// Stores `object` at `index` and binds `name` to it.
    ///
    /// # Errors
    ///
    /// Returns the registry error unless the index is pending. The stored
    /// object is left untouched.
    pub fn insert(
        &self,
        class: ClassId,
        index: KeyedIndex,
        name: String,
        object: Object,
    ) -> Result<(), RegistryError> {
        let mut registries = self.registries.lock();
        let registry = registries.entry(class).or_default();
        registry.insert(index, object)?;
        registry.bind_name(name, index)
    }

    /// Removes the object at `index` for `class`.
    ///
    /// The index value is not reused.
    pub fn remove(&self, class: ClassId, index: KeyedIndex) -> Option<Object> {
        self.registries
            .lock()
            .get_mut(&class)
            .and_then(|registry| registry.remove(index))
    }

    /// Returns a snapshot of the registry for `class`.
    #[must_use]
    pub fn snapshot(&self, class: ClassId) -> Option<ObjectRegistry> {
        self.registries.lock().get(&class).cloned()
    }
}
