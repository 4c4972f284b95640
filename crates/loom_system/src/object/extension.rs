//! Per-object extension storage.
//!
//! [`Extensions`] is a type-keyed map attached to every
//! [`Object`](super::Object). Mixins use it for state that belongs to one
//! instance but must not appear in its attribute table, such as the scan list
//! and children registry of auto-detection.
//!
//! Each entry sits behind its own `RwLock`. Access is non-blocking: a
//! conflicting borrow fails with [`ExtensionError::BorrowConflict`] instead of
//! waiting, so re-entrant hooks cannot deadlock.

use core::any::{Any, TypeId};
use hashbrown::HashMap;
use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, RawRwLock, RwLock};
use std::sync::Arc;

type BoxedExtension = Box<dyn Any + Send + Sync>;

/// Errors that can occur during extension access.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtensionError {
    /// No extension of the requested type is stored.
    #[error("extension not found: {0}")]
    NotFound(&'static str),

    /// The extension is currently borrowed incompatibly.
    #[error("extension already borrowed: {0}")]
    BorrowConflict(&'static str),
}

/// Storage for a single extension.
type ExtensionEntry = Arc<RwLock<BoxedExtension>>;

/// Type-keyed storage owned by one object.
#[derive(Default)]
pub struct Extensions {
    storage: RwLock<HashMap<TypeId, ExtensionEntry>>,
}

impl Extensions {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts an extension, returning the previous value of the same type.
    ///
    /// If the previous value is currently borrowed, it is detached from the
    /// map but not returned.
    pub fn insert<T: Any + Send + Sync>(&self, value: T) -> Option<T> {
        let entry = Arc::new(RwLock::new(Box::new(value) as BoxedExtension));
        let previous = self.storage.write().insert(TypeId::of::<T>(), entry)?;
        Arc::into_inner(previous)
            .and_then(|lock| lock.into_inner().downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Removes and returns the extension of type `T`.
    ///
    /// Returns `None` if it is missing, or if it is still borrowed elsewhere
    /// (the entry is detached either way).
    pub fn remove<T: Any + Send + Sync>(&self) -> Option<T> {
        let entry = self.storage.write().remove(&TypeId::of::<T>())?;
        Arc::into_inner(entry)
            .and_then(|lock| lock.into_inner().downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Returns `true` if an extension of type `T` is stored.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.storage.read().contains_key(&TypeId::of::<T>())
    }

    /// Borrows the extension of type `T` immutably.
    ///
    /// # Errors
    ///
    /// - [`ExtensionError::NotFound`] if no such extension exists
    /// - [`ExtensionError::BorrowConflict`] if it is mutably borrowed
    pub fn get<T: Any + Send + Sync>(&self) -> Result<ExtensionRef<T>, ExtensionError> {
        let type_name = core::any::type_name::<T>();
        let entry = self.entry::<T>()?;
        let guard = entry
            .try_read_arc()
            .ok_or(ExtensionError::BorrowConflict(type_name))?;

        Ok(ExtensionRef {
            guard,
            _marker: core::marker::PhantomData,
        })
    }

    /// Borrows the extension of type `T` mutably.
    ///
    /// # Errors
    ///
    /// - [`ExtensionError::NotFound`] if no such extension exists
    /// - [`ExtensionError::BorrowConflict`] if it is already borrowed
    pub fn get_mut<T: Any + Send + Sync>(&self) -> Result<ExtensionRefMut<T>, ExtensionError> {
        let type_name = core::any::type_name::<T>();
        let entry = self.entry::<T>()?;
        let guard = entry
            .try_write_arc()
            .ok_or(ExtensionError::BorrowConflict(type_name))?;

        Ok(ExtensionRefMut {
            guard,
            _marker: core::marker::PhantomData,
        })
    }

    /// Returns the number of stored extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.read().len()
    }

    /// Returns `true` if no extensions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.read().is_empty()
    }

    fn entry<T: Any + Send + Sync>(&self) -> Result<ExtensionEntry, ExtensionError> {
        self.storage
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or(ExtensionError::NotFound(core::any::type_name::<T>()))
    }
}

/// RAII guard for immutable extension access.
///
/// Owns its lock handle, so it does not borrow the [`Extensions`] map and may
/// outlive concurrent inserts of other types.
pub struct ExtensionRef<T> {
    guard: ArcRwLockReadGuard<RawRwLock, BoxedExtension>,
    _marker: core::marker::PhantomData<T>,
}

impl<T: Any> core::ops::Deref for ExtensionRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // The entry was looked up by TypeId::of::<T>().
        self.guard
            .downcast_ref::<T>()
            .expect("extension type mismatch (this is a bug)")
    }
}

/// RAII guard for mutable extension access.
pub struct ExtensionRefMut<T> {
    guard: ArcRwLockWriteGuard<RawRwLock, BoxedExtension>,
    _marker: core::marker::PhantomData<T>,
}

impl<T: Any> core::ops::Deref for ExtensionRefMut<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.guard
            .downcast_ref::<T>()
            .expect("extension type mismatch (this is a bug)")
    }
}

impl<T: Any> core::ops::DerefMut for ExtensionRefMut<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
            .downcast_mut::<T>()
            .expect("extension type mismatch (this is a bug)")
    }
}
