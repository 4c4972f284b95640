//! Detected children and read access to them.

use core::ops::Deref;
use hashbrown::{HashMap, HashSet};
use loom_system::class::Class;
use loom_system::index::{KeyedIndex, ObjectRegistry, RegistryError};
use loom_system::object::Object;
use parking_lot::{Mutex, RwLock};

use crate::detector::DetectorId;

/// Registry of the children detected on one owning object.
///
/// Indices start at 0, follow registration order and are never reused.
/// Dereferences to [`ObjectRegistry`] for lookup.
#[derive(Debug, Clone, Default)]
pub struct ChildrenRegistry(ObjectRegistry);

impl ChildrenRegistry {
    /// Registers `child` under the next index.
    fn register(&mut self, child: Object) -> Result<KeyedIndex, RegistryError> {
        let index = self.0.allocate();
        self.0.insert(index, child)?;
        Ok(index)
    }
}

impl Deref for ChildrenRegistry {
    type Target = ObjectRegistry;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Detection state kept in an owner's extensions.
///
/// Only ever borrowed shared from the extension map. Mutation goes through the
/// inner locks, none of which is held while a child is being constructed.
#[derive(Default)]
pub(crate) struct DetectState {
    /// Names collected by each detector's ancestry pass, awaiting the instance pass.
    pending: Mutex<HashMap<DetectorId, Vec<String>>>,
    /// Attribute names already registered, across all detectors.
    registered: Mutex<HashSet<String>>,
    children: RwLock<ChildrenRegistry>,
}

impl DetectState {
    pub(crate) fn set_pending(&self, detector: DetectorId, names: Vec<String>) {
        self.pending.lock().insert(detector, names);
    }

    pub(crate) fn take_pending(&self, detector: DetectorId) -> Vec<String> {
        self.pending.lock().remove(&detector).unwrap_or_default()
    }

    /// Claims `name` for registration. Returns `false` if it was already claimed.
    pub(crate) fn claim(&self, name: &str) -> bool {
        self.registered.lock().insert(name.to_owned())
    }

    pub(crate) fn register(&self, child: Object) -> Result<KeyedIndex, RegistryError> {
        self.children.write().register(child)
    }
}

/// Read access to the children detected on an object.
///
/// Objects whose class has no detector simply report no children.
///
/// # Example
///
/// ```
/// use loom_detect::{AutoDetect, DetectExt};
/// use loom_system::prelude::*;
///
/// let label = ClassBuilder::new("Label").component().build();
/// let detector = AutoDetect::of([&label]).unwrap();
///
/// let authority = TypeAuthority::new();
/// let dialog = ClassBuilder::new("Dialog").build();
/// let dialog = authority.compose(&dialog, detector).unwrap();
///
/// let owner = authority.construct(&dialog, Vec::new()).unwrap();
/// assert!(owner.children().is_empty());
/// assert!(owner.search_children_by_type(&label).is_empty());
/// ```
pub trait DetectExt {
    /// Returns a snapshot of the detected children.
    fn children(&self) -> ChildrenRegistry;

    /// Returns the index of every child that is an instance of `class`, in
    /// registration order.
    fn search_children_by_type(&self, class: &Class) -> Vec<KeyedIndex>;
}

impl DetectExt for Object {
    fn children(&self) -> ChildrenRegistry {
        self.extensions()
            .get::<DetectState>()
            .map(|state| state.children.read().clone())
            .unwrap_or_default()
    }

    fn search_children_by_type(&self, class: &Class) -> Vec<KeyedIndex> {
        self.extensions()
            .get::<DetectState>()
            .map(|state| state.children.read().search_by_class(class))
            .unwrap_or_default()
    }
}
