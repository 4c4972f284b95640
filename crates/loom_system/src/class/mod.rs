//! Class descriptors and the builder that declares them.
//!
//! A [`Class`] is a cheap, immutable handle to a runtime class descriptor:
//! a name, an optional parent, its own attribute table, an optional
//! initializer, and everything composition has recorded on it (applied
//! mixins, the bound [`Authority`], and the construction hook chain).
//!
//! Classes are declared with [`ClassBuilder`] and extended with
//! [`Class::compose`](crate::compose). Neither ever mutates an existing class;
//! both produce a new descriptor.
//!
//! # Ancestry
//!
//! Each class has at most one parent. The linearized ancestry is the chain
//! from the class itself up to its root, and attribute lookup walks it from
//! most specific to most general.
//!
//! # Example
//!
//! ```
//! use loom_system::class::ClassBuilder;
//! use loom_system::value::Value;
//!
//! let widget = ClassBuilder::new("Widget")
//!     .attr("visible", true)
//!     .component()
//!     .build();
//!
//! let button = ClassBuilder::new("Button")
//!     .extends(&widget)
//!     .attr("label", "OK")
//!     .build();
//!
//! assert!(button.is_subclass_of(&widget));
//! assert!(button.is_component());
//! assert_eq!(button.get_attr("visible"), Some(Value::Bool(true)));
//! ```

mod builder;

pub use builder::ClassBuilder;

use crate::authority::{Authority, TypeAuthority};
use crate::mixin::{HookChain, IntoComposables, Mixin};
use crate::object::{Object, ObjectError};
use crate::value::{Attributes, Value};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::HashSet;
use std::sync::Arc;

/// Unique identifier for a class descriptor.
///
/// Every built or composed class receives a fresh id, so two compositions of
/// the same base with the same traits are distinct classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A class's own initializer.
///
/// Runs during core construction, before any construction hook. Receives the
/// authority so it can construct other classes.
pub type Initializer =
    Arc<dyn Fn(&TypeAuthority, &Object, &[Value]) -> Result<(), ObjectError> + Send + Sync>;

/// Shared descriptor data.
pub(crate) struct ClassData {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) parent: Option<Class>,
    pub(crate) attributes: Attributes,
    pub(crate) initializer: Option<Initializer>,
    /// Applied mixins in application order.
    pub(crate) applied: Vec<Mixin>,
    /// Attribute names contributed by applied mixins.
    pub(crate) mixin_names: HashSet<String>,
    pub(crate) authority: Option<Authority>,
    pub(crate) hooks: HookChain,
    pub(crate) component: bool,
}

/// Handle to an immutable class descriptor.
///
/// Cloning is cheap. Equality is identity: two handles are equal when they
/// refer to the same descriptor.
#[derive(Clone)]
pub struct Class(pub(crate) Arc<ClassData>);

impl Class {
    pub(crate) fn from_data(data: ClassData) -> Self {
        Self(Arc::new(data))
    }

    /// Returns the class id.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.0.id
    }

    /// Returns the display name, e.g. `Widget<AutoDetect<Button>>`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the direct parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// Returns the linearized ancestry, most specific first.
    ///
    /// The first element is always `self`.
    #[must_use]
    pub fn ancestry(&self) -> Vec<Class> {
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(class) = current {
            current = class.parent().cloned();
            chain.push(class);
        }
        chain
    }

    /// Returns `true` if `self` is `other` or descends from it.
    #[must_use]
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Returns the attributes declared on this class itself.
    #[must_use]
    pub fn own_attributes(&self) -> &Attributes {
        &self.0.attributes
    }

    /// Looks up an attribute along the ancestry, most specific first.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(value) = class.0.attributes.get(name) {
                return Some(value.clone());
            }
            current = class.parent();
        }
        None
    }

    /// Merges the own attributes of every ancestor into one table.
    ///
    /// Walks from the most general ancestor to `self`, so the most specific
    /// definition of a name wins while the first declaration fixes its
    /// position in the table.
    #[must_use]
    pub fn gather_ancestry_attributes(&self) -> Attributes {
        let mut members = Attributes::new();
        for class in self.ancestry().iter().rev() {
            for (name, value) in class.own_attributes() {
                members.insert(name.clone(), value.clone());
            }
        }
        tracing::trace!(
            target: "loom::compose",
            class = %self.name(),
            members = members.len(),
            "gathered ancestry attributes"
        );
        members
    }

    /// Returns the initializer declared on this class itself.
    #[must_use]
    pub fn initializer(&self) -> Option<&Initializer> {
        self.0.initializer.as_ref()
    }

    /// Returns the construction authority bound to this lineage.
    #[must_use]
    pub fn authority(&self) -> Option<Authority> {
        self.0.authority
    }

    /// Returns the applied mixins in application order.
    #[must_use]
    pub fn applied_mixins(&self) -> &[Mixin] {
        &self.0.applied
    }

    /// Returns `true` if `mixin` has been applied to this lineage.
    #[must_use]
    pub fn has_mixin(&self, mixin: &Mixin) -> bool {
        self.0.applied.iter().any(|applied| applied.id() == mixin.id())
    }

    /// Returns `true` if every requested mixin and authority is recorded.
    ///
    /// # Example
    ///
    /// ```
    /// use loom_system::authority::Authority;
    /// use loom_system::class::ClassBuilder;
    /// use loom_system::mixin::Mixin;
    ///
    /// let sized = Mixin::builder("Sized").attr("width", 10).build();
    /// let base = ClassBuilder::new("Panel").build();
    /// let panel = base.compose((sized.clone(), Authority::Singleton)).unwrap();
    ///
    /// assert!(panel.has_traits((&sized, Authority::Singleton)));
    /// assert!(!panel.has_traits(Authority::Multiton));
    /// ```
    #[must_use]
    pub fn has_traits(&self, traits: impl IntoComposables) -> bool {
        use crate::mixin::Composable;

        traits
            .into_composables()
            .iter()
            .all(|composable| match composable {
                Composable::Mixin(mixin) => self.has_mixin(mixin),
                Composable::Authority(authority) => self.authority() == Some(*authority),
            })
    }

    /// Returns `true` if this class carries the component capability.
    ///
    /// Only component classes can be auto-detection targets.
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.0.component
    }

    /// Returns the construction hook chain.
    #[must_use]
    pub fn hooks(&self) -> &HookChain {
        &self.0.hooks
    }

    pub(crate) fn mixin_names(&self) -> &HashSet<String> {
        &self.0.mixin_names
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.0.id.get())
            .field("name", &self.0.name)
            .field("authority", &self.0.authority)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_starts_with_self() {
        let root = ClassBuilder::new("Root").build();
        let middle = ClassBuilder::new("Middle").extends(&root).build();
        let leaf = ClassBuilder::new("Leaf").extends(&middle).build();

        let names: Vec<_> = leaf.ancestry().iter().map(|c| c.name().to_owned()).collect();
        assert_eq!(names, vec!["Leaf", "Middle", "Root"]);
    }

    #[test]
    fn subclass_check_walks_parents() {
        let root = ClassBuilder::new("Root").build();
        let leaf = ClassBuilder::new("Leaf").extends(&root).build();
        let other = ClassBuilder::new("Other").build();

        assert!(leaf.is_subclass_of(&root));
        assert!(leaf.is_subclass_of(&leaf));
        assert!(!root.is_subclass_of(&leaf));
        assert!(!leaf.is_subclass_of(&other));
    }

    #[test]
    fn gather_prefers_most_specific() {
        let root = ClassBuilder::new("Root")
            .attr("a", 1)
            .attr("b", 2)
            .build();
        let leaf = ClassBuilder::new("Leaf")
            .extends(&root)
            .attr("b", 20)
            .attr("c", 30)
            .build();

        let members = leaf.gather_ancestry_attributes();
        let names: Vec<_> = members.keys().cloned().collect();

        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(members["b"], Value::Int(20));
        assert_eq!(leaf.get_attr("a"), Some(Value::Int(1)));
        assert_eq!(leaf.get_attr("missing"), None);
    }

    #[test]
    fn equality_is_identity() {
        let first = ClassBuilder::new("Widget").build();
        let second = ClassBuilder::new("Widget").build();

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
        assert_ne!(first.id(), second.id());
    }
}
