//! The auto-detection mixin.
//!
//! A detector is specialized for a set of target classes. Composed into an
//! owner class, it scans the owner for attributes holding a target class or
//! an instance of one, instantiates bare classes with the owner as sole
//! argument, and registers every child in the owner's [`ChildrenRegistry`].
//!
//! The scan runs in two passes during the owner's construction:
//!
//! 1. the pre hook scans the attributes gathered along the owner's ancestry
//! 2. the post hook scans the instance attributes set by initializers, then
//!    instantiates and registers everything found, in order
//!
//! A class bound to [`Authority::Multiton`] is never instantiated
//! automatically; only existing instances of it are registered.
//!
//! [`ChildrenRegistry`]: crate::ChildrenRegistry

use core::sync::atomic::{AtomicU64, Ordering};
use std::borrow::Cow;

use loom_system::authority::{Authority, TypeAuthority};
use loom_system::class::Class;
use loom_system::compose::CompositionError;
use loom_system::mixin::Mixin;
use loom_system::object::{Object, ObjectError};
use loom_system::value::{Attributes, Value};

use crate::children::{DetectExt, DetectState};

/// Unique identifier for a specialized detector.
///
/// Keeps the pending scan of one detector apart from another's when several
/// are composed into the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DetectorId(u64);

impl DetectorId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Specializes the auto-detection mixin.
///
/// # Example
///
/// ```
/// use loom_detect::{AutoDetect, DetectExt};
/// use loom_system::prelude::*;
///
/// let button = ClassBuilder::new("Button")
///     .component()
///     .init(|_, child, args| {
///         child.set_attr("parent", args.first().cloned().unwrap_or_default());
///         Ok(())
///     })
///     .build();
///
/// let toolbar = ClassBuilder::new("Toolbar")
///     .attr("ok", &button)
///     .attr("cancel", &button)
///     .build();
///
/// let authority = TypeAuthority::new();
/// let toolbar = authority
///     .compose(&toolbar, AutoDetect::of([&button]).unwrap())
///     .unwrap();
/// let owner = authority.construct(&toolbar, Vec::new()).unwrap();
///
/// assert_eq!(owner.search_children_by_type(&button).len(), 2);
/// assert!(owner.get_attr("child_1").is_some());
/// ```
pub struct AutoDetect;

impl AutoDetect {
    /// Creates a detector for `targets` with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::InvalidDetectTarget`] if a target is not
    /// a component class.
    pub fn of<'a>(targets: impl IntoIterator<Item = &'a Class>) -> Result<Mixin, CompositionError> {
        targets
            .into_iter()
            .fold(Self::builder(), AutoDetectBuilder::target)
            .build()
    }

    /// Starts configuring a detector.
    pub fn builder() -> AutoDetectBuilder {
        AutoDetectBuilder::default()
    }
}

/// Configures an auto-detection mixin.
#[must_use]
#[derive(Debug, Clone)]
pub struct AutoDetectBuilder {
    targets: Vec<Class>,
    child_prefix: Cow<'static, str>,
}

impl Default for AutoDetectBuilder {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            child_prefix: Cow::Borrowed("child_"),
        }
    }
}

impl AutoDetectBuilder {
    /// Adds a target class.
    pub fn target(mut self, class: &Class) -> Self {
        self.targets.push(class.clone());
        self
    }

    /// Sets the prefix of the index attributes set on the owner
    /// (`child_0`, `child_1`, ...).
    pub fn child_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.child_prefix = prefix.into();
        self
    }

    /// Builds the specialized detector.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::InvalidDetectTarget`] for the first target
    /// that is not a component class.
    pub fn build(self) -> Result<Mixin, CompositionError> {
        if let Some(invalid) = self.targets.iter().find(|target| !target.is_component()) {
            return Err(CompositionError::InvalidDetectTarget {
                class: invalid.name().to_owned(),
            });
        }

        let names: Vec<&str> = self.targets.iter().map(Class::name).collect();
        let name = format!("AutoDetect<{}>", names.join(","));
        let target_list: Vec<Value> = self.targets.iter().map(Value::from).collect();

        let detector = Detector {
            id: DetectorId::next(),
            targets: self.targets,
            child_prefix: self.child_prefix,
        };
        let (pre, post) = (detector.clone(), detector);

        tracing::debug!(target: "loom::detect", detector = %name, "specialized detector");

        Ok(Mixin::builder(name)
            .attr("detect_target", target_list)
            .method("search_children_by_type", search_children_by_type)
            .pre_construct(move |_, class, owner, _| pre.scan_ancestry(class, owner))
            .post_construct(move |authority, owner, _| post.scan_instance(authority, owner))
            .build())
    }
}

/// Method attribute backing `owner.call("search_children_by_type", [class])`.
fn search_children_by_type(owner: &Object, args: &[Value]) -> Result<Value, ObjectError> {
    let class = args.first().and_then(Value::as_class).ok_or_else(|| {
        ObjectError::custom(format!(
            "search_children_by_type expects a class, found {}",
            args.first().map_or("nothing", Value::kind)
        ))
    })?;

    let found = owner
        .search_children_by_type(class)
        .into_iter()
        .map(Value::Index)
        .collect::<Vec<_>>();
    Ok(Value::List(found))
}

// ─────────────────────────────────────────────────────────────────────────────
// Detector
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Detector {
    id: DetectorId,
    targets: Vec<Class>,
    child_prefix: Cow<'static, str>,
}

impl Detector {
    /// A bare class that can be instantiated as a child.
    fn is_detectable_class(&self, value: &Value) -> bool {
        value.as_class().is_some_and(|class| {
            class.authority() != Some(Authority::Multiton)
                && self.targets.iter().any(|target| class.is_subclass_of(target))
        })
    }

    /// An existing object that can be registered as a child.
    fn is_detectable_instance(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|object| {
            self.targets
                .iter()
                .any(|target| object.is_instance_of(target))
        })
    }

    fn matches(&self, value: &Value) -> bool {
        self.is_detectable_class(value) || self.is_detectable_instance(value)
    }

    fn collect(&self, members: &Attributes, found: &mut Vec<String>) {
        for (name, value) in members {
            if !found.contains(name) && self.matches(value) {
                found.push(name.clone());
            }
        }
    }

    fn scan_ancestry(&self, class: &Class, owner: &Object) -> Result<(), ObjectError> {
        let mut found = Vec::new();
        self.collect(&class.gather_ancestry_attributes(), &mut found);

        tracing::debug!(
            target: "loom::detect",
            class = %class.name(),
            found = ?found,
            "ancestry scan"
        );

        if !owner.extensions().contains::<DetectState>() {
            owner.extensions().insert(DetectState::default());
        }
        let state = owner
            .extensions()
            .get::<DetectState>()
            .map_err(ObjectError::custom)?;
        state.set_pending(self.id, found);
        Ok(())
    }

    fn scan_instance(&self, authority: &TypeAuthority, owner: &Object) -> Result<(), ObjectError> {
        let state = owner
            .extensions()
            .get::<DetectState>()
            .map_err(ObjectError::custom)?;

        let mut found = state.take_pending(self.id);
        self.collect(&owner.own_attributes(), &mut found);

        tracing::debug!(
            target: "loom::detect",
            class = %owner.class().name(),
            found = ?found,
            "instance scan"
        );

        for name in found {
            let Some(mut child) = owner.get_attr(&name) else {
                continue;
            };

            if let Some(class) = child
                .as_class()
                .filter(|_| self.is_detectable_class(&child))
                .cloned()
            {
                let built = authority.construct(&class, vec![Value::from(owner)])?;
                tracing::debug!(
                    target: "loom::detect",
                    attribute = %name,
                    class = %class.name(),
                    "constructed child"
                );
                owner.set_attr(name.as_str(), built.clone());
                child = Value::Object(built);
            }

            let Some(object) = child.as_object().filter(|_| self.is_detectable_instance(&child))
            else {
                continue;
            };
            if !state.claim(&name) {
                tracing::trace!(
                    target: "loom::detect",
                    attribute = %name,
                    "child already registered by another detector"
                );
                continue;
            }

            let index = state.register(object.clone()).map_err(ObjectError::custom)?;
            owner.set_attr(format!("{}{}", self.child_prefix, index), index);

            tracing::debug!(
                target: "loom::detect",
                attribute = %name,
                %index,
                "registered child"
            );
        }

        Ok(())
    }
}
