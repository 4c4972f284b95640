//! Ordinary composable traits ("mixins") and the construction hook chain.
//!
//! A [`Mixin`] contributes two things to a composed class:
//!
//! - attributes, merged into the class namespace (first applied wins)
//! - construction hooks, appended to the class's [`HookChain`]
//!
//! Mixins never change how a class is constructed. That is the job of an
//! [`Authority`]. Both are passed to composition as [`Composable`] items.
//!
//! # Example
//!
//! ```
//! use loom_system::authority::TypeAuthority;
//! use loom_system::class::ClassBuilder;
//! use loom_system::mixin::Mixin;
//! use loom_system::value::Value;
//!
//! let fixed_size = Mixin::builder("FixedSize")
//!     .post_construct(|_authority, object, _args| {
//!         let size = object.get_attr("size").unwrap_or_default();
//!         object.set_attr("size_min", size.clone());
//!         object.set_attr("size_max", size);
//!         Ok(())
//!     })
//!     .build();
//!
//! let authority = TypeAuthority::new();
//! let window = ClassBuilder::new("Window").attr("size", 640).build();
//! let fixed = authority.compose(&window, fixed_size).unwrap();
//!
//! let object = authority.construct(&fixed, Vec::new()).unwrap();
//! assert_eq!(object.get_attr("size_max"), Some(Value::Int(640)));
//! ```

use crate::authority::{Authority, TypeAuthority};
use crate::class::Class;
use crate::object::{Object, ObjectError};
use crate::value::{Attributes, Method, Value};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use variadics_please::all_tuples;

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Hook run right after core construction, before any post hook.
///
/// Receives the class being constructed, the fresh object and the effective
/// construction arguments.
pub type PreHook = Arc<
    dyn Fn(&TypeAuthority, &Class, &Object, &[Value]) -> Result<(), ObjectError> + Send + Sync,
>;

/// Hook run after every pre hook has completed.
pub type PostHook =
    Arc<dyn Fn(&TypeAuthority, &Object, &[Value]) -> Result<(), ObjectError> + Send + Sync>;

/// Ordered construction hooks harvested from applied mixins.
///
/// Hooks keep mixin-application order. Composition appends, never reorders.
#[derive(Clone, Default)]
pub struct HookChain {
    pre: Vec<PreHook>,
    post: Vec<PostHook>,
}

impl HookChain {
    /// Returns the pre-construction hooks in order.
    #[must_use]
    pub fn pre(&self) -> &[PreHook] {
        &self.pre
    }

    /// Returns the post-construction hooks in order.
    #[must_use]
    pub fn post(&self) -> &[PostHook] {
        &self.post
    }

    /// Returns the total number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pre.len() + self.post.len()
    }

    /// Returns `true` if the chain has no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    /// Appends the hooks contributed by `mixin`.
    pub(crate) fn extend_from(&mut self, mixin: &Mixin) {
        if let Some(hook) = &mixin.0.pre {
            self.pre.push(Arc::clone(hook));
        }
        if let Some(hook) = &mixin.0.post {
            self.post.push(Arc::clone(hook));
        }
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mixin
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a mixin.
///
/// Composition uses it to recognise an already-applied mixin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixinId(u64);

impl MixinId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct MixinData {
    id: MixinId,
    name: String,
    attributes: Attributes,
    pre: Option<PreHook>,
    post: Option<PostHook>,
}

/// An ordinary composable trait.
///
/// Cheap to clone. Identity is the [`MixinId`], so two mixins built with the
/// same name are still distinct.
#[derive(Clone)]
pub struct Mixin(Arc<MixinData>);

impl Mixin {
    /// Starts declaring a mixin.
    pub fn builder(name: impl Into<String>) -> MixinBuilder {
        MixinBuilder {
            name: name.into(),
            attributes: Attributes::new(),
            pre: None,
            post: None,
        }
    }

    /// Returns the mixin id.
    #[must_use]
    pub fn id(&self) -> MixinId {
        self.0.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the attributes this mixin contributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.0.attributes
    }

    /// Returns `true` if the mixin contributes a pre-construction hook.
    #[must_use]
    pub fn has_pre_hook(&self) -> bool {
        self.0.pre.is_some()
    }

    /// Returns `true` if the mixin contributes a post-construction hook.
    #[must_use]
    pub fn has_post_hook(&self) -> bool {
        self.0.post.is_some()
    }
}

impl PartialEq for Mixin {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Mixin {}

impl fmt::Debug for Mixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mixin")
            .field("name", &self.0.name)
            .field("attributes", &self.0.attributes.len())
            .field("pre", &self.0.pre.is_some())
            .field("post", &self.0.post.is_some())
            .finish()
    }
}

/// Declares a [`Mixin`].
#[must_use]
pub struct MixinBuilder {
    name: String,
    attributes: Attributes,
    pre: Option<PreHook>,
    post: Option<PostHook>,
}

impl MixinBuilder {
    /// Contributes an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Contributes a method attribute.
    pub fn method<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Value, ObjectError> + Send + Sync + 'static,
    {
        let name = name.into();
        let method = Method::new(name.as_str(), func);
        self.attributes.insert(name, Value::Method(method));
        self
    }

    /// Sets the pre-construction hook.
    pub fn pre_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TypeAuthority, &Class, &Object, &[Value]) -> Result<(), ObjectError>
            + Send
            + Sync
            + 'static,
    {
        self.pre = Some(Arc::new(hook));
        self
    }

    /// Sets the post-construction hook.
    pub fn post_construct<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TypeAuthority, &Object, &[Value]) -> Result<(), ObjectError> + Send + Sync + 'static,
    {
        self.post = Some(Arc::new(hook));
        self
    }

    /// Builds the mixin.
    pub fn build(self) -> Mixin {
        Mixin(Arc::new(MixinData {
            id: MixinId::next(),
            name: self.name,
            attributes: self.attributes,
            pre: self.pre,
            post: self.post,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Composable
// ─────────────────────────────────────────────────────────────────────────────

/// One item of a composition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composable {
    /// An ordinary trait.
    Mixin(Mixin),
    /// A construction authority.
    Authority(Authority),
}

impl Composable {
    /// Returns the display name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Mixin(mixin) => mixin.name(),
            Self::Authority(authority) => authority.name(),
        }
    }
}

/// Conversion into a single [`Composable`].
pub trait IntoComposable {
    /// Converts `self` into a composition item.
    fn into_composable(self) -> Composable;
}

impl IntoComposable for Composable {
    fn into_composable(self) -> Composable {
        self
    }
}

impl IntoComposable for Mixin {
    fn into_composable(self) -> Composable {
        Composable::Mixin(self)
    }
}

impl IntoComposable for &Mixin {
    fn into_composable(self) -> Composable {
        Composable::Mixin(self.clone())
    }
}

impl IntoComposable for Authority {
    fn into_composable(self) -> Composable {
        Composable::Authority(self)
    }
}

/// Types that can be passed as the trait list of a composition request.
///
/// Implemented for single items, tuples of items, vectors, arrays and slices.
pub trait IntoComposables {
    /// Returns the items in request order.
    fn into_composables(self) -> Vec<Composable>;
}

impl<C: IntoComposable> IntoComposables for C {
    fn into_composables(self) -> Vec<Composable> {
        vec![self.into_composable()]
    }
}

impl IntoComposables for () {
    fn into_composables(self) -> Vec<Composable> {
        Vec::new()
    }
}

impl<C: IntoComposable> IntoComposables for Vec<C> {
    fn into_composables(self) -> Vec<Composable> {
        self.into_iter().map(IntoComposable::into_composable).collect()
    }
}

impl<C: IntoComposable, const N: usize> IntoComposables for [C; N] {
    fn into_composables(self) -> Vec<Composable> {
        self.into_iter().map(IntoComposable::into_composable).collect()
    }
}

impl<C: IntoComposable + Clone> IntoComposables for &[C] {
    fn into_composables(self) -> Vec<Composable> {
        self.iter()
            .cloned()
            .map(IntoComposable::into_composable)
            .collect()
    }
}

macro_rules! impl_into_composables_for_tuple {
    ($($C:ident),*) => {
        impl<$($C: IntoComposable),*> IntoComposables for ($($C,)*) {
            #[expect(non_snake_case, reason = "tuple fields are bound by their type names")]
            fn into_composables(self) -> Vec<Composable> {
                let ($($C,)*) = self;
                vec![$($C.into_composable()),*]
            }
        }
    };
}

// Tuples from 1 to 16 items
all_tuples!(impl_into_composables_for_tuple, 1, 16, C);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixin_identity_is_by_id() {
        let first = Mixin::builder("Sized").build();
        let second = Mixin::builder("Sized").build();

        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[test]
    fn builder_records_hooks() {
        let mixin = Mixin::builder("Tracked")
            .pre_construct(|_, _, _, _| Ok(()))
            .build();

        assert!(mixin.has_pre_hook());
        assert!(!mixin.has_post_hook());

        let mut chain = HookChain::default();
        chain.extend_from(&mixin);
        assert_eq!(chain.pre().len(), 1);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn tuples_keep_request_order() {
        let a = Mixin::builder("A").build();
        let b = Mixin::builder("B").build();

        let items = (a.clone(), Authority::Singleton, &b).into_composables();
        let names: Vec<_> = items.iter().map(Composable::name).collect();

        assert_eq!(names, vec!["A", "Singleton", "B"]);
    }

    #[test]
    fn collections_convert() {
        let a = Mixin::builder("A").build();
        let b = Mixin::builder("B").build();

        assert_eq!(vec![a.clone(), b.clone()].into_composables().len(), 2);
        assert_eq!([a.clone(), b.clone()].into_composables().len(), 2);
        assert_eq!([a, b].as_slice().into_composables().len(), 2);
        assert!(().into_composables().is_empty());
        assert_eq!(Authority::Multiton.into_composables().len(), 1);
    }
}
