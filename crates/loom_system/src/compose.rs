//! Class composition.
//!
//! [`Class::compose`] synthesizes a new class from a base and an ordered list
//! of [`Composable`] items. The base is never modified. The new class:
//!
//! - has the base as its parent, so every base attribute stays reachable
//! - carries the base's composition record forward (applied mixins, hooks,
//!   bound authority, component capability)
//! - merges the attributes of each newly applied mixin, first applied wins
//! - appends each newly applied mixin's hooks to the chain
//!
//! A mixin already recorded on the lineage is skipped. At most one
//! [`Authority`] may appear in a request, and a lineage that already has one
//! cannot be rebound to a different one.

use crate::authority::{Authority, TypeAuthority};
use crate::class::{Class, ClassData, ClassId};
use crate::mixin::{Composable, IntoComposables, Mixin};
use crate::value::Attributes;

/// Errors that reject a composition request.
///
/// No class is produced when one of these is returned.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CompositionError {
    /// More than one authority appeared in one request.
    #[error("cannot compose '{class}' with more than one authority: {authorities:?}")]
    MultipleAuthorities {
        /// Base class of the request.
        class: String,
        /// Every authority found in the request, in order.
        authorities: Vec<Authority>,
    },

    /// The lineage already has a different authority bound.
    #[error("'{class}' is already bound to {bound}, cannot rebind to {requested}")]
    AuthorityRebind {
        /// Base class of the request.
        class: String,
        /// Authority already bound to the lineage.
        bound: Authority,
        /// Authority found in the request.
        requested: Authority,
    },

    /// An auto-detection target is not a component class.
    #[error("detection target '{class}' is not a component class")]
    InvalidDetectTarget {
        /// The rejected target.
        class: String,
    },
}

impl Class {
    /// Composes this class with `traits`, producing a new class.
    ///
    /// # Errors
    ///
    /// - [`CompositionError::MultipleAuthorities`] if the request carries
    ///   more than one authority
    /// - [`CompositionError::AuthorityRebind`] if the lineage is bound to a
    ///   different authority
    ///
    /// # Example
    ///
    /// ```
    /// use loom_system::authority::Authority;
    /// use loom_system::class::ClassBuilder;
    /// use loom_system::mixin::Mixin;
    ///
    /// let titled = Mixin::builder("Titled").attr("title", "untitled").build();
    /// let frame = ClassBuilder::new("Frame").build();
    ///
    /// let main = frame.compose((titled, Authority::Singleton)).unwrap();
    /// assert_eq!(main.name(), "Frame<Titled,Singleton>");
    /// assert_eq!(main.parent(), Some(&frame));
    /// assert_eq!(main.authority(), Some(Authority::Singleton));
    ///
    /// assert!(main.compose(Authority::Multiton).is_err());
    /// ```
    pub fn compose(&self, traits: impl IntoComposables) -> Result<Class, CompositionError> {
        let items = traits.into_composables();

        let (authorities, mixins): (Vec<_>, Vec<_>) = items
            .iter()
            .partition(|item| matches!(item, Composable::Authority(_)));
        let authorities: Vec<Authority> = authorities
            .into_iter()
            .filter_map(|item| match item {
                Composable::Authority(authority) => Some(*authority),
                Composable::Mixin(_) => None,
            })
            .collect();

        if authorities.len() > 1 {
            return Err(CompositionError::MultipleAuthorities {
                class: self.name().to_owned(),
                authorities,
            });
        }

        let requested = authorities.first().copied();
        let authority = match (self.authority(), requested) {
            (Some(bound), Some(requested)) if bound != requested => {
                return Err(CompositionError::AuthorityRebind {
                    class: self.name().to_owned(),
                    bound,
                    requested,
                });
            }
            (bound, requested) => requested.or(bound),
        };

        let mut applied = self.applied_mixins().to_vec();
        let mut mixin_names = self.mixin_names().clone();
        let mut hooks = self.hooks().clone();
        let mut attributes = Attributes::new();

        for item in mixins {
            let Composable::Mixin(mixin) = item else {
                continue;
            };
            if applied.contains(mixin) {
                tracing::debug!(
                    target: "loom::compose",
                    class = %self.name(),
                    mixin = %mixin.name(),
                    "mixin already applied, skipping"
                );
                continue;
            }
            merge_namespace(self, mixin, &mut attributes, &mut mixin_names);
            hooks.extend_from(mixin);
            applied.push(mixin.clone());
        }

        let name = if items.is_empty() {
            self.name().to_owned()
        } else {
            let parts: Vec<&str> = items.iter().map(Composable::name).collect();
            format!("{}<{}>", self.name(), parts.join(","))
        };

        let class = Class::from_data(ClassData {
            id: ClassId::next(),
            name,
            parent: Some(self.clone()),
            attributes,
            initializer: None,
            applied,
            mixin_names,
            authority,
            hooks,
            component: self.is_component(),
        });

        tracing::debug!(
            target: "loom::compose",
            class = %class.name(),
            authority = ?class.authority(),
            mixins = class.applied_mixins().len(),
            hooks = class.hooks().len(),
            "composed class"
        );

        Ok(class)
    }
}

fn merge_namespace(
    base: &Class,
    mixin: &Mixin,
    attributes: &mut Attributes,
    mixin_names: &mut hashbrown::HashSet<String>,
) {
    for (name, value) in mixin.attributes() {
        if mixin_names.contains(name) {
            tracing::warn!(
                target: "loom::compose",
                class = %base.name(),
                mixin = %mixin.name(),
                attribute = %name,
                "attribute already contributed by an earlier mixin, keeping the first"
            );
            continue;
        }
        mixin_names.insert(name.clone());
        attributes.insert(name.clone(), value.clone());
    }
}

impl TypeAuthority {
    /// Composes `base` with `traits`. See [`Class::compose`].
    ///
    /// # Errors
    ///
    /// Returns a [`CompositionError`] if the request is rejected.
    pub fn compose(
        &self,
        base: &Class,
        traits: impl IntoComposables,
    ) -> Result<Class, CompositionError> {
        base.compose(traits)
    }

    /// Returns `true` if every item of `traits` is recorded on `class`.
    #[must_use]
    pub fn has_traits(&self, class: &Class, traits: impl IntoComposables) -> bool {
        class.has_traits(traits)
    }

    /// Merges the attributes of `class` and all its ancestors.
    #[must_use]
    pub fn gather_ancestry_attributes(&self, class: &Class) -> Attributes {
        class.gather_ancestry_attributes()
    }
}
