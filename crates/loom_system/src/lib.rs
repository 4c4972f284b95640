//! The runtime class composition engine for Loom (Layer 1).
//!
//! `loom_system` provides the primitives for composing behavior into classes
//! at runtime:
//!
//! - [`value`] - Dynamic attribute values
//! - [`class`] - Class descriptors and the builder that declares them
//! - [`mixin`] - Composable traits and the construction hook chain
//! - [`object`] - Constructed instances and their extension storage
//! - [`index`] - Registry-bound keyed indices
//! - [`authority`] - Construction authorities (Singleton, Multiton) and the
//!   [`TypeAuthority`](authority::TypeAuthority) runtime
//! - [`compose`] - Class composition and its errors
//!
//! # Architecture
//!
//! This crate is Layer 1 of the Loom architecture:
//!
//! - **Layer 1** (`loom_system`): composition and construction (this crate)
//! - **Layer 2** (`loom_detect`): component auto-detection built on the hook chain
//!
//! # Example
//!
//! ```
//! use loom_system::prelude::*;
//!
//! let counted = Mixin::builder("Counted")
//!     .attr("count", 0)
//!     .post_construct(|_authority, object, args| {
//!         object.set_attr("count", args.len() as i64);
//!         Ok(())
//!     })
//!     .build();
//!
//! let authority = TypeAuthority::new();
//! let base = ClassBuilder::new("Document").build();
//! let document = authority.compose(&base, (counted, Authority::Multiton)).unwrap();
//!
//! let first = authority.construct(&document, vec![Value::from("a.txt")]).unwrap();
//! let second = authority.construct(&document, Vec::new()).unwrap();
//!
//! assert_ne!(first, second);
//! assert_eq!(first.get_attr("count"), Some(Value::Int(1)));
//! assert_eq!(authority.multiton_instance(&document, "instance_1"), Some(second));
//! ```

/// Construction authorities and the runtime that owns their caches.
pub mod authority;

/// Class descriptors.
pub mod class;

/// Class composition.
pub mod compose;

mod construct;

/// Registry-bound keyed indices.
pub mod index;

/// Composable traits and construction hooks.
pub mod mixin;

/// Constructed instances.
pub mod object;

/// Dynamic attribute values.
pub mod value;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::authority::*;
    pub use crate::class::*;
    pub use crate::compose::*;
    pub use crate::index::*;
    pub use crate::mixin::*;
    pub use crate::object::*;
    pub use crate::value::*;
}
