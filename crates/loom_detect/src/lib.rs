//! Component auto-detection for Loom (Layer 2).
//!
//! `loom_detect` builds on the construction hook chain of `loom_system`. An
//! [`AutoDetect`] mixin, specialized for a set of component classes, finds the
//! attributes of its owner that hold one of those classes (or an instance of
//! one), builds the bare classes with the owner as argument, and indexes every
//! child in a [`ChildrenRegistry`]:
//!
//! - [`AutoDetect`] / [`AutoDetectBuilder`] - specialize a detector mixin
//! - [`DetectExt`] - read the children of a constructed owner
//!
//! # Example
//!
//! ```
//! use loom_detect::{AutoDetect, DetectExt};
//! use loom_system::prelude::*;
//!
//! let widget = ClassBuilder::new("Widget").component().build();
//! let base = ClassBuilder::new("Base").build();
//!
//! let authority = TypeAuthority::new();
//! let detected = authority.compose(&base, AutoDetect::of([&widget]).unwrap()).unwrap();
//! let panel = ClassBuilder::new("Panel")
//!     .extends(&detected)
//!     .attr("header", &widget)
//!     .build();
//!
//! let owner = authority.construct(&panel, Vec::new()).unwrap();
//! let found = owner.search_children_by_type(&widget);
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(owner.children().resolve(found[0]), owner.get_attr("header").as_ref().and_then(Value::as_object));
//! ```

mod children;
mod detector;

pub use children::{ChildrenRegistry, DetectExt};
pub use detector::{AutoDetect, AutoDetectBuilder};
