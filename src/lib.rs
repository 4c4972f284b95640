//! Runtime class composition for Rust.
//!
//! Compose classes from mixins at runtime, bind them to a construction
//! authority (Singleton or Multiton), and let auto-detection discover and
//! index child components.
//!
//! # Example
//!
//! ```
//! use loom::prelude::*;
//!
//! let widget = ClassBuilder::new("Widget").component().build();
//! let authority = TypeAuthority::new();
//!
//! let base = ClassBuilder::new("Window").attr("body", &widget).build();
//! let window = authority
//!     .compose(&base, (AutoDetect::of([&widget]).unwrap(), Authority::Singleton))
//!     .unwrap();
//!
//! let main = authority.construct(&window, Vec::new()).unwrap();
//! assert_eq!(main.children().len(), 1);
//! assert_eq!(authority.construct(&window, Vec::new()).unwrap(), main);
//! ```

pub use loom_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use loom_internal::prelude::*;
}
