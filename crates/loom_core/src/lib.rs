//! Core infrastructure for Loom.
//!
//! The library crates only emit `tracing` events and never install a
//! subscriber. Applications that want to see them use [`TracingSetup`].
//!
//! | Target | Events |
//! |--------|--------|
//! | `loom::compose` | composition, namespace collisions, skipped mixins |
//! | `loom::construct` | construction spans and hook counts |
//! | `loom::singleton` | instance creation and cache hits |
//! | `loom::multiton` | instance creation and refused rebuilds |
//! | `loom::detect` | scan passes and child registration |

mod tracing_setup;

pub use tracing_setup::{TracingConfig, TracingFormat, TracingSetup};
