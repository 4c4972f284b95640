//! # Loom Internal Library
//!
//! Re-exports the core Loom crates for convenience.

/// Layer 1: class composition and construction authorities.
pub use loom_system;

/// Layer 2: component auto-detection.
pub use loom_detect;

/// Tracing subscriber setup.
pub use loom_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use loom_core::{TracingConfig, TracingFormat, TracingSetup};
    pub use loom_detect::{AutoDetect, AutoDetectBuilder, ChildrenRegistry, DetectExt};
    pub use loom_system::prelude::*;
}
