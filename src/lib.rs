//! Dependency-ordered, concurrent resolution of document template values.
//!

pub use quill_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use quill_internal::prelude::*;
}
