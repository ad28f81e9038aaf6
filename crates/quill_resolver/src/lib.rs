//! Dependency-ordered, concurrent resolution of injectable values.
//!
//! [`InjectableResolver`] takes the codes a template references and produces a
//! [`ResolveResult`]:
//!
//! - codes owned by the [`InjectorRegistry`](quill_injector::InjectorRegistry)
//!   run as injectors, ordered into dependency levels, each level concurrent
//! - every other code goes to the workspace provider in a single batch call
//! - per-code failures of non-critical injectors are collected, not raised
//!
//! [`merge_with_payload_values`] then overlays caller-supplied values on top of
//! the resolved ones.

pub mod config;
pub mod error;
pub mod merge;
pub mod resolver;
pub mod result;

pub use config::{ConfigError, ResolverConfig};
pub use error::ResolveError;
pub use merge::merge_with_payload_values;
pub use resolver::InjectableResolver;
pub use result::{Metadata, ResolveParts, ResolveResult};
