//! Injector contract, values, resolution context and registry for Quill.
//!
//! This crate defines everything a value source implements or reads:
//!
//! - [`Injector`] - a code-defined computation producing one [`InjectableValue`]
//! - [`InjectorRegistry`] - the startup-built table of injectors plus an optional [`Initializer`]
//! - [`ResolutionContext`] - per-request ambient data and the values resolved so far
//! - [`WorkspaceInjectableProvider`] - the host-supplied batch resolver for every other code
//!
//! The resolver itself lives in `quill_resolver`; dependency ordering lives in
//! `quill_graph`.

pub mod catalog;
pub mod context;
pub mod error;
pub mod injector;
pub mod provider;
pub mod registry;
pub mod value;

pub use catalog::{
    FALLBACK_LOCALE, GetInjectablesResult, InjectableDefinition, InjectableGroup, InjectableSource,
};
pub use context::{InitData, ResolutionContext, ResolutionContextBuilder};
pub use error::{InjectorError, ProviderError, RegistryError};
pub use injector::{Initializer, Injector, InjectorResult};
pub use provider::{ProviderRequest, ProviderResponse, WorkspaceInjectableProvider};
pub use registry::InjectorRegistry;
pub use value::{FormatConfig, ImageRef, InjectableValue, TableValue, TimeValue, ValueType};

/// Cancellation signal handed to every [`Injector::resolve`] call.
pub use tokio_util::sync::CancellationToken;
