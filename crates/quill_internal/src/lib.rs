//! # Quill Internal Library
//!
//! Re-exports the core Quill crates for convenience.

/// Layer 0: Dependency ordering of injectors.
pub use quill_graph;

/// Layer 1: Injector contract, values, context and registry.
pub use quill_injector;

/// Layer 2: Concurrent resolution engine.
pub use quill_resolver;

/// Layer 2: Built-in injectors, workspace variables and tracing setup.
pub use quill_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use quill_core::{
        Clock, ClockProvider, TracingConfig, TracingFormat, WorkspaceVariable,
        WorkspaceVariablesProvider, register_builtin_injectors,
    };
    pub use quill_graph::{DependencyGraph, GraphError};
    pub use quill_injector::{
        CancellationToken, FormatConfig, InjectableValue, Initializer, Injector, InjectorError,
        InjectorRegistry, InjectorResult, ProviderRequest, ProviderResponse, ResolutionContext,
        ValueType, WorkspaceInjectableProvider,
    };
    pub use quill_resolver::{
        InjectableResolver, ResolveError, ResolveResult, ResolverConfig, merge_with_payload_values,
    };
}
