//! Error types for injector execution, registration and providers.

use core::time::Duration;
use thiserror::Error;

/// Errors produced by a single injector, the initializer, or a provider code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InjectorError {
    /// The computation failed.
    #[error("{0}")]
    Failed(String),

    /// The computation did not finish within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The computation observed cancellation and stopped.
    #[error("cancelled")]
    Cancelled,

    /// A value this computation needs was not available in the context.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// The provider reported a failure for this code.
    #[error("provider error: {0}")]
    Provider(String),
}

impl InjectorError {
    /// Creates a [`Failed`](Self::Failed) error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Creates a [`MissingDependency`](Self::MissingDependency) error.
    pub fn missing_dependency(code: impl Into<String>) -> Self {
        Self::MissingDependency(code.into())
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors raised while populating an [`InjectorRegistry`](crate::registry::InjectorRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// An injector with this code is already registered.
    #[error("injector '{0}' is already registered")]
    DuplicateCode(String),

    /// An initializer was already installed.
    #[error("registry already has an initializer")]
    DuplicateInitializer,
}

/// Batch-level failures from a [`WorkspaceInjectableProvider`](crate::provider::WorkspaceInjectableProvider).
///
/// Per-code failures are reported inside the provider response instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The connection to the backing service failed.
    #[error("provider transport error: {0}")]
    Transport(String),

    /// The provider handler rejected the request.
    #[error("provider handler error: {0}")]
    Handler(String),

    /// The provider is not available for this tenant or workspace.
    #[error("provider unavailable")]
    Unavailable,
}

impl ProviderError {
    /// Creates a [`Transport`](Self::Transport) error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a [`Handler`](Self::Handler) error.
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }
}
