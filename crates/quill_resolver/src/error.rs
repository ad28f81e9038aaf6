//! Fatal resolution errors.
//!
//! Everything here aborts a resolution call with no partial result. Recoverable
//! per-code failures are collected in
//! [`ResolveResult::errors`](crate::ResolveResult::errors) instead.

use core::time::Duration;
use quill_graph::GraphError;
use quill_injector::{InjectorError, ProviderError};
use thiserror::Error;

/// Errors that abort a whole resolution call.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The registry initializer failed or timed out.
    #[error("initializer failed: {0}")]
    Init(#[source] InjectorError),

    /// The referenced registry codes form a dependency cycle.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An injector declared critical failed or timed out.
    #[error("critical injector '{code}' failed: {source}")]
    CriticalInjector {
        /// Code of the failing injector.
        code: String,
        /// The injector's failure.
        #[source]
        source: InjectorError,
    },

    /// The provider batch call failed at the transport or handler level.
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    /// The provider batch call did not finish within its deadline.
    #[error("provider call timed out after {0:?}")]
    ProviderTimeout(Duration),
}

impl ResolveError {
    /// Returns the injector code this error names, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            ResolveError::CriticalInjector { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns true if retrying without changing configuration cannot succeed.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ResolveError::Graph(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_offending_code() {
        let err = ResolveError::CriticalInjector {
            code: "invoice_number".into(),
            source: InjectorError::failed("sequence exhausted"),
        };
        assert_eq!(
            err.to_string(),
            "critical injector 'invoice_number' failed: sequence exhausted"
        );
        assert_eq!(err.code(), Some("invoice_number"));
    }

    #[test]
    fn cycle_is_configuration_error() {
        let err = ResolveError::from(GraphError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        });
        assert!(err.is_configuration_error());
        assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
    }

    #[test]
    fn provider_errors_wrap() {
        let err = ResolveError::from(ProviderError::transport("reset"));
        assert_eq!(
            err.to_string(),
            "provider call failed: provider transport error: reset"
        );
        assert!(!err.is_configuration_error());
    }
}
