//! The core [`Injector`] trait for code-defined computations.

use crate::context::{InitData, ResolutionContext};
use crate::error::InjectorError;
use crate::value::{FormatConfig, InjectableValue, ValueType};
use async_trait::async_trait;
use core::time::Duration;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Output of one successful injector computation.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectorResult {
    /// The resolved value.
    pub value: InjectableValue,
    /// Optional side-channel data surfaced in the resolve result.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl InjectorResult {
    /// Creates a result with no metadata.
    #[must_use]
    pub fn new(value: impl Into<InjectableValue>) -> Self {
        Self {
            value: value.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attaches a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A named, stateless computation producing one injectable value.
///
/// Injectors are registered once at startup in an
/// [`InjectorRegistry`](crate::registry::InjectorRegistry) and invoked by the
/// resolver for every request that references their code. An injector that
/// needs another injector's output lists it in [`dependencies`](Self::dependencies)
/// and reads it with [`ResolutionContext::resolved`].
///
/// A dependency is only honored when the request also references it; otherwise
/// the injector runs without that value in the context and must fall back on
/// its own.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use quill_injector::context::ResolutionContext;
/// use quill_injector::error::InjectorError;
/// use quill_injector::injector::{Injector, InjectorResult};
/// use quill_injector::value::ValueType;
/// use tokio_util::sync::CancellationToken;
///
/// struct TenantName;
///
/// #[async_trait]
/// impl Injector for TenantName {
///     fn code(&self) -> &str {
///         "tenant_name"
///     }
///
///     fn data_type(&self) -> ValueType {
///         ValueType::String
///     }
///
///     async fn resolve(
///         &self,
///         ctx: &ResolutionContext,
///         _cancel: CancellationToken,
///     ) -> Result<Option<InjectorResult>, InjectorError> {
///         Ok(Some(InjectorResult::new(ctx.tenant_code())))
///     }
/// }
/// ```
#[async_trait]
pub trait Injector: Send + Sync + 'static {
    /// Stable unique identifier referenced by templates.
    fn code(&self) -> &str;

    /// Declared output type.
    fn data_type(&self) -> ValueType;

    /// Fallback value consumers may substitute when the code is unresolved.
    fn default_value(&self) -> Option<InjectableValue> {
        None
    }

    /// Selectable output formats.
    fn formats(&self) -> Option<FormatConfig> {
        None
    }

    /// Codes of injectors whose output this injector reads.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether a failure of this injector aborts the whole resolution.
    fn is_critical(&self) -> bool {
        false
    }

    /// Per-invocation deadline. [`Duration::ZERO`] selects the engine default.
    fn timeout(&self) -> Duration {
        Duration::ZERO
    }

    /// Human-readable label for the editor catalog.
    fn label(&self) -> String {
        self.code().to_string()
    }

    /// Longer description for the editor catalog.
    fn description(&self) -> Option<String> {
        None
    }

    /// Catalog group this injector is listed under.
    fn group(&self) -> Option<String> {
        None
    }

    /// Computes the value.
    ///
    /// `cancel` is triggered when the deadline elapses or a critical sibling
    /// fails; long-running work should observe it. Returning `Ok(None)` means
    /// there is nothing to resolve for this request.
    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        cancel: CancellationToken,
    ) -> Result<Option<InjectorResult>, InjectorError>;
}

/// Global computation run once per resolution before any injector.
///
/// Its result is stored with [`ResolutionContext::set_init_data`] and is
/// visible to every injector and to the provider call.
#[async_trait]
pub trait Initializer: Send + Sync + 'static {
    /// Produces the shared init data.
    async fn init(&self, ctx: &ResolutionContext) -> Result<InitData, InjectorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    #[async_trait]
    impl Injector for Plain {
        fn code(&self) -> &str {
            "plain"
        }

        fn data_type(&self) -> ValueType {
            ValueType::Bool
        }

        async fn resolve(
            &self,
            _ctx: &ResolutionContext,
            _cancel: CancellationToken,
        ) -> Result<Option<InjectorResult>, InjectorError> {
            Ok(Some(InjectorResult::new(true)))
        }
    }

    #[test]
    fn trait_defaults() {
        let injector = Plain;
        assert!(injector.dependencies().is_empty());
        assert!(!injector.is_critical());
        assert_eq!(injector.timeout(), Duration::ZERO);
        assert_eq!(injector.label(), "plain");
        assert!(injector.default_value().is_none());
        assert!(injector.formats().is_none());
    }

    #[tokio::test]
    async fn resolve_produces_result() {
        let ctx = ResolutionContext::new();
        let result = Plain
            .resolve(&ctx, CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.value, InjectableValue::Bool(true));
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn result_metadata_builder() {
        let result = InjectorResult::new("x").with_metadata("source", serde_json::json!("crm"));
        assert_eq!(result.metadata["source"], "crm");
    }
}
