//! The [`WorkspaceInjectableProvider`] trait for host-supplied values.

use crate::catalog::GetInjectablesResult;
use crate::context::{InitData, ResolutionContext};
use crate::error::ProviderError;
use crate::value::InjectableValue;
use async_trait::async_trait;
use std::collections::HashMap;

/// Batch request for every referenced code the registry does not own.
#[derive(Clone, Default)]
pub struct ProviderRequest {
    /// Tenant identifier.
    pub tenant_code: String,
    /// Workspace identifier.
    pub workspace_code: String,
    /// Template being rendered, if known.
    pub template_id: Option<String>,
    /// Codes to resolve.
    pub codes: Vec<String>,
    /// Output format selected per code.
    pub selected_formats: HashMap<String, String>,
    /// Request headers, keyed by lowercased name.
    pub headers: HashMap<String, String>,
    /// Opaque render payload.
    pub payload: serde_json::Value,
    /// Result of the registry initializer, if one ran.
    pub init_data: Option<InitData>,
}

impl core::fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderRequest")
            .field("tenant_code", &self.tenant_code)
            .field("workspace_code", &self.workspace_code)
            .field("template_id", &self.template_id)
            .field("codes", &self.codes)
            .field("has_init_data", &self.init_data.is_some())
            .finish_non_exhaustive()
    }
}

impl ProviderRequest {
    /// Builds a request for `codes` from the ambient data in `ctx`.
    #[must_use]
    pub fn from_context(ctx: &ResolutionContext, codes: Vec<String>) -> Self {
        Self {
            tenant_code: ctx.tenant_code().to_string(),
            workspace_code: ctx.workspace_code().to_string(),
            template_id: ctx.template_id().map(str::to_string),
            codes,
            selected_formats: ctx.selected_formats().clone(),
            headers: ctx.headers().clone(),
            payload: ctx.payload().clone(),
            init_data: ctx.init_data_raw(),
        }
    }
}

/// Per-code outcome of a provider batch call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderResponse {
    /// Values by code. `None` means the provider had nothing for the code.
    pub values: HashMap<String, Option<InjectableValue>>,
    /// Non-critical failure messages by code.
    pub errors: HashMap<String, String>,
}

impl ProviderResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolved value.
    #[must_use]
    pub fn with_value(mut self, code: impl Into<String>, value: impl Into<InjectableValue>) -> Self {
        self.values.insert(code.into(), Some(value.into()));
        self
    }

    /// Adds a per-code failure.
    #[must_use]
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.insert(code.into(), message.into());
        self
    }
}

/// External batch resolver implemented by the host application.
///
/// The resolver calls [`resolve_injectables`](Self::resolve_injectables) once
/// per request with every code not owned by the registry. A returned `Err` is
/// fatal to the whole resolution; failures of individual codes belong in
/// [`ProviderResponse::errors`].
#[async_trait]
pub trait WorkspaceInjectableProvider: Send + Sync + 'static {
    /// Resolves a batch of codes.
    async fn resolve_injectables(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Lists the codes this provider can resolve for the context's workspace.
    async fn get_injectables(
        &self,
        ctx: &ResolutionContext,
    ) -> Result<GetInjectablesResult, ProviderError>;
}
