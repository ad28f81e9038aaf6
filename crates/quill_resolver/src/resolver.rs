//! Injectable resolution engine.
//!
//! The [`InjectableResolver`] computes every value a render request references:
//!
//! 1. Runs the registry [`Initializer`](quill_injector::Initializer), if any.
//!    Failure aborts the call.
//! 2. Splits the referenced codes into registry-owned codes and provider codes.
//!    A code the registry owns is never sent to the provider.
//! 3. Orders the registry codes with a [`DependencyGraph`] and runs them level
//!    by level. Injectors in one level run concurrently, each under its own
//!    deadline.
//! 4. Sends all provider codes in one batch call, concurrently with step 3.
//!
//! # Failure semantics
//!
//! - A critical injector failure (including a timeout) cancels its running
//!   siblings and aborts the call with [`ResolveError::CriticalInjector`].
//! - A non-critical failure is recorded in [`ResolveResult::errors`] and
//!   execution continues.
//! - A provider transport or handler failure aborts the call; per-code provider
//!   failures are recorded like non-critical injector failures.
//!
//! # Example
//!
//! ```ignore
//! use quill_resolver::{InjectableResolver, merge_with_payload_values};
//!
//! let resolver = InjectableResolver::new(registry).with_provider(crm);
//! let result = resolver.resolve(&ctx, &["current_date", "customer_name"]).await?;
//! let values = merge_with_payload_values(&result, &overrides);
//! ```

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::result::ResolveResult;
use futures::StreamExt;
use quill_graph::DependencyGraph;
use quill_injector::{
    GetInjectablesResult, InjectableGroup, InjectorError, InjectorRegistry, ProviderError,
    ProviderRequest, ResolutionContext, WorkspaceInjectableProvider,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;

/// Orchestrates one resolution call per request.
///
/// The resolver holds only shared, read-only state and can serve concurrent
/// requests; each request brings its own [`ResolutionContext`].
pub struct InjectableResolver {
    registry: Arc<InjectorRegistry>,
    provider: Option<Arc<dyn WorkspaceInjectableProvider>>,
    config: ResolverConfig,
}

impl core::fmt::Debug for InjectableResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InjectableResolver")
            .field("registry", &self.registry)
            .field("has_provider", &self.provider.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl InjectableResolver {
    /// Creates a resolver over `registry` with no provider.
    #[must_use]
    pub fn new(registry: Arc<InjectorRegistry>) -> Self {
        Self {
            registry,
            provider: None,
            config: ResolverConfig::default(),
        }
    }

    /// Sets the provider for codes the registry does not own.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn WorkspaceInjectableProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<InjectorRegistry> {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns whether a provider is configured.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolves every code in `codes`.
    ///
    /// Duplicate and blank codes are ignored. Codes nobody can resolve (no
    /// provider configured) are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the initializer fails, the registry codes form a
    /// cycle, a critical injector fails, or the provider call fails as a whole.
    /// No partial result is returned in those cases.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        ctx: &ResolutionContext,
        codes: &[S],
    ) -> Result<ResolveResult, ResolveError> {
        let started = Instant::now();

        self.run_initializer(ctx).await?;

        let (registry_codes, provider_codes) = self.partition(codes);
        tracing::debug!(
            registry = registry_codes.len(),
            provider = provider_codes.len(),
            "partitioned referenced codes"
        );

        let result = ResolveResult::new();
        let root = CancellationToken::new();
        let _cancel_on_exit = root.clone().drop_guard();

        tokio::try_join!(
            self.resolve_registry_codes(ctx, &registry_codes, &result, &root),
            self.resolve_provider_codes(ctx, provider_codes, &result),
        )?;

        tracing::info!(
            tenant = %ctx.tenant_code(),
            workspace = %ctx.workspace_code(),
            values = result.len(),
            errors = result.errors().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "resolution complete"
        );

        Ok(result)
    }

    /// Lists every code this resolver can produce for the context's workspace.
    ///
    /// Registry entries come first; provider entries whose code the registry
    /// already owns are dropped. Groups named by registry injectors are listed
    /// in first-appearance order, ahead of the provider's groups.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if its catalog cannot be fetched.
    pub async fn injectables(
        &self,
        ctx: &ResolutionContext,
    ) -> Result<GetInjectablesResult, ProviderError> {
        let injectables = self.registry.definitions();
        let mut groups: Vec<InjectableGroup> = Vec::new();
        for group in injectables.iter().filter_map(|d| d.group.as_deref()) {
            if groups.iter().all(|g| g.code != group) {
                groups.push(InjectableGroup {
                    code: group.to_string(),
                    labels: HashMap::new(),
                    order: i32::try_from(groups.len()).unwrap_or(i32::MAX),
                });
            }
        }
        let mut catalog = GetInjectablesResult {
            injectables,
            groups,
        };

        if let Some(provider) = &self.provider {
            let external = provider.get_injectables(ctx).await?;
            catalog.injectables.extend(
                external
                    .injectables
                    .into_iter()
                    .filter(|definition| !self.registry.contains(&definition.code)),
            );

            // Provider groups follow registry groups; a provider entry for a
            // registry group only contributes labels.
            let offset = i32::try_from(catalog.groups.len()).unwrap_or(i32::MAX);
            for group in external.groups {
                match catalog.groups.iter_mut().find(|g| g.code == group.code) {
                    Some(existing) => {
                        for (locale, label) in group.labels {
                            existing.labels.entry(locale).or_insert(label);
                        }
                    }
                    None => catalog.groups.push(InjectableGroup {
                        order: group.order.saturating_add(offset),
                        ..group
                    }),
                }
            }
        }

        Ok(catalog)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Phases
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs the registry initializer and stores its result in the context.
    async fn run_initializer(&self, ctx: &ResolutionContext) -> Result<(), ResolveError> {
        let Some(initializer) = self.registry.initializer() else {
            return Ok(());
        };

        let deadline = self.config.init_timeout;
        let data = match timeout(deadline, initializer.init(ctx)).await {
            Ok(Ok(data)) => data,
            Ok(Err(err)) => {
                tracing::error!(error = %err, "initializer failed, aborting resolution");
                return Err(ResolveError::Init(err));
            }
            Err(_) => {
                tracing::error!(timeout = ?deadline, "initializer timed out, aborting resolution");
                return Err(ResolveError::Init(InjectorError::Timeout(deadline)));
            }
        };

        if !ctx.set_init_data(data) {
            tracing::warn!("context already carries init data, keeping the existing value");
        }
        Ok(())
    }

    /// Splits `codes` into registry-owned and provider codes, deduplicated.
    ///
    /// Registry ownership wins: a registry code is never sent to the provider.
    fn partition<S: AsRef<str>>(&self, codes: &[S]) -> (Vec<String>, Vec<String>) {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut registry_codes = Vec::new();
        let mut provider_codes = Vec::new();

        for code in codes {
            let code = code.as_ref();
            if code.trim().is_empty() || !seen.insert(code) {
                continue;
            }
            if self.registry.contains(code) {
                registry_codes.push(code.to_string());
            } else {
                provider_codes.push(code.to_string());
            }
        }

        (registry_codes, provider_codes)
    }

    /// Orders the registry codes and executes them level by level.
    async fn resolve_registry_codes(
        &self,
        ctx: &ResolutionContext,
        codes: &[String],
        result: &ResolveResult,
        root: &CancellationToken,
    ) -> Result<(), ResolveError> {
        if codes.is_empty() {
            return Ok(());
        }

        let graph = DependencyGraph::from_injectors(self.registry.as_ref(), codes);
        let levels = graph
            .topological_sort()
            .inspect_err(|err| tracing::error!(error = %err, "cannot order injectors"))?;

        for (index, level) in levels.iter().enumerate() {
            let level_token = root.child_token();
            self.execute_level(ctx, index, level, result, &level_token)
                .await?;
        }

        Ok(())
    }

    /// Executes every injector in one level concurrently.
    ///
    /// On the first critical failure the level token is cancelled and the
    /// remaining executions are dropped.
    async fn execute_level(
        &self,
        ctx: &ResolutionContext,
        index: usize,
        level: &[String],
        result: &ResolveResult,
        level_token: &CancellationToken,
    ) -> Result<(), ResolveError> {
        tracing::debug!(level = index, codes = ?level, "executing level");

        let mut executions = futures::stream::iter(level)
            .map(|code| self.execute_injector(ctx, code, result, level_token))
            .buffer_unordered(self.config.max_concurrency.max(1));

        while let Some(outcome) = executions.next().await {
            if let Err(err) = outcome {
                level_token.cancel();
                return Err(err);
            }
        }

        Ok(())
    }

    /// Executes one injector under its deadline and records the outcome.
    async fn execute_injector(
        &self,
        ctx: &ResolutionContext,
        code: &str,
        result: &ResolveResult,
        level_token: &CancellationToken,
    ) -> Result<(), ResolveError> {
        let Some(injector) = self.registry.get(code) else {
            tracing::warn!(code = %code, "scheduled code is not registered, skipping");
            return Ok(());
        };

        let deadline = self.config.effective_timeout(injector.timeout());
        let cancel = level_token.child_token();
        let started = Instant::now();

        let outcome = match timeout(deadline, injector.resolve(ctx, cancel.clone())).await {
            Ok(outcome) => outcome,
            Err(_) => {
                cancel.cancel();
                Err(InjectorError::Timeout(deadline))
            }
        };

        match outcome {
            Ok(Some(output)) => {
                ctx.set_resolved(code, output.value.clone());
                result.record(code, output);
                tracing::debug!(
                    code = %code,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "injector resolved"
                );
            }
            Ok(None) => {
                tracing::debug!(code = %code, "injector had nothing to resolve");
            }
            Err(err) if injector.is_critical() => {
                tracing::error!(
                    code = %code,
                    error = %err,
                    "critical injector failed, aborting resolution"
                );
                return Err(ResolveError::CriticalInjector {
                    code: code.to_string(),
                    source: err,
                });
            }
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "injector failed");
                result.insert_error(code, err);
            }
        }

        Ok(())
    }

    /// Sends all provider codes in one batch and merges the response.
    async fn resolve_provider_codes(
        &self,
        ctx: &ResolutionContext,
        codes: Vec<String>,
        result: &ResolveResult,
    ) -> Result<(), ResolveError> {
        if codes.is_empty() {
            return Ok(());
        }
        let Some(provider) = &self.provider else {
            tracing::debug!(codes = ?codes, "no provider configured, codes stay unresolved");
            return Ok(());
        };

        let requested: HashSet<String> = codes.iter().cloned().collect();
        let request = ProviderRequest::from_context(ctx, codes);
        let deadline = self.config.provider_timeout;

        let response = match timeout(deadline, provider.resolve_injectables(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                tracing::error!(error = %err, "provider call failed, aborting resolution");
                return Err(ResolveError::Provider(err));
            }
            Err(_) => {
                tracing::error!(timeout = ?deadline, "provider call timed out, aborting resolution");
                return Err(ResolveError::ProviderTimeout(deadline));
            }
        };

        for (code, value) in response.values {
            if !requested.contains(&code) {
                tracing::debug!(code = %code, "provider returned an unrequested code, ignoring");
                continue;
            }
            match value {
                Some(value) => {
                    ctx.set_resolved(code.clone(), value.clone());
                    result.insert_value(code, value);
                }
                None => tracing::debug!(code = %code, "provider had no value"),
            }
        }

        for (code, message) in response.errors {
            if !requested.contains(&code) {
                continue;
            }
            tracing::warn!(code = %code, error = %message, "provider could not resolve code");
            result.insert_error(code, InjectorError::Provider(message));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_prefers_registry_and_dedupes() {
        let resolver = InjectableResolver::new(Arc::new(InjectorRegistry::new()));
        let (registry, provider) = resolver.partition(&["a", "b", "a", "  ", ""]);
        assert!(registry.is_empty());
        assert_eq!(provider, vec!["a", "b"]);
    }

    #[test]
    fn builder_defaults() {
        let resolver = InjectableResolver::new(Arc::new(InjectorRegistry::new()));
        assert!(!resolver.has_provider());
        assert_eq!(resolver.config(), &ResolverConfig::default());
        assert!(resolver.registry().is_empty());
    }

    #[tokio::test]
    async fn empty_request_resolves_to_empty_result() {
        let resolver = InjectableResolver::new(Arc::new(InjectorRegistry::new()));
        let ctx = ResolutionContext::new();
        let result = resolver.resolve::<&str>(&ctx, &[]).await.unwrap();
        assert!(result.is_empty());
        assert!(!result.has_errors());
    }

    #[tokio::test]
    async fn codes_without_provider_are_left_unresolved() {
        let resolver = InjectableResolver::new(Arc::new(InjectorRegistry::new()));
        let ctx = ResolutionContext::new();
        let result = resolver.resolve(&ctx, &["customer_name"]).await.unwrap();
        assert!(result.value("customer_name").is_none());
        assert!(result.error("customer_name").is_none());
    }
}
