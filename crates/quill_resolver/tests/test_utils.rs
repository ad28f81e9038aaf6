//! Shared test utilities for `quill_resolver` integration tests.
//!
//! Provides a configurable injector, an initializer and a recording provider.
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use async_trait::async_trait;
use core::time::Duration;
use parking_lot::Mutex;
use quill_injector::{
    CancellationToken, GetInjectablesResult, InitData, InjectableDefinition, InjectableGroup,
    InjectableValue, Initializer, Injector, InjectorError, InjectorRegistry, InjectorResult,
    ProviderError, ProviderRequest, ProviderResponse, ResolutionContext, ValueType,
    WorkspaceInjectableProvider,
};
use quill_resolver::InjectableResolver;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// EXECUTION LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Records injector start/end events and the cancellation token each received.
#[derive(Clone, Default)]
pub struct ExecutionLog {
    events: Arc<Mutex<Vec<String>>>,
    tokens: Arc<Mutex<Vec<(String, CancellationToken)>>>,
}

impl ExecutionLog {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Codes in the order their injectors started.
    pub fn started(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| event.strip_prefix("start:").map(str::to_string))
            .collect()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().iter().position(|e| e == event)
    }

    pub fn track(&self, code: &str, token: CancellationToken) {
        self.tokens.lock().push((code.to_string(), token));
    }

    pub fn token(&self, code: &str) -> Option<CancellationToken> {
        self.tokens
            .lock()
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, token)| token.clone())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEST INJECTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// What a [`TestInjector`] produces once its delay has elapsed.
#[derive(Clone)]
pub enum Behavior {
    Value(InjectableValue),
    Fail(String),
    Absent,
    /// Joins its dependencies' string values with `+`, `-` for missing ones.
    JoinDependencies,
    /// Reads the [`Session`] init data.
    ReadSession,
}

pub struct TestInjector {
    code: String,
    deps: Vec<String>,
    critical: bool,
    timeout: Duration,
    delay: Duration,
    behavior: Behavior,
    default: Option<InjectableValue>,
    group: Option<String>,
    log: Option<ExecutionLog>,
}

impl TestInjector {
    fn with_behavior(code: &str, behavior: Behavior) -> Self {
        Self {
            code: code.to_string(),
            deps: Vec::new(),
            critical: false,
            timeout: Duration::ZERO,
            delay: Duration::ZERO,
            behavior,
            default: None,
            group: None,
            log: None,
        }
    }

    pub fn value(code: &str, value: impl Into<InjectableValue>) -> Self {
        Self::with_behavior(code, Behavior::Value(value.into()))
    }

    pub fn failing(code: &str, message: &str) -> Self {
        Self::with_behavior(code, Behavior::Fail(message.to_string()))
    }

    pub fn absent(code: &str) -> Self {
        Self::with_behavior(code, Behavior::Absent)
    }

    pub fn joining(code: &str, deps: &[&str]) -> Self {
        Self::with_behavior(code, Behavior::JoinDependencies).depends_on(deps)
    }

    pub fn session_reader(code: &str) -> Self {
        Self::with_behavior(code, Behavior::ReadSession)
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| (*d).to_string()).collect();
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_default(mut self, value: impl Into<InjectableValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn logged(mut self, log: &ExecutionLog) -> Self {
        self.log = Some(log.clone());
        self
    }
}

#[async_trait]
impl Injector for TestInjector {
    fn code(&self) -> &str {
        &self.code
    }

    fn data_type(&self) -> ValueType {
        match &self.behavior {
            Behavior::Value(value) => value.value_type(),
            _ => ValueType::String,
        }
    }

    fn default_value(&self) -> Option<InjectableValue> {
        self.default.clone()
    }

    fn dependencies(&self) -> Vec<String> {
        self.deps.clone()
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn group(&self) -> Option<String> {
        self.group.clone()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn resolve(
        &self,
        ctx: &ResolutionContext,
        cancel: CancellationToken,
    ) -> Result<Option<InjectorResult>, InjectorError> {
        if let Some(log) = &self.log {
            log.push(format!("start:{}", self.code));
            log.track(&self.code, cancel.clone());
        }

        if !self.delay.is_zero() {
            tokio::select! {
                () = tokio::time::sleep(self.delay) => {}
                () = cancel.cancelled() => return Err(InjectorError::Cancelled),
            }
        }

        let outcome = match &self.behavior {
            Behavior::Value(value) => Ok(Some(InjectorResult::new(value.clone()))),
            Behavior::Fail(message) => Err(InjectorError::failed(message.clone())),
            Behavior::Absent => Ok(None),
            Behavior::JoinDependencies => {
                let parts: Vec<String> = self
                    .deps
                    .iter()
                    .map(|dep| {
                        ctx.resolved(dep)
                            .and_then(|v| v.as_str().map(str::to_string))
                            .unwrap_or_else(|| "-".to_string())
                    })
                    .collect();
                Ok(Some(InjectorResult::new(parts.join("+"))))
            }
            Behavior::ReadSession => match ctx.init_data::<Session>() {
                Some(session) => Ok(Some(InjectorResult::new(session.token.clone()))),
                None => Err(InjectorError::missing_dependency("session")),
            },
        };

        if let Some(log) = &self.log {
            log.push(format!("end:{}", self.code));
        }
        outcome
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INITIALIZER
// ═══════════════════════════════════════════════════════════════════════════════

/// Init data produced by [`SessionInitializer`].
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
}

pub struct SessionInitializer {
    token: String,
    fail: bool,
    delay: Duration,
}

impl SessionInitializer {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            fail: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl Initializer for SessionInitializer {
    async fn init(&self, _ctx: &ResolutionContext) -> Result<InitData, InjectorError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(InjectorError::failed("session service unavailable"));
        }
        Ok(Arc::new(Session {
            token: self.token.clone(),
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

/// What the provider saw in one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub codes: Vec<String>,
    pub session_token: Option<String>,
}

/// Provider returning a canned response and recording every call.
#[derive(Default)]
pub struct MockProvider {
    response: ProviderResponse,
    failure: Option<ProviderError>,
    delay: Duration,
    catalog: Vec<InjectableDefinition>,
    groups: Vec<InjectableGroup>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, code: &str, value: impl Into<InjectableValue>) -> Self {
        self.response = self.response.with_value(code, value);
        self
    }

    pub fn with_null(mut self, code: &str) -> Self {
        self.response.values.insert(code.to_string(), None);
        self
    }

    pub fn with_error(mut self, code: &str, message: &str) -> Self {
        self.response = self.response.with_error(code, message);
        self
    }

    pub fn failing(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_definition(mut self, definition: InjectableDefinition) -> Self {
        self.catalog.push(definition);
        self
    }

    pub fn with_group(mut self, group: InjectableGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WorkspaceInjectableProvider for MockProvider {
    async fn resolve_injectables(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let session_token = request
            .init_data
            .as_ref()
            .and_then(|data| data.downcast_ref::<Session>())
            .map(|session| session.token.clone());
        self.calls.lock().push(RecordedCall {
            codes: request.codes.clone(),
            session_token,
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(self.response.clone())
    }

    async fn get_injectables(
        &self,
        _ctx: &ResolutionContext,
    ) -> Result<GetInjectablesResult, ProviderError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(GetInjectablesResult {
            injectables: self.catalog.clone(),
            groups: self.groups.clone(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds a registry from `injectors`.
pub fn registry(injectors: Vec<TestInjector>) -> InjectorRegistry {
    let mut registry = InjectorRegistry::new();
    for injector in injectors {
        registry.register(injector);
    }
    registry
}

/// Builds a resolver over `injectors` with no provider.
pub fn resolver(injectors: Vec<TestInjector>) -> InjectableResolver {
    InjectableResolver::new(Arc::new(registry(injectors)))
}

/// A context for tenant `acme`, workspace `sales`.
pub fn context() -> ResolutionContext {
    ResolutionContext::builder()
        .tenant("acme")
        .workspace("sales")
        .build()
}
