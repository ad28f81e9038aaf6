//! The per-call result accumulator.

use parking_lot::Mutex;
use quill_injector::{InjectableValue, InjectorError, InjectorRegistry, InjectorResult};
use std::collections::HashMap;

/// Metadata attached to one code.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Plain contents of a [`ResolveResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveParts {
    /// Successfully resolved values.
    pub values: HashMap<String, InjectableValue>,
    /// Non-critical failures.
    pub errors: HashMap<String, InjectorError>,
    /// Side-channel data reported by injectors.
    pub metadata: HashMap<String, Metadata>,
}

/// Accumulated outcome of one resolution call.
///
/// Written concurrently by the injectors of a level; every access takes the
/// internal lock. A code may have an error without a value; callers must check
/// [`errors`](Self::errors) even when resolution returned `Ok`.
#[derive(Debug, Default)]
pub struct ResolveResult {
    inner: Mutex<ResolveParts>,
}

impl ResolveResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an injector's output (value plus any metadata).
    pub fn record(&self, code: &str, result: InjectorResult) {
        let mut inner = self.inner.lock();
        if !result.metadata.is_empty() {
            inner
                .metadata
                .entry(code.to_string())
                .or_default()
                .extend(result.metadata);
        }
        inner.values.insert(code.to_string(), result.value);
    }

    /// Records a resolved value.
    pub fn insert_value(&self, code: impl Into<String>, value: InjectableValue) {
        self.inner.lock().values.insert(code.into(), value);
    }

    /// Records a non-critical failure.
    pub fn insert_error(&self, code: impl Into<String>, error: InjectorError) {
        self.inner.lock().errors.insert(code.into(), error);
    }

    /// Records one metadata entry for `code`.
    pub fn insert_metadata(
        &self,
        code: impl Into<String>,
        key: impl Into<String>,
        value: serde_json::Value,
    ) {
        self.inner
            .lock()
            .metadata
            .entry(code.into())
            .or_default()
            .insert(key.into(), value);
    }

    /// Returns the value resolved for `code`.
    #[must_use]
    pub fn value(&self, code: &str) -> Option<InjectableValue> {
        self.inner.lock().values.get(code).cloned()
    }

    /// Returns the failure recorded for `code`.
    #[must_use]
    pub fn error(&self, code: &str) -> Option<InjectorError> {
        self.inner.lock().errors.get(code).cloned()
    }

    /// Returns a copy of all resolved values.
    #[must_use]
    pub fn values(&self) -> HashMap<String, InjectableValue> {
        self.inner.lock().values.clone()
    }

    /// Returns a copy of all non-critical failures.
    #[must_use]
    pub fn errors(&self) -> HashMap<String, InjectorError> {
        self.inner.lock().errors.clone()
    }

    /// Returns a copy of all metadata.
    #[must_use]
    pub fn metadata(&self) -> HashMap<String, Metadata> {
        self.inner.lock().metadata.clone()
    }

    /// Returns the metadata recorded for `code`.
    #[must_use]
    pub fn metadata_for(&self, code: &str) -> Option<Metadata> {
        self.inner.lock().metadata.get(code).cloned()
    }

    /// Returns true if any code failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.inner.lock().errors.is_empty()
    }

    /// Returns the number of resolved values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().values.len()
    }

    /// Returns true if no value was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().values.is_empty()
    }

    /// Consumes the result into its plain maps.
    #[must_use]
    pub fn into_parts(self) -> ResolveParts {
        self.inner.into_inner()
    }

    /// Fills unresolved registry codes among `codes` from their injector's
    /// [`default_value`](quill_injector::Injector::default_value).
    ///
    /// The resolver never does this on its own; it is for consumers that prefer
    /// defaults over blanks. Returns the number of values filled.
    pub fn apply_defaults<S: AsRef<str>>(&self, registry: &InjectorRegistry, codes: &[S]) -> usize {
        let mut inner = self.inner.lock();
        let mut filled = 0;
        for code in codes {
            let code = code.as_ref();
            if inner.values.contains_key(code) {
                continue;
            }
            let Some(default) = registry.get(code).and_then(|i| i.default_value()) else {
                continue;
            };
            inner.values.insert(code.to_string(), default);
            filled += 1;
        }
        filled
    }
}

impl From<ResolveParts> for ResolveResult {
    fn from(parts: ResolveParts) -> Self {
        Self {
            inner: Mutex::new(parts),
        }
    }
}
