//! Per-request resolution state.
//!
//! A [`ResolutionContext`] is created once per render or preview request and
//! discarded when the request ends. It carries the ambient request data
//! injectors read (identifiers, headers, payload, selected formats), the
//! initializer result, and the values resolved so far.
//!
//! # Concurrency
//!
//! Injectors in one level run concurrently against a shared `&ResolutionContext`.
//! The resolved-value map is guarded by a read/write lock and is write-once
//! per code, so later levels observe every value written by earlier ones.

use crate::value::InjectableValue;
use core::any::Any;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Shared data produced by the registry initializer.
pub type InitData = Arc<dyn Any + Send + Sync>;

/// Per-request carrier of ambient data and resolved values.
///
/// # Example
///
/// ```
/// use quill_injector::context::ResolutionContext;
///
/// let ctx = ResolutionContext::builder()
///     .tenant("acme")
///     .workspace("sales")
///     .header("Accept-Language", "en")
///     .format("current_date", "YYYY-MM-DD")
///     .build();
///
/// assert_eq!(ctx.header("accept-language"), Some("en"));
/// assert_eq!(ctx.selected_format("current_date"), Some("YYYY-MM-DD"));
/// ```
#[derive(Default)]
pub struct ResolutionContext {
    tenant_code: String,
    workspace_code: String,
    template_id: Option<String>,
    /// Header names are stored lowercased.
    headers: HashMap<String, String>,
    payload: serde_json::Value,
    external_ids: HashMap<String, String>,
    selected_formats: HashMap<String, String>,
    init_data: OnceLock<InitData>,
    resolved: RwLock<HashMap<String, InjectableValue>>,
}

impl core::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("tenant_code", &self.tenant_code)
            .field("workspace_code", &self.workspace_code)
            .field("template_id", &self.template_id)
            .field("selected_formats", &self.selected_formats)
            .field("has_init_data", &self.init_data.get().is_some())
            .field("resolved", &self.resolved.read().len())
            .finish_non_exhaustive()
    }
}

impl ResolutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a context.
    #[must_use]
    pub fn builder() -> ResolutionContextBuilder {
        ResolutionContextBuilder::default()
    }

    /// Tenant identifier.
    #[must_use]
    pub fn tenant_code(&self) -> &str {
        &self.tenant_code
    }

    /// Workspace identifier.
    #[must_use]
    pub fn workspace_code(&self) -> &str {
        &self.workspace_code
    }

    /// Template being rendered, if known.
    #[must_use]
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    /// All request headers, keyed by lowercased name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks up a header by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Opaque render payload supplied by the caller.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// External identifiers (e.g. CRM record ids) keyed by system name.
    #[must_use]
    pub fn external_ids(&self) -> &HashMap<String, String> {
        &self.external_ids
    }

    /// Looks up one external identifier.
    #[must_use]
    pub fn external_id(&self, system: &str) -> Option<&str> {
        self.external_ids.get(system).map(String::as_str)
    }

    /// Output format the request selected for `code`.
    #[must_use]
    pub fn selected_format(&self, code: &str) -> Option<&str> {
        self.selected_formats.get(code).map(String::as_str)
    }

    /// All selected output formats.
    #[must_use]
    pub fn selected_formats(&self) -> &HashMap<String, String> {
        &self.selected_formats
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Init data
    // ─────────────────────────────────────────────────────────────────────────

    /// Stores the initializer result.
    ///
    /// Returns `false` if init data was already set; the first value is kept.
    pub fn set_init_data(&self, data: InitData) -> bool {
        self.init_data.set(data).is_ok()
    }

    /// Returns the initializer result downcast to `T`.
    #[must_use]
    pub fn init_data<T: Any>(&self) -> Option<&T> {
        self.init_data.get()?.downcast_ref::<T>()
    }

    /// Returns the type-erased initializer result.
    #[must_use]
    pub fn init_data_raw(&self) -> Option<InitData> {
        self.init_data.get().cloned()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolved values
    // ─────────────────────────────────────────────────────────────────────────

    /// Records the resolved value for `code`.
    ///
    /// Write-once: returns `false` and keeps the existing value if `code` was
    /// already resolved.
    pub fn set_resolved(&self, code: impl Into<String>, value: InjectableValue) -> bool {
        let mut resolved = self.resolved.write();
        match resolved.entry(code.into()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Returns a clone of the resolved value for `code`.
    #[must_use]
    pub fn resolved(&self, code: &str) -> Option<InjectableValue> {
        self.resolved.read().get(code).cloned()
    }

    /// Returns whether `code` has been resolved.
    #[must_use]
    pub fn is_resolved(&self, code: &str) -> bool {
        self.resolved.read().contains_key(code)
    }

    /// Returns a copy of every value resolved so far.
    #[must_use]
    pub fn resolved_snapshot(&self) -> HashMap<String, InjectableValue> {
        self.resolved.read().clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`ResolutionContext`].
#[derive(Debug, Default)]
pub struct ResolutionContextBuilder {
    tenant_code: String,
    workspace_code: String,
    template_id: Option<String>,
    headers: HashMap<String, String>,
    payload: serde_json::Value,
    external_ids: HashMap<String, String>,
    selected_formats: HashMap<String, String>,
}

impl ResolutionContextBuilder {
    /// Sets the tenant identifier.
    #[must_use]
    pub fn tenant(mut self, code: impl Into<String>) -> Self {
        self.tenant_code = code.into();
        self
    }

    /// Sets the workspace identifier.
    #[must_use]
    pub fn workspace(mut self, code: impl Into<String>) -> Self {
        self.workspace_code = code.into();
        self
    }

    /// Sets the template identifier.
    #[must_use]
    pub fn template(mut self, id: impl Into<String>) -> Self {
        self.template_id = Some(id.into());
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the opaque render payload.
    #[must_use]
    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Adds an external identifier.
    #[must_use]
    pub fn external_id(mut self, system: impl Into<String>, id: impl Into<String>) -> Self {
        self.external_ids.insert(system.into(), id.into());
        self
    }

    /// Selects an output format for `code`.
    #[must_use]
    pub fn format(mut self, code: impl Into<String>, format: impl Into<String>) -> Self {
        self.selected_formats.insert(code.into(), format.into());
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> ResolutionContext {
        ResolutionContext {
            tenant_code: self.tenant_code,
            workspace_code: self.workspace_code,
            template_id: self.template_id,
            headers: self.headers,
            payload: self.payload,
            external_ids: self.external_ids,
            selected_formats: self.selected_formats,
            init_data: OnceLock::new(),
            resolved: RwLock::new(HashMap::new()),
        }
    }
}
