//! User-authored workspace variables served through the provider contract.
//!
//! Workspace editors define static variables (a company address, a standard
//! disclaimer) per tenant and workspace. [`WorkspaceVariablesProvider`] serves
//! them to the resolver for every code the injector registry does not own.

use crate::format::strftime_pattern;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use quill_injector::{
    FALLBACK_LOCALE, GetInjectablesResult, InjectableDefinition, InjectableGroup,
    InjectableSource, InjectableValue, ProviderError, ProviderRequest, ProviderResponse,
    ResolutionContext, WorkspaceInjectableProvider,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while loading workspace variables.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The variables document is not valid JSON or has the wrong shape.
    #[error("invalid workspace variables document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document defines the same code twice.
    #[error("variable '{0}' is defined more than once")]
    DuplicateCode(String),
}

/// One user-authored variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceVariable {
    /// Variable code referenced by templates.
    pub code: String,
    /// The value served for every request.
    pub value: InjectableValue,
    /// Labels keyed by locale.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Free-form description shown in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catalog group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl WorkspaceVariable {
    /// Creates a variable with no labels.
    #[must_use]
    pub fn new(code: impl Into<String>, value: impl Into<InjectableValue>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
            labels: HashMap::new(),
            description: None,
            group: None,
        }
    }

    /// Adds a localized label.
    #[must_use]
    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(locale.into(), label.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the catalog group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Catalog entry for this variable.
    #[must_use]
    pub fn definition(&self) -> InjectableDefinition {
        let mut definition = InjectableDefinition::new(
            self.code.clone(),
            self.value.value_type(),
            InjectableSource::Provider,
        );
        definition.labels = self.labels.clone();
        if let Some(description) = &self.description {
            definition
                .descriptions
                .insert(FALLBACK_LOCALE.to_string(), description.clone());
        }
        definition.group = self.group.clone();
        definition
    }

    /// The value to serve, with the selected display format applied to times.
    fn render_value(&self, selected_format: Option<&str>) -> InjectableValue {
        match (&self.value, selected_format.and_then(strftime_pattern)) {
            (InjectableValue::Time(time), Some(pattern)) => {
                InjectableValue::Time(time.clone().with_format(pattern))
            }
            (value, _) => value.clone(),
        }
    }
}

type WorkspaceKey = (String, String);

/// In-memory provider of workspace variables keyed by tenant and workspace.
///
/// # Example
///
/// ```
/// use quill_core::{WorkspaceVariable, WorkspaceVariablesProvider};
///
/// let provider = WorkspaceVariablesProvider::new().with_variable(
///     "acme",
///     "sales",
///     WorkspaceVariable::new("company_address", "1 Main St"),
/// );
/// assert_eq!(provider.variables("acme", "sales").len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct WorkspaceVariablesProvider {
    workspaces: RwLock<HashMap<WorkspaceKey, IndexMap<String, WorkspaceVariable>>>,
}

impl WorkspaceVariablesProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `variable` and returns the provider.
    #[must_use]
    pub fn with_variable(
        self,
        tenant: impl Into<String>,
        workspace: impl Into<String>,
        variable: WorkspaceVariable,
    ) -> Self {
        self.define(tenant, workspace, variable);
        self
    }

    /// Defines or replaces a variable. Returns the replaced definition.
    pub fn define(
        &self,
        tenant: impl Into<String>,
        workspace: impl Into<String>,
        variable: WorkspaceVariable,
    ) -> Option<WorkspaceVariable> {
        self.workspaces
            .write()
            .entry((tenant.into(), workspace.into()))
            .or_default()
            .insert(variable.code.clone(), variable)
    }

    /// Removes a variable. Returns the removed definition.
    pub fn remove(&self, tenant: &str, workspace: &str, code: &str) -> Option<WorkspaceVariable> {
        self.workspaces
            .write()
            .get_mut(&(tenant.to_string(), workspace.to_string()))
            .and_then(|variables| variables.shift_remove(code))
    }

    /// Returns the workspace's variables in definition order.
    #[must_use]
    pub fn variables(&self, tenant: &str, workspace: &str) -> Vec<WorkspaceVariable> {
        self.workspaces
            .read()
            .get(&(tenant.to_string(), workspace.to_string()))
            .map(|variables| variables.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Defines every variable in a JSON array of [`WorkspaceVariable`]s.
    ///
    /// Nothing is defined if the document is invalid. Returns the number of
    /// variables defined.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] if the document cannot be parsed or repeats
    /// a code.
    pub fn load_json(
        &self,
        tenant: &str,
        workspace: &str,
        json: &str,
    ) -> Result<usize, WorkspaceError> {
        let variables: Vec<WorkspaceVariable> = serde_json::from_str(json)?;

        let mut parsed: IndexMap<String, WorkspaceVariable> = IndexMap::new();
        for variable in variables {
            if parsed.contains_key(&variable.code) {
                return Err(WorkspaceError::DuplicateCode(variable.code));
            }
            parsed.insert(variable.code.clone(), variable);
        }

        let count = parsed.len();
        self.workspaces
            .write()
            .entry((tenant.to_string(), workspace.to_string()))
            .or_default()
            .extend(parsed);

        tracing::debug!(tenant, workspace, count, "loaded workspace variables");
        Ok(count)
    }
}

#[async_trait]
impl WorkspaceInjectableProvider for WorkspaceVariablesProvider {
    async fn resolve_injectables(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let workspaces = self.workspaces.read();
        let variables = workspaces.get(&(
            request.tenant_code.clone(),
            request.workspace_code.clone(),
        ));

        let mut response = ProviderResponse::new();
        for code in &request.codes {
            match variables.and_then(|vars| vars.get(code)) {
                Some(variable) => {
                    let format = request.selected_formats.get(code).map(String::as_str);
                    response
                        .values
                        .insert(code.clone(), Some(variable.render_value(format)));
                }
                None => {
                    response.errors.insert(
                        code.clone(),
                        format!(
                            "variable '{code}' is not defined in workspace '{}'",
                            request.workspace_code
                        ),
                    );
                }
            }
        }

        tracing::debug!(
            tenant = %request.tenant_code,
            workspace = %request.workspace_code,
            resolved = response.values.len(),
            missing = response.errors.len(),
            "served workspace variables"
        );
        Ok(response)
    }

    async fn get_injectables(
        &self,
        ctx: &ResolutionContext,
    ) -> Result<GetInjectablesResult, ProviderError> {
        let variables = self.variables(ctx.tenant_code(), ctx.workspace_code());

        let mut groups: Vec<InjectableGroup> = Vec::new();
        for group in variables.iter().filter_map(|v| v.group.as_deref()) {
            if groups.iter().all(|g| g.code != group) {
                groups.push(InjectableGroup {
                    code: group.to_string(),
                    labels: HashMap::new(),
                    order: i32::try_from(groups.len()).unwrap_or(i32::MAX),
                });
            }
        }

        Ok(GetInjectablesResult {
            injectables: variables.iter().map(WorkspaceVariable::definition).collect(),
            groups,
        })
    }
}
