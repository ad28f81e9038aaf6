//! Discovery catalog consumed by the template editor.
//!
//! The resolution path never reads these types; they describe which codes a
//! registry or provider can resolve, with localized labels and format options.

use crate::injector::Injector;
use crate::value::{FormatConfig, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Locale used when a requested locale has no label.
pub const FALLBACK_LOCALE: &str = "en";

/// Where an injectable is resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectableSource {
    /// A code-defined injector in the registry.
    Registry,
    /// The host-supplied provider.
    Provider,
}

/// Catalog entry describing one resolvable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectableDefinition {
    /// Variable code.
    pub code: String,
    /// Declared output type.
    pub data_type: ValueType,
    /// Labels keyed by locale.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Descriptions keyed by locale.
    #[serde(default)]
    pub descriptions: HashMap<String, String>,
    /// Selectable output formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<FormatConfig>,
    /// Group code this entry is listed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Source of the value.
    pub source: InjectableSource,
}

impl InjectableDefinition {
    /// Creates a definition with no labels.
    #[must_use]
    pub fn new(code: impl Into<String>, data_type: ValueType, source: InjectableSource) -> Self {
        Self {
            code: code.into(),
            data_type,
            labels: HashMap::new(),
            descriptions: HashMap::new(),
            formats: None,
            group: None,
            source,
        }
    }

    /// Describes a registry injector. Labels are registered under [`FALLBACK_LOCALE`].
    #[must_use]
    pub fn from_injector(injector: &dyn Injector) -> Self {
        let mut definition = Self::new(
            injector.code(),
            injector.data_type(),
            InjectableSource::Registry,
        );
        definition
            .labels
            .insert(FALLBACK_LOCALE.to_string(), injector.label());
        if let Some(description) = injector.description() {
            definition
                .descriptions
                .insert(FALLBACK_LOCALE.to_string(), description);
        }
        definition.formats = injector.formats();
        definition.group = injector.group();
        definition
    }

    /// Adds a localized label.
    #[must_use]
    pub fn with_label(mut self, locale: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(locale.into(), label.into());
        self
    }

    /// Adds a localized description.
    #[must_use]
    pub fn with_description(
        mut self,
        locale: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.descriptions.insert(locale.into(), description.into());
        self
    }

    /// Sets the catalog group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Label for `locale`, falling back to [`FALLBACK_LOCALE`] and then the code.
    #[must_use]
    pub fn label(&self, locale: &str) -> &str {
        self.labels
            .get(locale)
            .or_else(|| self.labels.get(FALLBACK_LOCALE))
            .map_or(self.code.as_str(), String::as_str)
    }
}

/// A named group of catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectableGroup {
    /// Group code referenced by [`InjectableDefinition::group`].
    pub code: String,
    /// Labels keyed by locale.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Display order, ascending.
    #[serde(default)]
    pub order: i32,
}

/// Everything a provider can resolve for one workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetInjectablesResult {
    /// Resolvable codes.
    pub injectables: Vec<InjectableDefinition>,
    /// Groups referenced by the entries.
    pub groups: Vec<InjectableGroup>,
}
