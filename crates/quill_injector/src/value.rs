//! Resolved injectable values.
//!
//! An [`InjectableValue`] is the payload produced for one variable code. Values
//! are immutable once produced; the resolver clones them into the result map
//! and into the [`ResolutionContext`](crate::context::ResolutionContext).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

// ─────────────────────────────────────────────────────────────────────────────
// ValueType
// ─────────────────────────────────────────────────────────────────────────────

/// Declared output type of an injector or provider variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Free text.
    String,
    /// Floating point number.
    Number,
    /// True/false flag.
    Bool,
    /// Point in time, optionally carrying a display format.
    Time,
    /// Reference to an image asset.
    Image,
    /// Tabular data.
    Table,
}

impl core::fmt::Display for ValueType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Bool => "bool",
            ValueType::Time => "time",
            ValueType::Image => "image",
            ValueType::Table => "table",
        };
        f.write_str(name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value payloads
// ─────────────────────────────────────────────────────────────────────────────

/// A point in time together with the output format selected for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    /// The instant, always stored in UTC.
    pub instant: DateTime<Utc>,
    /// `chrono` strftime pattern used when the value is rendered.
    ///
    /// `None` renders as RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl TimeValue {
    /// Creates a time value without a display format.
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            format: None,
        }
    }

    /// Attaches a strftime pattern used for rendering.
    #[must_use]
    pub fn with_format(mut self, pattern: impl Into<String>) -> Self {
        self.format = Some(pattern.into());
        self
    }

    /// Renders the instant using the attached pattern, or RFC 3339.
    ///
    /// An invalid pattern also falls back to RFC 3339.
    #[must_use]
    pub fn render(&self) -> String {
        use core::fmt::Write;

        let Some(pattern) = &self.format else {
            return self.instant.to_rfc3339();
        };
        let mut out = String::new();
        match write!(out, "{}", self.instant.format(pattern)) {
            Ok(()) => out,
            Err(_) => self.instant.to_rfc3339(),
        }
    }
}

/// Reference to an image asset stored outside the value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Location of the image (URL or storage key).
    pub url: String,
    /// Alternative text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Rendered width in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Rendered height in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageRef {
    /// Creates an image reference with no size hints.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
            width: None,
            height: None,
        }
    }
}

/// Column headers plus rows of cell values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableValue {
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows; each row holds one cell per column.
    pub rows: Vec<Vec<InjectableValue>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// InjectableValue
// ─────────────────────────────────────────────────────────────────────────────

/// The resolved payload for a single variable code.
///
/// # Example
///
/// ```
/// use quill_injector::value::{InjectableValue, ValueType};
///
/// let value = InjectableValue::from("ACME Corp");
/// assert_eq!(value.value_type(), ValueType::String);
/// assert_eq!(value.to_plain(), serde_json::json!("ACME Corp"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InjectableValue {
    /// Free text.
    String(String),
    /// Floating point number.
    Number(f64),
    /// True/false flag.
    Bool(bool),
    /// Point in time.
    Time(TimeValue),
    /// Image reference.
    Image(ImageRef),
    /// Tabular data.
    Table(TableValue),
}

impl InjectableValue {
    /// Returns the [`ValueType`] matching this variant.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            InjectableValue::String(_) => ValueType::String,
            InjectableValue::Number(_) => ValueType::Number,
            InjectableValue::Bool(_) => ValueType::Bool,
            InjectableValue::Time(_) => ValueType::Time,
            InjectableValue::Image(_) => ValueType::Image,
            InjectableValue::Table(_) => ValueType::Table,
        }
    }

    /// Unwraps the value into a plain JSON value for the rendering backend.
    ///
    /// Time values are rendered with their format (RFC 3339 if none), integral
    /// numbers stay integral, tables become `{"columns": [...], "rows": [...]}`.
    #[must_use]
    pub fn to_plain(&self) -> serde_json::Value {
        match self {
            InjectableValue::String(s) => serde_json::Value::String(s.clone()),
            InjectableValue::Number(n) => plain_number(*n),
            InjectableValue::Bool(b) => serde_json::Value::Bool(*b),
            InjectableValue::Time(t) => serde_json::Value::String(t.render()),
            InjectableValue::Image(image) => {
                serde_json::to_value(image).unwrap_or(serde_json::Value::Null)
            }
            InjectableValue::Table(table) => {
                let rows: Vec<Vec<serde_json::Value>> = table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(InjectableValue::to_plain).collect())
                    .collect();
                json!({ "columns": table.columns, "rows": rows })
            }
        }
    }

    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InjectableValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if this is a number value.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            InjectableValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the time payload, if this is a time value.
    #[must_use]
    pub fn as_time(&self) -> Option<&TimeValue> {
        match self {
            InjectableValue::Time(t) => Some(t),
            _ => None,
        }
    }
}

fn plain_number(n: f64) -> serde_json::Value {
    // f64 -> i64 is exact for integral values in this range
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

impl From<&str> for InjectableValue {
    fn from(value: &str) -> Self {
        InjectableValue::String(value.to_string())
    }
}

impl From<String> for InjectableValue {
    fn from(value: String) -> Self {
        InjectableValue::String(value)
    }
}

impl From<f64> for InjectableValue {
    fn from(value: f64) -> Self {
        InjectableValue::Number(value)
    }
}

impl From<i64> for InjectableValue {
    fn from(value: i64) -> Self {
        InjectableValue::Number(value as f64)
    }
}

impl From<bool> for InjectableValue {
    fn from(value: bool) -> Self {
        InjectableValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for InjectableValue {
    fn from(value: DateTime<Utc>) -> Self {
        InjectableValue::Time(TimeValue::new(value))
    }
}

impl From<TimeValue> for InjectableValue {
    fn from(value: TimeValue) -> Self {
        InjectableValue::Time(value)
    }
}

impl From<ImageRef> for InjectableValue {
    fn from(value: ImageRef) -> Self {
        InjectableValue::Image(value)
    }
}

impl From<TableValue> for InjectableValue {
    fn from(value: TableValue) -> Self {
        InjectableValue::Table(value)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FormatConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Selectable output renderings for an injector (e.g. date formats).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Format used when the request selects none, or an unknown one.
    pub default: String,
    /// All selectable formats, including the default.
    pub options: Vec<String>,
}

impl FormatConfig {
    /// Creates a format config. The default is added to `options` if missing.
    #[must_use]
    pub fn new<I, S>(default: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default = default.into();
        let mut options: Vec<String> = options.into_iter().map(Into::into).collect();
        if !options.contains(&default) {
            options.insert(0, default.clone());
        }
        Self { default, options }
    }

    /// Returns `requested` if it is a known option, otherwise the default.
    #[must_use]
    pub fn select<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(format) if self.options.iter().any(|o| o == format) => format,
            _ => &self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn value_type_matches_variant() {
        assert_eq!(InjectableValue::from(1.5).value_type(), ValueType::Number);
        assert_eq!(InjectableValue::from(true).value_type(), ValueType::Bool);
        assert_eq!(
            InjectableValue::from(ImageRef::new("s3://logo.png")).value_type(),
            ValueType::Image
        );
    }

    #[test]
    fn integral_numbers_render_as_integers() {
        assert_eq!(InjectableValue::from(2024_i64).to_plain(), json!(2024));
        assert_eq!(InjectableValue::from(19.99).to_plain(), json!(19.99));
    }

    #[test]
    fn time_renders_with_format() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let plain = InjectableValue::from(TimeValue::new(instant).with_format("%d/%m/%Y")).to_plain();
        assert_eq!(plain, json!("09/03/2024"));

        let rfc = InjectableValue::from(instant).to_plain();
        assert_eq!(rfc, json!("2024-03-09T14:05:00+00:00"));
    }

    #[test]
    fn invalid_pattern_falls_back_to_rfc3339() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let value = TimeValue::new(instant).with_format("%Q");
        assert_eq!(value.render(), "2024-03-09T14:05:00+00:00");
    }

    #[test]
    fn table_renders_nested_cells() {
        let table = TableValue {
            columns: vec!["item".into(), "qty".into()],
            rows: vec![vec!["bolt".into(), InjectableValue::from(4_i64)]],
        };
        assert_eq!(
            InjectableValue::from(table).to_plain(),
            json!({ "columns": ["item", "qty"], "rows": [["bolt", 4]] })
        );
    }

    #[test]
    fn serde_uses_tagged_representation() {
        let value: InjectableValue =
            serde_json::from_value(json!({ "type": "string", "value": "hello" })).unwrap();
        assert_eq!(value, InjectableValue::from("hello"));
    }

    #[test]
    fn format_select_falls_back_to_default() {
        let formats = FormatConfig::new("DD/MM/YYYY", ["MM/DD/YYYY"]);
        assert_eq!(formats.options, vec!["DD/MM/YYYY", "MM/DD/YYYY"]);
        assert_eq!(formats.select(Some("MM/DD/YYYY")), "MM/DD/YYYY");
        assert_eq!(formats.select(Some("bogus")), "DD/MM/YYYY");
        assert_eq!(formats.select(None), "DD/MM/YYYY");
    }
}
