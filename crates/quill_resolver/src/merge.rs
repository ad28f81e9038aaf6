//! Merging resolved values with caller-supplied overrides.

use crate::result::ResolveResult;
use std::collections::HashMap;

/// Combines resolved values with values supplied in the render payload.
///
/// Every resolved value is unwrapped to a plain JSON value, then every key in
/// `payload_values` overwrites it. No type compatibility is checked: this is a
/// last-write-wins merge, and a JSON `null` in the payload still overrides.
///
/// # Example
///
/// ```
/// use quill_injector::InjectableValue;
/// use quill_resolver::{ResolveResult, merge_with_payload_values};
/// use serde_json::json;
///
/// let resolved = ResolveResult::new();
/// resolved.insert_value("a", InjectableValue::from(1_i64));
/// resolved.insert_value("b", InjectableValue::from(2_i64));
///
/// let overrides = json!({ "b": 99 });
/// let merged = merge_with_payload_values(&resolved, overrides.as_object().unwrap());
///
/// assert_eq!(merged["a"], json!(1));
/// assert_eq!(merged["b"], json!(99));
/// ```
#[must_use]
pub fn merge_with_payload_values(
    resolved: &ResolveResult,
    payload_values: &serde_json::Map<String, serde_json::Value>,
) -> HashMap<String, serde_json::Value> {
    let mut merged: HashMap<String, serde_json::Value> = resolved
        .values()
        .iter()
        .map(|(code, value)| (code.clone(), value.to_plain()))
        .collect();

    for (code, value) in payload_values {
        merged.insert(code.clone(), value.clone());
    }

    merged
}
