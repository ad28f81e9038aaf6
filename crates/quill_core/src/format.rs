//! Translation of editor date/time format names to `chrono` patterns.
//!
//! Templates select formats with the token names users know (`DD/MM/YYYY`,
//! `hh:mm A`); rendering needs strftime patterns.

/// Format name that renders as RFC 3339.
pub const RFC3339: &str = "RFC3339";

/// Recognized tokens, longest first so `MMMM` wins over `MM`.
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("A", "%p"),
];

/// Converts a format name to a strftime pattern.
///
/// Returns `None` for [`RFC3339`], which [`TimeValue`](quill_injector::TimeValue)
/// renders natively. Characters that are not tokens are copied as literals.
///
/// ```
/// use quill_core::strftime_pattern;
///
/// assert_eq!(strftime_pattern("DD/MM/YYYY").as_deref(), Some("%d/%m/%Y"));
/// assert_eq!(strftime_pattern("hh:mm A").as_deref(), Some("%I:%M %p"));
/// assert_eq!(strftime_pattern("RFC3339"), None);
/// ```
#[must_use]
pub fn strftime_pattern(format: &str) -> Option<String> {
    if format == RFC3339 {
        return None;
    }

    let mut pattern = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'scan: while !rest.is_empty() {
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                pattern.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                pattern.push_str("%%");
            } else {
                pattern.push(c);
            }
        }
        rest = chars.as_str();
    }

    Some(pattern)
}
