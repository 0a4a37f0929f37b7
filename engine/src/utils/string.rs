//! String utility functions

/// True when the value is empty or contains only whitespace
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Return the value when present and not blank
pub fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !is_blank(v))
}

/// Split a comma-separated list, trimming each part.
///
/// Trailing empty parts are dropped (`"a,b,"` yields two parts) while
/// interior empty parts are kept (`"a,,b"` yields three).
pub fn split_list(value: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = value.split(',').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts.into_iter().map(str::trim).collect()
}
