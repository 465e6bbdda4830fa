// SPDX-FileCopyrightText: 2026 Tollgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tolerant JSON field access shared by the provider parsers.
//!
//! Schema drift is expected: unknown fields are ignored and missing or
//! mistyped fields read as zero/empty rather than failing.

use serde_json::Value;

/// Parse a response body as JSON, or `None` for malformed input.
pub(crate) fn parse_body(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Read an unsigned integer at a JSON pointer, defaulting to 0.
///
/// Accepts numbers and numeric strings (some providers stringify
/// counters).
pub(crate) fn u64_at(value: &Value, pointer: &str) -> u64 {
    match value.pointer(pointer) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Read a float at a JSON pointer, defaulting to 0.0.
pub(crate) fn f64_at(value: &Value, pointer: &str) -> f64 {
    match value.pointer(pointer) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Read a string at a JSON pointer, `None` when absent or non-string.
pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_mistyped_fields_read_as_zero() {
        let v: Value = serde_json::json!({"usage": {"input_tokens": "100", "weird": [1]}});
        assert_eq!(u64_at(&v, "/usage/input_tokens"), 100);
        assert_eq!(u64_at(&v, "/usage/output_tokens"), 0);
        assert_eq!(u64_at(&v, "/usage/weird"), 0);
        assert_eq!(f64_at(&v, "/usage/duration"), 0.0);
        assert!(str_at(&v, "/model").is_none());
    }

    #[test]
    fn malformed_body_is_none() {
        assert!(parse_body(b"not json").is_none());
        assert!(parse_body(b"{\"ok\":true}").is_some());
    }
}
