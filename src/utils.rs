//! Utility functions for the design catalog MCP server

use serde_json::{Map, Value};

use crate::mcp::tools::ToolError;

/// Extracts a required, non-empty string argument.
pub fn get_required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ToolError::InvalidArguments(format!(
            "Missing or invalid required argument: '{}'",
            key
        ))),
    }
}

/// Extracts an optional string argument; blank strings count as absent.
pub fn get_optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn get_optional_bool(args: &Map<String, Value>, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

/// Extracts the client key from an `X-Forwarded-For` value: the first
/// address, trimmed, or `"unknown"`.
pub fn client_key(forwarded_for: Option<&str>) -> String {
    forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
