//! Internal faults that escape the JSON-RPC error model.
//!
//! Anything the caller can act on is reported inside a JSON-RPC response or
//! a tool result. These errors are the remainder: the transport logs them in
//! full and answers with a generic HTTP 500.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("tool '{tool}' failed: {message}")]
    ToolFailure { tool: String, message: String },
    #[error("failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_display_names_the_tool() {
        let err = McpError::ToolFailure {
            tool: "get_colors".into(),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "tool 'get_colors' failed: boom");
    }
}
