//! # Tool Registry
//!
//! Every MCP tool is a [`Tool`] value: a name, a description, an argument
//! schema and a handler. The same argument schema renders the `inputSchema`
//! returned by `tools/list` and validates `tools/call` arguments, so the two
//! cannot drift apart.
//!
//! ## Registered Tools
//!
//! ### Patterns
//! - `list_patterns`, `get_pattern`, `search_patterns`, `get_pattern_examples`
//!
//! ### Style guide
//! - `get_style_guide`, `get_colors`, `get_typography`, `get_spacing`,
//!   `get_breakpoints`, `get_design_system_info`
//!
//! ### Web components
//! - `list_components`, `get_component`, `search_components`
//!
//! ### Scaffolding
//! - `generate_boilerplate`

pub mod boilerplate;
pub mod components;
pub mod patterns;
pub mod style_guide;

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::catalog::Catalog;
use crate::error::McpError;
use crate::mcp::protocol::{ToolDefinition, ToolResult};

#[derive(Error, Debug)]
pub enum ToolError {
    /// Arguments missing or malformed; reported to the caller as `isError`.
    #[error("{0}")]
    InvalidArguments(String),
    /// Lookup miss in the catalog; reported to the caller as `isError`.
    #[error("{0}")]
    NotFound(String),
    /// Unexpected fault; surfaces as an internal server error.
    #[error("{0}")]
    Internal(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgKind {
    String,
    Boolean,
    Enum(&'static [&'static str]),
}

/// One named argument of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub description: &'static str,
}

impl ArgSpec {
    pub const fn required(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }

    fn check(&self, value: Option<&Value>) -> Result<(), String> {
        let value = match value {
            None | Some(Value::Null) if self.required => {
                return Err(format!("Missing required argument: '{}'", self.name))
            }
            None | Some(Value::Null) => return Ok(()),
            Some(v) => v,
        };

        match self.kind {
            ArgKind::String => match value.as_str() {
                Some(s) if self.required && s.trim().is_empty() => {
                    Err(format!("Argument '{}' must not be empty", self.name))
                }
                Some(_) => Ok(()),
                None => Err(format!("Argument '{}' must be a string", self.name)),
            },
            ArgKind::Boolean => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(format!("Argument '{}' must be a boolean", self.name)),
            },
            ArgKind::Enum(allowed) => match value.as_str() {
                Some(s) if !self.required && s.trim().is_empty() => Ok(()),
                Some(s) if allowed.iter().any(|a| a.eq_ignore_ascii_case(s.trim())) => Ok(()),
                Some(s) => Err(format!(
                    "Invalid value '{}' for argument '{}'. Valid values: {}",
                    s,
                    self.name,
                    allowed.join(", ")
                )),
                None => Err(format!(
                    "Argument '{}' must be one of: {}",
                    self.name,
                    allowed.join(", ")
                )),
            },
        }
    }

    fn json_schema(&self) -> Value {
        match self.kind {
            ArgKind::String => json!({ "type": "string", "description": self.description }),
            ArgKind::Boolean => json!({ "type": "boolean", "description": self.description }),
            ArgKind::Enum(allowed) => json!({
                "type": "string",
                "enum": allowed,
                "description": self.description
            }),
        }
    }
}

/// Validates arguments against a schema, reporting every problem at once.
pub fn validate_arguments(specs: &[ArgSpec], args: &Map<String, Value>) -> Result<(), ToolError> {
    let problems: Vec<String> = specs
        .iter()
        .filter_map(|spec| spec.check(args.get(spec.name)).err())
        .collect();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ToolError::InvalidArguments(problems.join(". ")))
    }
}

/// Renders a schema as a JSON-Schema object.
pub fn input_schema(specs: &[ArgSpec]) -> Value {
    let mut properties = Map::new();
    for spec in specs {
        properties.insert(spec.name.to_string(), spec.json_schema());
    }
    let required: Vec<&str> = specs
        .iter()
        .filter(|s| s.required)
        .map(|s| s.name)
        .collect();

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

pub type ToolHandler = fn(&Map<String, Value>, &Catalog) -> Result<ToolResult, ToolError>;

/// Appended to argument errors so the caller learns the valid values.
pub type ToolHint = fn(&Catalog) -> String;

#[derive(Clone, Copy)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [ArgSpec],
    pub handler: ToolHandler,
    pub hint: Option<ToolHint>,
}

impl Tool {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: input_schema(self.arguments),
        }
    }

    fn explain(&self, message: String, catalog: &Catalog) -> ToolResult {
        match self.hint {
            Some(hint) => ToolResult::error(format!("{}. {}", message, hint(catalog))),
            None => ToolResult::error(message),
        }
    }
}

/// Fixed, immutable set of tools, in registration order.
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Tool>) -> Self {
        let mut index = HashMap::with_capacity(tools.len());
        let mut unique = Vec::with_capacity(tools.len());
        for tool in tools {
            if index.contains_key(tool.name) {
                warn!(tool = tool.name, "duplicate tool registration ignored");
                continue;
            }
            index.insert(tool.name, unique.len());
            unique.push(tool);
        }
        Self {
            tools: unique,
            index,
        }
    }

    /// Registry holding every built-in tool.
    pub fn builtin() -> Self {
        let mut tools = Vec::new();
        tools.extend(patterns::tools());
        tools.extend(style_guide::tools());
        tools.extend(components::tools());
        tools.extend(boilerplate::tools());
        Self::new(tools)
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    /// Resolves, validates and runs a tool.
    ///
    /// Caller mistakes come back as `isError` results; only internal faults
    /// are returned as `Err`.
    pub fn call(
        &self,
        name: &str,
        args: &Map<String, Value>,
        catalog: &Catalog,
    ) -> Result<ToolResult, McpError> {
        let tool = match self.get(name) {
            Some(tool) => tool,
            None => {
                return Ok(ToolResult::error(format!(
                    "Unknown tool: '{}'. Available tools: {}",
                    name,
                    self.names().join(", ")
                )))
            }
        };

        if let Err(ToolError::InvalidArguments(message)) = validate_arguments(tool.arguments, args)
        {
            return Ok(tool.explain(message, catalog));
        }

        match (tool.handler)(args, catalog) {
            Ok(result) => Ok(result),
            Err(ToolError::InvalidArguments(message)) => Ok(tool.explain(message, catalog)),
            Err(ToolError::NotFound(message)) => Ok(ToolResult::error(message)),
            Err(ToolError::Internal(message)) => {
                error!(tool = tool.name, %message, "tool execution failed");
                Err(McpError::ToolFailure {
                    tool: tool.name.to_string(),
                    message,
                })
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &[ArgSpec] = &[ArgSpec::optional(
        "section",
        ArgKind::Enum(&["colors", "spacing"]),
        "Section",
    )];

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn builtin_registry_has_unique_names() {
        let registry = ToolRegistry::builtin();
        assert_eq!(registry.len(), 14);
        let mut names = registry.names();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn enum_values_are_enforced() {
        let err = validate_arguments(SECTION, &args(json!({"section": "icons"}))).unwrap_err();
        assert!(err.to_string().contains("Valid values: colors, spacing"));
        assert!(validate_arguments(SECTION, &args(json!({}))).is_ok());
    }

    #[test]
    fn blank_optional_enum_counts_as_absent() {
        assert!(validate_arguments(SECTION, &args(json!({"section": ""}))).is_ok());
        assert!(validate_arguments(SECTION, &args(json!({"section": "  "}))).is_ok());

        const MODE: &[ArgSpec] = &[ArgSpec::required("mode", ArgKind::Enum(&["a", "b"]), "Mode")];
        assert!(validate_arguments(MODE, &args(json!({"mode": ""}))).is_err());
    }

    #[test]
    fn schema_lists_required_fields() {
        let specs = &[
            ArgSpec::required("query", ArgKind::String, "Search text"),
            ArgSpec::optional("verbose", ArgKind::Boolean, "More output"),
        ];
        let schema = input_schema(specs);
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["verbose"]["type"], "boolean");
    }

    #[test]
    fn unknown_tool_is_a_tool_level_error() {
        let registry = ToolRegistry::builtin();
        let catalog = Catalog::embedded().unwrap();
        let result = registry
            .call("does_not_exist", &Map::new(), &catalog)
            .unwrap();
        assert!(result.is_error());
        assert!(result.text_content().contains("does_not_exist"));
    }

    #[test]
    fn internal_failures_escape_as_errors() {
        fn broken(_: &Map<String, Value>, _: &Catalog) -> Result<ToolResult, ToolError> {
            Err(ToolError::Internal("corrupt".into()))
        }
        let registry = ToolRegistry::new(vec![Tool {
            name: "broken",
            description: "always fails",
            arguments: &[],
            handler: broken,
            hint: None,
        }]);
        let catalog = Catalog::embedded().unwrap();
        assert!(registry.call("broken", &Map::new(), &catalog).is_err());
    }
}
