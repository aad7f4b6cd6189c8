//! Web-component tools.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use super::{ArgKind, ArgSpec, Tool, ToolError};
use crate::catalog::{Catalog, WebComponent};
use crate::mcp::protocol::ToolResult;
use crate::utils;

const TAG_NAME: &[ArgSpec] = &[ArgSpec::required(
    "tagName",
    ArgKind::String,
    "Custom element tag, e.g. 'lm-button'.",
)];

const QUERY: &[ArgSpec] = &[ArgSpec::required(
    "query",
    ArgKind::String,
    "Text matched against tag names, names, descriptions and attribute names.",
)];

pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "list_components",
            description: "List the web components of the component library.",
            arguments: &[],
            handler: list_components,
            hint: None,
        },
        Tool {
            name: "get_component",
            description: "Get the API of a web component: attributes, events, slots and an example.",
            arguments: TAG_NAME,
            handler: get_component,
            hint: Some(available_components),
        },
        Tool {
            name: "search_components",
            description: "Search web components by keyword.",
            arguments: QUERY,
            handler: search_components,
            hint: None,
        },
    ]
}

fn available_components(catalog: &Catalog) -> String {
    format!("Available components: {}", catalog.component_tags().join(", "))
}

fn summary_line(component: &WebComponent) -> String {
    format!(
        "- `<{}>` **{}**: {}",
        component.tag_name, component.name, component.description
    )
}

fn list_components(_args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    if catalog.components.is_empty() {
        return Ok(ToolResult::text("The catalog contains no web components."));
    }
    let mut text = format!("# Web components ({})\n\n", catalog.components.len());
    for c in &catalog.components {
        let _ = writeln!(text, "{}", summary_line(c));
    }
    Ok(ToolResult::text(text))
}

fn get_component(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    let tag = utils::get_required_str(args, "tagName")?;
    let component = catalog.component(tag).ok_or_else(|| {
        ToolError::NotFound(format!(
            "Component '{}' not found. {}",
            tag,
            available_components(catalog)
        ))
    })?;

    let mut text = format!(
        "# `<{}>` {}\n\n{}\n",
        component.tag_name, component.name, component.description
    );

    if !component.attributes.is_empty() {
        text.push_str("\n## Attributes\n\n| Name | Type | Default | Description |\n|---|---|---|---|\n");
        for a in &component.attributes {
            let _ = writeln!(
                text,
                "| `{}` | `{}` | {} | {} |",
                a.name,
                a.type_name,
                a.default.as_deref().unwrap_or("-"),
                a.description
            );
        }
    }
    if !component.events.is_empty() {
        text.push_str("\n## Events\n");
        for e in &component.events {
            let _ = writeln!(text, "- `{}`: {}", e.name, e.description);
        }
    }
    if !component.slots.is_empty() {
        text.push_str("\n## Slots\n");
        for s in &component.slots {
            let _ = writeln!(text, "- `{}`: {}", s.name, s.description);
        }
    }
    let _ = write!(text, "\n## Example\n\n```html\n{}\n```", component.example);
    Ok(ToolResult::text(text))
}

fn search_components(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    let query = utils::get_required_str(args, "query")?;
    let hits = catalog.search_components(query);
    if hits.is_empty() {
        return Ok(ToolResult::text(format!(
            "No components found matching '{}'. {}",
            query,
            available_components(catalog)
        )));
    }
    let mut text = format!("Found {} component(s) matching '{}':\n\n", hits.len(), query);
    for c in hits {
        let _ = writeln!(text, "{}", summary_line(c));
    }
    Ok(ToolResult::text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn component_docs_include_attributes_and_events() {
        let catalog = Catalog::embedded().unwrap();
        let text = get_component(&args(json!({"tagName": "lm-modal"})), &catalog)
            .unwrap()
            .text_content();
        assert!(text.contains("## Attributes"));
        assert!(text.contains("`lm-close`"));
        assert!(text.contains("```html"));
    }

    #[test]
    fn search_matches_attribute_names() {
        let catalog = Catalog::embedded().unwrap();
        let text = search_components(&args(json!({"query": "dismissible"})), &catalog)
            .unwrap()
            .text_content();
        assert!(text.contains("lm-alert"));
    }

    #[test]
    fn missing_component_is_not_found() {
        let catalog = Catalog::embedded().unwrap();
        let err = get_component(&args(json!({"tagName": "lm-carousel"})), &catalog).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref m) if m.contains("lm-button")));
    }
}
