//! Pattern tools: listing, lookup, search and markup examples.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use super::{ArgKind, ArgSpec, Tool, ToolError};
use crate::catalog::{Catalog, Pattern};
use crate::mcp::protocol::ToolResult;
use crate::utils;

const PATTERN_NAME: &[ArgSpec] = &[ArgSpec::required(
    "patternName",
    ArgKind::String,
    "Name of the pattern, e.g. 'Button' or 'Form Field' (case-insensitive).",
)];

const QUERY: &[ArgSpec] = &[ArgSpec::required(
    "query",
    ArgKind::String,
    "Text matched against pattern names, categories, descriptions and tags.",
)];

pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "list_patterns",
            description: "List every UI pattern in the design system, grouped by category.",
            arguments: &[],
            handler: list_patterns,
            hint: None,
        },
        Tool {
            name: "get_pattern",
            description: "Get the full documentation of a UI pattern: usage guidance, accessibility notes and examples.",
            arguments: PATTERN_NAME,
            handler: get_pattern,
            hint: Some(available_patterns),
        },
        Tool {
            name: "search_patterns",
            description: "Search UI patterns by keyword.",
            arguments: QUERY,
            handler: search_patterns,
            hint: None,
        },
        Tool {
            name: "get_pattern_examples",
            description: "Get the HTML markup examples of a UI pattern.",
            arguments: PATTERN_NAME,
            handler: get_pattern_examples,
            hint: Some(available_patterns),
        },
    ]
}

fn available_patterns(catalog: &Catalog) -> String {
    format!("Available patterns: {}", catalog.pattern_names().join(", "))
}

fn lookup<'a>(args: &Map<String, Value>, catalog: &'a Catalog) -> Result<&'a Pattern, ToolError> {
    let name = utils::get_required_str(args, "patternName")?;
    catalog.pattern(name).ok_or_else(|| {
        ToolError::NotFound(format!(
            "Pattern '{}' not found. {}",
            name,
            available_patterns(catalog)
        ))
    })
}

fn summary_line(pattern: &Pattern) -> String {
    format!("- **{}**: {}", pattern.name, pattern.description)
}

fn list_patterns(_args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    if catalog.patterns.is_empty() {
        return Ok(ToolResult::text("The catalog contains no patterns."));
    }

    let mut categories: Vec<&str> = Vec::new();
    for p in &catalog.patterns {
        if !categories.contains(&p.category.as_str()) {
            categories.push(p.category.as_str());
        }
    }

    let mut text = format!("# {} patterns ({})\n", catalog.info.name, catalog.patterns.len());
    for category in categories {
        let _ = write!(text, "\n## {}\n", category);
        for p in catalog.patterns.iter().filter(|p| p.category == category) {
            let _ = writeln!(text, "{}", summary_line(p));
        }
    }
    Ok(ToolResult::text(text))
}

fn get_pattern(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    let pattern = lookup(args, catalog)?;

    let mut text = format!(
        "# {}\n\n**Category:** {}\n\n{}\n",
        pattern.name, pattern.category, pattern.description
    );
    if let Some(usage) = &pattern.usage {
        let _ = write!(text, "\n## Usage\n{}\n", usage);
    }
    if !pattern.accessibility.is_empty() {
        text.push_str("\n## Accessibility\n");
        for note in &pattern.accessibility {
            let _ = writeln!(text, "- {}", note);
        }
    }
    if !pattern.tags.is_empty() {
        let _ = write!(text, "\n**Tags:** {}\n", pattern.tags.join(", "));
    }
    let _ = write!(
        text,
        "\n{} example(s) available via get_pattern_examples.",
        pattern.examples.len()
    );
    Ok(ToolResult::text(text))
}

fn search_patterns(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    let query = utils::get_required_str(args, "query")?;
    let hits = catalog.search_patterns(query);
    if hits.is_empty() {
        return Ok(ToolResult::text(format!(
            "No patterns found matching '{}'. {}",
            query,
            available_patterns(catalog)
        )));
    }

    let mut text = format!("Found {} pattern(s) matching '{}':\n\n", hits.len(), query);
    for p in hits {
        let _ = writeln!(text, "{}", summary_line(p));
    }
    Ok(ToolResult::text(text))
}

fn get_pattern_examples(
    args: &Map<String, Value>,
    catalog: &Catalog,
) -> Result<ToolResult, ToolError> {
    let pattern = lookup(args, catalog)?;
    if pattern.examples.is_empty() {
        return Ok(ToolResult::text(format!(
            "Pattern '{}' has no examples yet.",
            pattern.name
        )));
    }

    let mut text = format!("# {} examples\n", pattern.name);
    for example in &pattern.examples {
        let _ = write!(text, "\n## {}\n", example.title);
        if let Some(description) = &example.description {
            let _ = writeln!(text, "{}", description);
        }
        let _ = write!(text, "\n```html\n{}\n```\n", example.markup);
    }
    Ok(ToolResult::text(text))
}
