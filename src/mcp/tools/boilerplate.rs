//! `generate_boilerplate`: a starter HTML page wired to the design system.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use super::{ArgKind, ArgSpec, Tool, ToolError};
use crate::catalog::Catalog;
use crate::mcp::protocol::ToolResult;
use crate::utils;

const DEFAULT_PROJECT_NAME: &str = "my-app";
const THEMES: &[&str] = &["light", "dark"];

const ARGUMENTS: &[ArgSpec] = &[
    ArgSpec::optional("projectName", ArgKind::String, "Project name used for the page title."),
    ArgSpec::optional("theme", ArgKind::Enum(THEMES), "Initial color theme (default: light)."),
    ArgSpec::optional(
        "includeExamples",
        ArgKind::Boolean,
        "Include an example of every web component in the page body (default: false).",
    ),
];

pub fn tools() -> Vec<Tool> {
    vec![Tool {
        name: "generate_boilerplate",
        description: "Generate a starter HTML page that loads the design system stylesheet and web components.",
        arguments: ARGUMENTS,
        handler: generate_boilerplate,
        hint: None,
    }]
}

// Keeps the project name safe to embed in HTML text and attributes.
fn sanitize_project_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn generate_boilerplate(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    let project = sanitize_project_name(
        utils::get_optional_str(args, "projectName").unwrap_or(DEFAULT_PROJECT_NAME),
    );
    let theme = utils::get_optional_str(args, "theme")
        .map(str::to_lowercase)
        .unwrap_or_else(|| "light".to_string());
    let include_examples = utils::get_optional_bool(args, "includeExamples").unwrap_or(false);

    let mut body = String::new();
    let _ = writeln!(body, "    <main class=\"lm-container\">");
    let _ = writeln!(body, "      <h1>{}</h1>", project);
    if include_examples {
        for component in &catalog.components {
            let _ = writeln!(body, "\n      <!-- {} -->", component.tag_name);
            for line in component.example.lines() {
                let _ = writeln!(body, "      {}", line);
            }
        }
    } else {
        let _ = writeln!(body, "      <lm-button variant=\"primary\">Get started</lm-button>");
    }
    let _ = writeln!(body, "    </main>");

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"{theme}\">\n  <head>\n    <meta charset=\"utf-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n    <title>{project}</title>\n    <link rel=\"stylesheet\" href=\"{css}\">\n    <script type=\"module\" src=\"{js}\"></script>\n  </head>\n  <body>\n{body}  </body>\n</html>",
        theme = theme,
        project = project,
        css = catalog.info.stylesheet_url,
        js = catalog.info.script_url,
        body = body,
    );

    let text = format!(
        "# {} boilerplate ({} {}, {} theme)\n\nSave as `index.html`:\n\n```html\n{}\n```\n\nSwitch themes at runtime by setting `data-theme` on `<html>` to one of: {}.",
        project,
        catalog.info.name,
        catalog.info.version,
        theme,
        html,
        THEMES.join(", ")
    );
    Ok(ToolResult::text(text))
}
