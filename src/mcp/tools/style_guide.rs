//! Style-guide tools: design tokens and design-system metadata.

use std::fmt::Write as _;

use serde_json::{json, Map, Value};

use super::{ArgKind, ArgSpec, Tool, ToolError};
use crate::catalog::Catalog;
use crate::mcp::protocol::ToolResult;
use crate::utils;

pub const SECTIONS: &[&str] = &["colors", "typography", "spacing", "breakpoints"];

const SECTION: &[ArgSpec] = &[ArgSpec::optional(
    "section",
    ArgKind::Enum(SECTIONS),
    "Style-guide section to return. Omit for the whole style guide.",
)];

const CATEGORY: &[ArgSpec] = &[ArgSpec::optional(
    "category",
    ArgKind::String,
    "Color category such as 'primary', 'neutral' or 'semantic'. Omit for all colors.",
)];

pub fn tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "get_style_guide",
            description: "Get the style guide: colors, typography, spacing and breakpoints, or a single section.",
            arguments: SECTION,
            handler: get_style_guide,
            hint: None,
        },
        Tool {
            name: "get_colors",
            description: "Get the color tokens, optionally filtered by category.",
            arguments: CATEGORY,
            handler: get_colors,
            hint: Some(available_categories),
        },
        Tool {
            name: "get_typography",
            description: "Get the typography scale.",
            arguments: &[],
            handler: get_typography,
            hint: None,
        },
        Tool {
            name: "get_spacing",
            description: "Get the spacing scale.",
            arguments: &[],
            handler: get_spacing,
            hint: None,
        },
        Tool {
            name: "get_breakpoints",
            description: "Get the responsive breakpoints.",
            arguments: &[],
            handler: get_breakpoints,
            hint: None,
        },
        Tool {
            name: "get_design_system_info",
            description: "Get the design system name, version, CDN links and catalog statistics.",
            arguments: &[],
            handler: get_design_system_info,
            hint: None,
        },
    ]
}

fn available_categories(catalog: &Catalog) -> String {
    format!(
        "Available color categories: {}",
        catalog.color_categories().join(", ")
    )
}

fn colors_section(catalog: &Catalog, category: Option<&str>) -> String {
    let colors = match category {
        Some(category) => catalog.colors_in(category),
        None => catalog.style_guide.colors.iter().collect(),
    };

    let mut text = String::from("## Colors\n\n| Token | Category | Value | Usage |\n|---|---|---|---|\n");
    for c in colors {
        let _ = writeln!(
            text,
            "| `{}` | {} | `{}` | {} |",
            c.name, c.category, c.value, c.usage
        );
    }
    text
}

fn typography_section(catalog: &Catalog) -> String {
    let mut text = String::from(
        "## Typography\n\n| Token | Font | Size | Weight | Line height | Usage |\n|---|---|---|---|---|---|\n",
    );
    for t in &catalog.style_guide.typography {
        let _ = writeln!(
            text,
            "| `{}` | {} | {} | {} | {} | {} |",
            t.name, t.font_family, t.font_size, t.font_weight, t.line_height, t.usage
        );
    }
    text
}

fn spacing_section(catalog: &Catalog) -> String {
    let mut text = String::from("## Spacing\n\n| Token | Value | Pixels |\n|---|---|---|\n");
    for s in &catalog.style_guide.spacing {
        let _ = writeln!(text, "| `{}` | {} | {}px |", s.name, s.value, s.pixels);
    }
    text
}

fn breakpoints_section(catalog: &Catalog) -> String {
    let mut text = String::from("## Breakpoints\n\n| Name | Min width | Description |\n|---|---|---|\n");
    for b in &catalog.style_guide.breakpoints {
        let _ = writeln!(text, "| `{}` | {}px | {} |", b.name, b.min_width, b.description);
    }
    text
}

fn get_style_guide(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    let section = utils::get_optional_str(args, "section").map(str::to_lowercase);

    let text = match section.as_deref() {
        Some("colors") => colors_section(catalog, None),
        Some("typography") => typography_section(catalog),
        Some("spacing") => spacing_section(catalog),
        Some("breakpoints") => breakpoints_section(catalog),
        Some(other) => {
            return Err(ToolError::InvalidArguments(format!(
                "Invalid value '{}' for argument 'section'. Valid values: {}",
                other,
                SECTIONS.join(", ")
            )))
        }
        None => format!(
            "# {} style guide\n\n{}\n{}\n{}\n{}",
            catalog.info.name,
            colors_section(catalog, None),
            typography_section(catalog),
            spacing_section(catalog),
            breakpoints_section(catalog)
        ),
    };
    Ok(ToolResult::text(text))
}

fn get_colors(args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    match utils::get_optional_str(args, "category") {
        Some(category) if catalog.colors_in(category).is_empty() => {
            Err(ToolError::InvalidArguments(format!(
                "Unknown color category '{}'",
                category
            )))
        }
        category => Ok(ToolResult::text(colors_section(catalog, category))),
    }
}

fn get_typography(_args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    Ok(ToolResult::text(typography_section(catalog)))
}

fn get_spacing(_args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    Ok(ToolResult::text(spacing_section(catalog)))
}

fn get_breakpoints(_args: &Map<String, Value>, catalog: &Catalog) -> Result<ToolResult, ToolError> {
    Ok(ToolResult::text(breakpoints_section(catalog)))
}

fn get_design_system_info(
    _args: &Map<String, Value>,
    catalog: &Catalog,
) -> Result<ToolResult, ToolError> {
    let info = &catalog.info;
    let stats = json!({
        "patterns": catalog.patterns.len(),
        "components": catalog.components.len(),
        "colors": catalog.style_guide.colors.len(),
        "typographyTokens": catalog.style_guide.typography.len(),
        "spacingTokens": catalog.style_guide.spacing.len(),
        "breakpoints": catalog.style_guide.breakpoints.len(),
    });

    let text = format!(
        "# {} v{}\n\n{}\n\n- Website: {}\n- Stylesheet: {}\n- Components script: {}\n\n## Catalog\n```json\n{}\n```",
        info.name,
        info.version,
        info.description,
        info.website,
        info.stylesheet_url,
        info.script_url,
        serde_json::to_string_pretty(&stats)?
    );
    Ok(ToolResult::text(text))
}
