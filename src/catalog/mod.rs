//! # Catalog Module
//!
//! Read-only store of the design-system content served by the MCP tools:
//! UI patterns, web components and style-guide tokens.
//!
//! The catalog is loaded once at startup, either from the JSON document
//! embedded in the binary or from a file named by `CATALOG_PATH`, and is
//! validated before the server accepts requests.

pub mod models;

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

pub use models::{
    Breakpoint, CatalogError, ColorToken, DesignSystemInfo, Pattern, SpacingToken, StyleGuide,
    TypographyToken, WebComponent,
};

const EMBEDDED_CATALOG: &str = include_str!("catalog.json");

/// In-memory catalog shared by all tool handlers
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub info: DesignSystemInfo,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub components: Vec<WebComponent>,
    #[serde(default)]
    pub style_guide: StyleGuide,
}

impl Catalog {
    /// Loads the catalog bundled with the server.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parses and validates a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog document from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for pattern in &self.patterns {
            if pattern.name.trim().is_empty() {
                return Err(CatalogError::Invalid("pattern with empty name".into()));
            }
            if !seen.insert(pattern.name.to_lowercase()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate pattern name '{}'",
                    pattern.name
                )));
            }
        }

        seen.clear();
        for component in &self.components {
            // Custom element names must contain a hyphen.
            if !component.tag_name.contains('-') {
                return Err(CatalogError::Invalid(format!(
                    "component tag '{}' is not a valid custom element name",
                    component.tag_name
                )));
            }
            if !seen.insert(component.tag_name.to_lowercase()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate component tag '{}'",
                    component.tag_name
                )));
            }
        }
        Ok(())
    }

    // --- Patterns ---

    /// Case-insensitive lookup by pattern name.
    pub fn pattern(&self, name: &str) -> Option<&Pattern> {
        let name = name.trim();
        self.patterns
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }

    /// Matches the query against name, category, description and tags.
    pub fn search_patterns(&self, query: &str) -> Vec<&Pattern> {
        let needle = query.trim().to_lowercase();
        self.patterns
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    // --- Web components ---

    /// Lookup by tag name; `<lm-button>` and `LM-BUTTON` both resolve.
    pub fn component(&self, tag_name: &str) -> Option<&WebComponent> {
        let tag = tag_name.trim().trim_start_matches('<').trim_end_matches('>');
        self.components
            .iter()
            .find(|c| c.tag_name.eq_ignore_ascii_case(tag))
    }

    pub fn component_tags(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.tag_name.as_str()).collect()
    }

    pub fn search_components(&self, query: &str) -> Vec<&WebComponent> {
        let needle = query.trim().to_lowercase();
        self.components
            .iter()
            .filter(|c| {
                c.tag_name.to_lowercase().contains(&needle)
                    || c.name.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
                    || c.attributes
                        .iter()
                        .any(|a| a.name.to_lowercase().contains(&needle))
            })
            .collect()
    }

    // --- Style guide ---

    /// Distinct color categories in catalog order.
    pub fn color_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for color in &self.style_guide.colors {
            if !categories.contains(&color.category.as_str()) {
                categories.push(color.category.as_str());
            }
        }
        categories
    }

    pub fn colors_in(&self, category: &str) -> Vec<&ColorToken> {
        let category = category.trim();
        self.style_guide
            .colors
            .iter()
            .filter(|c| c.category.eq_ignore_ascii_case(category))
            .collect()
    }
}
