// src/catalog/models.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// --- Error types for catalog loading ---

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

// --- Catalog Models ---

/// Identity of the design system the catalog describes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSystemInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub website: String,
    /// CDN stylesheet carrying the tokens and pattern classes
    pub stylesheet_url: String,
    /// CDN module registering the web components
    pub script_url: String,
}

/// A documented UI pattern with copy-pasteable markup examples
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub accessibility: Vec<String>,
    #[serde(default)]
    pub examples: Vec<PatternExample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternExample {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub markup: String,
}

/// A custom element shipped by the component library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebComponent {
    /// Custom element tag, e.g. `lm-button`
    pub tag_name: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<ComponentAttribute>,
    #[serde(default)]
    pub events: Vec<ComponentEvent>,
    #[serde(default)]
    pub slots: Vec<ComponentSlot>,
    pub example: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub default: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentEvent {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSlot {
    pub name: String,
    pub description: String,
}

/// Design tokens grouped by style-guide section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleGuide {
    #[serde(default)]
    pub colors: Vec<ColorToken>,
    #[serde(default)]
    pub typography: Vec<TypographyToken>,
    #[serde(default)]
    pub spacing: Vec<SpacingToken>,
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorToken {
    pub name: String,
    pub category: String,
    pub value: String,
    pub usage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyToken {
    pub name: String,
    pub font_family: String,
    pub font_size: String,
    pub font_weight: u16,
    pub line_height: String,
    pub usage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingToken {
    pub name: String,
    pub value: String,
    pub pixels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub name: String,
    pub min_width: u32,
    pub description: String,
}
