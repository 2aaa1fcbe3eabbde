//! Tool catalog loading from a JSON document
//!
//! The catalog lists every tool card and the categories used to group them.
//! A copy ships inside the binary; a path can override it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DevhubError, Result};

/// Catalog bundled with the binary.
pub const BUILTIN_CATALOG: &str = include_str!("../../assets/tools-config.json");

/// One tool card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub icon: String,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            enabled: true,
            icon: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Grouping metadata for tool cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub order: i64,
}

/// Category as written in the document, keyed by id.
#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    name: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    order: i64,
}

/// Document structure
#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
    #[serde(default)]
    categories: Map<String, Value>,
}

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    Path(PathBuf),
    Inline(String),
}

impl CatalogSource {
    /// Use `path` when given, else the built-in document.
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::Path(p.to_path_buf()),
            None => Self::Builtin,
        }
    }
}

/// Loaded tool list and categories.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    categories: Vec<Category>,
}

impl ToolCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from the given source.
    pub fn load(source: &CatalogSource) -> Result<Self> {
        match source {
            CatalogSource::Builtin => Self::from_json(BUILTIN_CATALOG),
            CatalogSource::Path(path) => Self::from_file(path),
            CatalogSource::Inline(content) => Self::from_json(content),
        }
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DevhubError::Catalog(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Load a catalog from a JSON string
    ///
    /// Later tools reusing an id already seen are dropped.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(content)
            .map_err(|e| DevhubError::Catalog(format!("Failed to parse catalog: {}", e)))?;

        let mut seen = HashSet::new();
        let mut tools = Vec::with_capacity(raw.tools.len());
        for tool in raw.tools {
            if !seen.insert(tool.id.clone()) {
                warn!("Duplicate tool id '{}' in catalog, ignoring", tool.id);
                continue;
            }
            tools.push(tool);
        }

        // Map keeps document order, so equal `order` values stay in file order
        let mut categories = Vec::with_capacity(raw.categories.len());
        for (id, value) in raw.categories {
            let c: RawCategory = serde_json::from_value(value)
                .map_err(|e| DevhubError::Catalog(format!("Invalid category '{}': {}", id, e)))?;
            categories.push(Category {
                id,
                name: c.name,
                icon: c.icon,
                order: c.order,
            });
        }
        categories.sort_by_key(|c| c.order);

        debug!("Loaded catalog: {} tools, {} categories", tools.len(), categories.len());
        Ok(Self { tools, categories })
    }

    /// All tools in document order
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn enabled_tools(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().filter(|t| t.enabled).collect()
    }

    /// Categories sorted by `order`
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Get a tool by id
    pub fn get(&self, id: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
