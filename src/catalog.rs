// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tool catalog loading and selection

use crate::error::{CatalogError, Result};
use crate::types::ServiceFragment;
use globset::Glob;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Catalog compiled into the binary
const BUILTIN: &str = include_str!("../catalog/builtin.toml");

/// A catalog file holds either a `[[tools]]` array or one bare tool table
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Many { tools: Vec<ServiceFragment> },
    One(ServiceFragment),
}

/// Ordered collection of selectable tools
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<ServiceFragment>,
}

impl Catalog {
    /// Wrap an existing list of tools
    #[must_use]
    pub fn new(tools: Vec<ServiceFragment>) -> Self {
        Self { tools }
    }

    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN, "builtin")
    }

    /// Parse catalog TOML; `origin` is only used in error messages
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        let document: CatalogDocument = toml::from_str(content).map_err(|source| CatalogError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        let tools = match document {
            CatalogDocument::Many { tools } => tools,
            CatalogDocument::One(tool) => vec![tool],
        };
        Ok(Self { tools })
    }

    /// Load a catalog file, or every `*.toml` below a directory in
    /// file-name order
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Self::load_file(path);
        }

        let mut tools = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
            if entry.file_type().is_file() && is_toml {
                tools.extend(Self::load_file(entry.path())?.tools);
            }
        }

        debug!("Loaded {} tools from {}", tools.len(), path.display());
        Ok(Self { tools })
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// All tools in catalog order
    #[must_use]
    pub fn tools(&self) -> &[ServiceFragment] {
        &self.tools
    }

    /// Get a tool by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ServiceFragment> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Check if the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve ids and globs into an ordered, de-duplicated selection.
    ///
    /// Plain ids keep the order given; a glob contributes its matches in
    /// catalog order.
    pub fn select<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<ServiceFragment>> {
        let mut selected: Vec<ServiceFragment> = Vec::new();
        let mut push = |tool: &ServiceFragment| {
            if !selected.iter().any(|t| t.id == tool.id) {
                selected.push(tool.clone());
            }
        };

        for pattern in patterns {
            let pattern = pattern.as_ref();
            if !is_glob(pattern) {
                let tool = self
                    .get(pattern)
                    .ok_or_else(|| CatalogError::UnknownTool(pattern.to_string()))?;
                push(tool);
                continue;
            }

            let matcher = Glob::new(pattern)
                .map_err(|source| CatalogError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })?
                .compile_matcher();
            let mut matched = false;
            for tool in self.tools.iter().filter(|t| matcher.is_match(&t.id)) {
                matched = true;
                push(tool);
            }
            if !matched {
                return Err(CatalogError::NoMatch(pattern.to_string()));
            }
        }

        Ok(selected)
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}
