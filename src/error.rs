// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Library error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a catalog or selecting tools from it
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A catalog file could not be read
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A catalog file is not valid TOML for the catalog schema
    #[error("failed to parse catalog {origin}: {source}")]
    Parse {
        /// File path or "builtin"
        origin: String,
        /// Underlying error
        source: toml::de::Error,
    },

    /// Walking a catalog directory failed
    #[error("failed to walk catalog directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A selection named an id the catalog does not contain
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// A selection pattern is not a valid glob
    #[error("invalid selection pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Underlying error
        source: globset::Error,
    },

    /// A glob selection matched nothing
    #[error("pattern '{0}' matched no tools")]
    NoMatch(String),
}

/// Result alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
