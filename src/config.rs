// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Values are layered: built-in defaults, then a TOML file, then
//! `COMPOSE_FORGE_*` environment variables (nested keys joined with
//! `__`, e.g. `COMPOSE_FORGE_SETTINGS__TZ`).

use crate::catalog::Catalog;
use crate::types::Settings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "COMPOSE_FORGE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog file or directory; the builtin catalog when unset
    pub catalog: Option<PathBuf>,
    /// File name of the generated compose document
    pub compose_file: String,
    /// File name of the generated env file
    pub env_file: String,
    /// Substitute settings into the document instead of leaving `${VAR}`
    pub interpolate: bool,
    /// Run the port conflict resolver after assembly
    pub resolve_ports: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Shared settings
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            compose_file: "docker-compose.yml".to_string(),
            env_file: ".env".to_string(),
            interpolate: false,
            resolve_ports: true,
            log_level: "info".to_string(),
            settings: Settings::default(),
        }
    }
}

impl Config {
    /// Load the catalog this configuration points at
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display())),
            None => Catalog::builtin().context("Failed to load builtin catalog"),
        }
    }

    /// Look up one value by dotted key (e.g. `settings.tz`)
    pub fn get(&self, key: &str) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self).context("Failed to serialize config")?;
        for part in key.split('.') {
            value = value
                .get_mut(part)
                .map(serde_json::Value::take)
                .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;
        }
        Ok(value)
    }
}

/// Default config file location
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "hyperpolymath", "compose-forge")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist; the default location is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = config::Config::try_from(&Config::default())
        .context("Failed to build default configuration")?;

    let mut builder = config::Config::builder().add_source(defaults);
    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_path() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    );

    builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "interpolate = true\ncompose_file = \"compose.yaml\"\n\n[settings]\ntz = \"Europe/Berlin\"\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert!(config.interpolate);
        assert_eq!(config.compose_file, "compose.yaml");
        assert_eq!(config.settings.tz, "Europe/Berlin");
        assert_eq!(config.settings.puid, "1000");
        assert!(config.resolve_ports);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_get_dotted_key() {
        let config = Config::default();
        assert_eq!(config.get("settings.restart_policy").unwrap(), "unless-stopped");
        assert_eq!(config.get("resolve_ports").unwrap(), true);
        assert!(config.get("settings.nope").is_err());
    }
}
