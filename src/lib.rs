// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! compose-forge library - assemble catalog service fragments into one
//! compose document and repair host-port collisions between them.
//!
//! The pipeline is pure text in, text out:
//!
//! 1. [`assembler::assemble`] re-indents every selected fragment under a
//!    single `services:` root, optionally interpolating settings.
//! 2. [`resolver::resolve`] moves every duplicate host port claimed by a
//!    later service to the next free port and reports what it changed.
//!
//! [`generate`] runs both steps.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod envfile;
pub mod error;
pub mod model;
pub mod resolver;
pub mod validate;

use types::{ConflictReport, ServiceFragment, Settings};

/// Core data types shared by the assembler, resolver and catalog
pub mod types {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::ops::Range;

    // =========================================================================
    // Service Fragments
    // =========================================================================

    /// A catalog entry: one service authored as a standalone compose snippet
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ServiceFragment {
        /// Unique catalog identifier (e.g. "sonarr")
        pub id: String,
        /// Display name
        pub name: String,
        /// One-line description
        #[serde(default)]
        pub description: String,
        /// Optional grouping used by `list --category`
        #[serde(default)]
        pub category: Option<String>,
        /// Raw compose text, including its own `services:` wrapper
        pub compose: String,
    }

    impl ServiceFragment {
        /// Build a fragment from its parts
        #[must_use]
        pub fn new(id: &str, name: &str, description: &str, compose: &str) -> Self {
            Self {
                id: id.into(),
                name: name.into(),
                description: description.into(),
                category: None,
                compose: compose.into(),
            }
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Placeholder names recognised by interpolation, in env-file order
    pub const SETTINGS_KEYS: [&str; 9] = [
        "CONFIG_PATH",
        "DATA_PATH",
        "TZ",
        "PUID",
        "PGID",
        "UMASK",
        "RESTART_POLICY",
        "NETWORK_MODE",
        "CONTAINER_PREFIX",
    ];

    /// Shared settings substituted into fragments and written to the env file
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Settings {
        /// Host directory holding per-service configuration
        pub config_path: String,
        /// Host directory holding media and downloads
        pub data_path: String,
        /// Timezone
        pub tz: String,
        /// User id the containers run as
        pub puid: String,
        /// Group id the containers run as
        pub pgid: String,
        /// File creation mask
        pub umask: String,
        /// Compose restart policy
        pub restart_policy: String,
        /// Compose network mode
        pub network_mode: String,
        /// Prefix prepended to container names
        pub container_prefix: String,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                config_path: "/opt/appdata".into(),
                data_path: "/srv/data".into(),
                tz: "Etc/UTC".into(),
                puid: "1000".into(),
                pgid: "1000".into(),
                umask: "002".into(),
                restart_policy: "unless-stopped".into(),
                network_mode: "bridge".into(),
                container_prefix: String::new(),
            }
        }
    }

    impl Settings {
        /// Value for a placeholder name, if it is one of [`SETTINGS_KEYS`]
        #[must_use]
        pub fn lookup(&self, key: &str) -> Option<&str> {
            let value = match key {
                "CONFIG_PATH" => &self.config_path,
                "DATA_PATH" => &self.data_path,
                "TZ" => &self.tz,
                "PUID" => &self.puid,
                "PGID" => &self.pgid,
                "UMASK" => &self.umask,
                "RESTART_POLICY" => &self.restart_policy,
                "NETWORK_MODE" => &self.network_mode,
                "CONTAINER_PREFIX" => &self.container_prefix,
                _ => return None,
            };
            Some(value.as_str())
        }

        /// All `(KEY, value)` pairs in [`SETTINGS_KEYS`] order
        #[must_use]
        pub fn entries(&self) -> Vec<(&'static str, &str)> {
            SETTINGS_KEYS
                .iter()
                .filter_map(|key| self.lookup(key).map(|value| (*key, value)))
                .collect()
        }
    }

    // =========================================================================
    // Port Bindings
    // =========================================================================

    /// A `host:container` mapping found inside one service's subtree
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PortBinding {
        /// Host side of the mapping
        pub host_port: u32,
        /// Container side, including any `/tcp` or `/udp` suffix
        pub container_port: String,
        /// Name of the service that owns the binding
        pub service: String,
        /// Zero-based line number in the document
        pub line: usize,
        /// Byte range of the host-port digits in the document
        pub span: Range<usize>,
    }

    // =========================================================================
    // Conflict Report
    // =========================================================================

    /// One service moved off a contested host port
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PortChange {
        /// Service whose binding was rewritten
        pub service: String,
        /// Host port it used to claim
        pub from: u32,
        /// Host port it was moved to
        pub to: u32,
        /// One-based document lines that were rewritten
        pub lines: Vec<usize>,
    }

    impl fmt::Display for PortChange {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}: {} → {}", self.service, self.from, self.to)
        }
    }

    /// A host port claimed by more than one service
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PortConflict {
        /// The contested host port
        pub port: u32,
        /// Every claimant in document order; the first one keeps the port
        pub services: Vec<String>,
        /// Reassignments made for the later claimants
        pub changes: Vec<PortChange>,
    }

    impl PortConflict {
        /// The service that kept the port
        #[must_use]
        pub fn kept_by(&self) -> Option<&str> {
            self.services.first().map(String::as_str)
        }

        /// Human-readable summary line
        #[must_use]
        pub fn description(&self) -> String {
            format!("Port {} claimed by {}", self.port, self.services.join(", "))
        }
    }

    /// Everything the resolver changed in one pass
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ConflictReport {
        /// Contested ports in order of first appearance
        pub conflicts: Vec<PortConflict>,
        /// Number of document lines rewritten
        pub lines_changed: usize,
    }

    impl ConflictReport {
        /// Every change across all conflicts, in the order they were made
        pub fn changes(&self) -> impl Iterator<Item = &PortChange> {
            self.conflicts.iter().flat_map(|c| c.changes.iter())
        }
    }
}

/// Result of assembling and resolving a fragment selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Final compose document
    pub document: String,
    /// Port changes, `None` when no service collided
    pub report: Option<ConflictReport>,
}

/// Assemble the fragments and repair any host-port collisions
#[must_use]
pub fn generate(fragments: &[ServiceFragment], settings: &Settings, interpolate: bool) -> Generation {
    let draft = assembler::assemble(fragments, settings, interpolate);
    let resolution = resolver::resolve(&draft);
    Generation {
        document: resolution.document,
        report: resolution.report,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::{generate, Generation};
    pub use anyhow::{Context, Result};
}
