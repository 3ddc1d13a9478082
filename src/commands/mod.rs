// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod env;
pub mod generate;
pub mod list;
pub mod resolve;
pub mod validate;

use crate::config::Config;
use crate::types::{ConflictReport, Settings};
use owo_colors::OwoColorize;
use std::fmt;

/// State shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Emit machine-readable JSON instead of text
    pub json: bool,
    /// Colorize human-readable output
    pub color: bool,
    /// Print only the primary output and errors
    pub quiet: bool,
}

impl Context {
    /// Print a status line to stdout unless quiet or emitting JSON
    pub fn status(&self, message: impl fmt::Display) {
        if !self.quiet && !self.json {
            println!("{message}");
        }
    }
}

/// Per-invocation overrides for individual settings fields
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SettingsArgs {
    /// Host directory for per-service configuration (CONFIG_PATH)
    #[arg(long)]
    pub config_path: Option<String>,
    /// Host directory for media and downloads (DATA_PATH)
    #[arg(long)]
    pub data_path: Option<String>,
    /// Timezone (TZ)
    #[arg(long)]
    pub tz: Option<String>,
    /// User id (PUID)
    #[arg(long)]
    pub puid: Option<String>,
    /// Group id (PGID)
    #[arg(long)]
    pub pgid: Option<String>,
    /// File creation mask (UMASK)
    #[arg(long)]
    pub umask: Option<String>,
    /// Restart policy (RESTART_POLICY)
    #[arg(long)]
    pub restart_policy: Option<String>,
    /// Network mode (NETWORK_MODE)
    #[arg(long)]
    pub network_mode: Option<String>,
    /// Container name prefix (CONTAINER_PREFIX)
    #[arg(long)]
    pub container_prefix: Option<String>,
}

impl SettingsArgs {
    /// Settings with every given flag applied on top of `base`
    #[must_use]
    pub fn apply(&self, base: &Settings) -> Settings {
        let pick = |flag: &Option<String>, current: &String| flag.clone().unwrap_or_else(|| current.clone());
        Settings {
            config_path: pick(&self.config_path, &base.config_path),
            data_path: pick(&self.data_path, &base.data_path),
            tz: pick(&self.tz, &base.tz),
            puid: pick(&self.puid, &base.puid),
            pgid: pick(&self.pgid, &base.pgid),
            umask: pick(&self.umask, &base.umask),
            restart_policy: pick(&self.restart_policy, &base.restart_policy),
            network_mode: pick(&self.network_mode, &base.network_mode),
            container_prefix: pick(&self.container_prefix, &base.container_prefix),
        }
    }
}

/// Print a conflict report to stderr unless quiet
pub fn print_report(ctx: &Context, report: Option<&ConflictReport>) {
    let Some(report) = report.filter(|_| !ctx.quiet) else {
        return;
    };
    let color = ctx.color;

    let heading = format!(
        "Resolved {} port conflict(s), {} line(s) changed:",
        report.conflicts.len(),
        report.lines_changed
    );
    if color {
        eprintln!("{}", heading.yellow().bold());
    } else {
        eprintln!("{heading}");
    }

    for conflict in &report.conflicts {
        eprintln!("  {}", conflict.description());
        for change in &conflict.changes {
            if color {
                eprintln!("    {}", change.to_string().green());
            } else {
                eprintln!("    {change}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_args_override_only_given_fields() {
        let args = SettingsArgs {
            tz: Some("Asia/Tokyo".into()),
            container_prefix: Some("media-".into()),
            ..SettingsArgs::default()
        };
        let settings = args.apply(&Settings::default());
        assert_eq!(settings.tz, "Asia/Tokyo");
        assert_eq!(settings.container_prefix, "media-");
        assert_eq!(settings.puid, Settings::default().puid);
    }
}
