// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Env command - prints the companion .env file for a selection

use super::{Context, SettingsArgs};
use crate::envfile::render_env;
use anyhow::Result;

/// Run the env command
pub fn run(ctx: &Context, tools: &[String], overrides: &SettingsArgs) -> Result<()> {
    let catalog = ctx.config.catalog()?;
    let fragments = catalog.select(tools)?;
    let settings = overrides.apply(&ctx.config.settings);

    let env = render_env(&settings, &fragments);
    if ctx.json {
        let pairs: serde_json::Map<String, serde_json::Value> = env
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&pairs)?);
    } else {
        print!("{env}");
    }

    Ok(())
}
