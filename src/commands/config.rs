// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - prints the effective configuration

use super::Context;
use anyhow::Result;

/// Print the whole configuration, or a single dotted key
pub fn run(ctx: &Context, key: Option<&str>) -> Result<()> {
    match key {
        Some(key) => match ctx.config.get(key)? {
            serde_json::Value::String(s) => println!("{s}"),
            value => println!("{value}"),
        },
        None if ctx.json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
        None => print!("{}", toml::to_string_pretty(&ctx.config)?),
    }
    Ok(())
}
