// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List command - shows the tools available in the catalog

use super::Context;
use crate::model::ComposeModel;
use crate::types::ServiceFragment;
use anyhow::Result;
use owo_colors::OwoColorize;

/// Run the list command
pub fn run(ctx: &Context, category: Option<&str>) -> Result<()> {
    let catalog = ctx.config.catalog()?;
    let tools: Vec<&ServiceFragment> = catalog
        .tools()
        .iter()
        .filter(|t| category.map_or(true, |c| t.category.as_deref() == Some(c)))
        .collect();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    if tools.is_empty() {
        println!("No tools found.");
        return Ok(());
    }

    println!("Tools ({}):", tools.len());
    for tool in tools {
        let ports = host_ports(tool);
        let id = if ctx.color {
            tool.id.bold().to_string()
        } else {
            tool.id.clone()
        };
        println!("  {} - {}", id, tool.name);
        if !tool.description.is_empty() {
            println!("    {}", tool.description);
        }
        if !ports.is_empty() {
            println!("    ports: {}", ports.join(", "));
        }
    }

    Ok(())
}

/// Host ports a tool publishes, read from its own snippet
fn host_ports(tool: &ServiceFragment) -> Vec<String> {
    ComposeModel::parse(&tool.compose)
        .bindings()
        .map(|b| format!("{}:{}", b.host_port, b.container_port))
        .collect()
}
