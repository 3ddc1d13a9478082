// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Validate command - sanity-checks every catalog entry

use super::Context;
use crate::validate::validate_catalog;
use anyhow::{bail, Result};
use owo_colors::OwoColorize;

/// Run the validate command
pub fn run(ctx: &Context) -> Result<()> {
    let catalog = ctx.config.catalog()?;
    let reports = validate_catalog(catalog.tools());
    let failed = reports.iter().filter(|r| !r.passed()).count();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in reports.iter().filter(|r| !(ctx.quiet && r.passed())) {
            let status = match (report.passed(), ctx.color) {
                (true, true) => "ok".green().to_string(),
                (true, false) => "ok".to_string(),
                (false, true) => "FAIL".red().bold().to_string(),
                (false, false) => "FAIL".to_string(),
            };
            println!("{status:>4} {}", report.tool_id);
            for error in &report.errors {
                println!("       error: {error}");
            }
            for warning in &report.warnings {
                println!("       warning: {warning}");
            }
        }
        ctx.status("");
        ctx.status(format_args!("{} checked, {} failed", reports.len(), failed));
    }

    if failed > 0 {
        bail!("{} catalog entr{} failed validation", failed, if failed == 1 { "y" } else { "ies" });
    }
    Ok(())
}
