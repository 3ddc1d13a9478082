// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Resolve command - repairs host-port conflicts in an existing document

use super::{print_report, Context};
use crate::resolver::resolve;
use crate::types::ConflictReport;
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// JSON shape of `resolve --json`
#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    report: Option<&'a ConflictReport>,
    /// Resolved text, omitted when it was written back to the file
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a str>,
    written: bool,
}

/// Run the resolve command
pub fn run(ctx: &Context, file: &Path, write: bool) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let resolution = resolve(&content);

    let written = write && resolution.report.is_some();
    if written {
        fs::write(file, &resolution.document)
            .with_context(|| format!("Failed to write to {}", file.display()))?;
    }

    if ctx.json {
        let output = ResolveOutput {
            report: resolution.report.as_ref(),
            document: (!write).then_some(resolution.document.as_str()),
            written,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_report(ctx, resolution.report.as_ref());
    if !write {
        std::io::stdout().lock().write_all(resolution.document.as_bytes())?;
    } else if written {
        ctx.status(format_args!("Updated {}", file.display()));
    } else {
        ctx.status(format_args!("No port conflicts in {}", file.display()));
    }

    Ok(())
}
