// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Generate command - assembles the selected tools into a compose document

use super::{print_report, Context, SettingsArgs};
use crate::envfile::render_env;
use crate::types::ConflictReport;
use crate::{assembler, resolver};
use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the generate command
#[derive(Debug, Default)]
pub struct GenerateArgs {
    /// Tool ids or globs, in the order they should appear
    pub tools: Vec<String>,
    /// Settings overrides
    pub settings: SettingsArgs,
    /// Force interpolation on
    pub interpolate: bool,
    /// Skip the port conflict resolver
    pub no_resolve: bool,
    /// Write files here instead of printing to stdout
    pub output_dir: Option<PathBuf>,
}

/// JSON shape of `generate --json`
#[derive(Debug, Serialize)]
struct GenerateOutput<'a> {
    document: &'a str,
    env: &'a str,
    report: Option<&'a ConflictReport>,
    fingerprint: String,
    generated_at: DateTime<Utc>,
}

/// Run the generate command
pub fn run(ctx: &Context, args: GenerateArgs) -> Result<()> {
    let catalog = ctx.config.catalog()?;
    let fragments = catalog.select(&args.tools)?;
    let settings = args.settings.apply(&ctx.config.settings);
    let interpolate = args.interpolate || ctx.config.interpolate;

    info!("Assembling {} tool(s)", fragments.len());
    let draft = assembler::assemble(&fragments, &settings, interpolate);
    let (document, report) = if args.no_resolve || !ctx.config.resolve_ports {
        (draft, None)
    } else {
        let resolution = resolver::resolve(&draft);
        (resolution.document, resolution.report)
    };
    let env = render_env(&settings, &fragments);

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        let compose_path = dir.join(&ctx.config.compose_file);
        let env_path = dir.join(&ctx.config.env_file);
        fs::write(&compose_path, &document)
            .with_context(|| format!("Failed to write to {}", compose_path.display()))?;
        fs::write(&env_path, &env)
            .with_context(|| format!("Failed to write to {}", env_path.display()))?;
        ctx.status(format_args!("Wrote {}", compose_path.display()));
        ctx.status(format_args!("Wrote {}", env_path.display()));
    }

    if ctx.json {
        let output = GenerateOutput {
            document: &document,
            env: &env,
            report: report.as_ref(),
            fingerprint: fingerprint(&document),
            generated_at: Utc::now(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_report(ctx, report.as_ref());
    if args.output_dir.is_none() {
        std::io::stdout().lock().write_all(document.as_bytes())?;
    }

    Ok(())
}

/// SHA-256 of the document, hex encoded
#[must_use]
pub fn fingerprint(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("services:\n"), fingerprint("services:\n"));
        assert_ne!(fingerprint("services:\n"), fingerprint("services: {}\n"));
        assert_eq!(fingerprint("").len(), 64);
    }
}
