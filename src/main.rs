// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! compose-forge CLI - assemble catalog tools into one compose document

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use compose_forge::commands::{self, generate::GenerateArgs, Context, SettingsArgs};
use compose_forge::config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compose-forge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "COMPOSE_FORGE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Catalog file or directory (defaults to the builtin catalog)
    #[arg(long, env = "COMPOSE_FORGE_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble tools into a compose document and resolve port conflicts
    Generate {
        /// Tool ids or globs, in output order
        tools: Vec<String>,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Substitute settings instead of leaving ${VAR} placeholders
        #[arg(long)]
        interpolate: bool,

        /// Keep duplicate host ports as authored
        #[arg(long)]
        no_resolve: bool,

        /// Write the compose and env files into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Resolve host-port conflicts in an existing compose file
    Resolve {
        /// Compose file to check
        file: PathBuf,

        /// Rewrite the file in place
        #[arg(short, long)]
        write: bool,
    },

    /// Print the .env file for a selection of tools
    Env {
        /// Tool ids or globs
        tools: Vec<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// List catalog tools
    List {
        /// Only show tools in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Validate every catalog entry
    Validate,

    /// Show the effective configuration
    Config {
        /// Dotted key to print (e.g. settings.tz)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("compose_forge={log_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = Context {
        config,
        json: cli.json,
        color: !cli.no_color,
        quiet: cli.quiet,
    };

    // Execute command
    match cli.command {
        Commands::Generate { tools, settings, interpolate, no_resolve, output_dir } => {
            commands::generate::run(
                &ctx,
                GenerateArgs { tools, settings, interpolate, no_resolve, output_dir },
            )
        }
        Commands::Resolve { file, write } => {
            commands::resolve::run(&ctx, &file, write)
        }
        Commands::Env { tools, settings } => {
            commands::env::run(&ctx, &tools, &settings)
        }
        Commands::List { category } => {
            commands::list::run(&ctx, category.as_deref())
        }
        Commands::Validate => {
            commands::validate::run(&ctx)
        }
        Commands::Config { key } => {
            commands::config::run(&ctx, key.as_deref())
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
