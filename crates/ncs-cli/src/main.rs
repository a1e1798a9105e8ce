//! # ncs CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ncs_cli::check::{run_check, CheckArgs};
use ncs_cli::docs::{run_docs, DocsArgs};
use ncs_cli::new::{run_new, NewArgs};
use ncs_cli::validate::{run_validate, ValidateArgs};
use ncs_cli::version::{run_version, VersionArgs};

/// Notecard schema catalog tooling.
///
/// Validates instances against the catalog with fully local `$ref`
/// resolution, checks catalog consistency, scaffolds new API schemas,
/// bumps version fields, and renders Markdown documentation.
#[derive(Parser, Debug)]
#[command(name = "ncs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Schema directory. Overrides NCS_SCHEMA_DIR and repository discovery.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a JSON or YAML instance against a schema.
    Validate(ValidateArgs),

    /// Check catalog consistency, compile every schema, validate samples.
    Check(CheckArgs),

    /// Scaffold request and response schemas for a new API.
    New(NewArgs),

    /// Set `version` or `apiVersion` across all schema files.
    Version(VersionArgs),

    /// Render the Markdown API reference.
    Docs(DocsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level; RUST_LOG applies when no -v is given.
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!("ncs CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match ncs_cli::load_config(cli.schema_dir.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Check(args) => run_check(&args, &config),
        Commands::New(args) => run_new(&args, &config),
        Commands::Version(args) => run_version(&args, &config),
        Commands::Docs(args) => run_docs(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
