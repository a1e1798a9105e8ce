//! # Docs Subcommand
//!
//! Renders the Markdown API reference from the local catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use ncs_schema::{render_markdown, resolve_schema, CatalogConfig};

/// Default output file, written next to the schema directory.
pub const DEFAULT_OUTPUT: &str = "NOTECARD_API.md";

/// Arguments for the `ncs docs` subcommand.
#[derive(Args, Debug, Default)]
pub struct DocsArgs {
    /// Output path, or `-` for stdout. Defaults to `NOTECARD_API.md` beside
    /// the schema directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

fn default_output(schema_dir: &Path) -> PathBuf {
    schema_dir
        .parent()
        .map(|p| p.join(DEFAULT_OUTPUT))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

/// Execute the docs subcommand.
pub fn run_docs(args: &DocsArgs, config: &CatalogConfig) -> Result<u8> {
    let store = config.store();
    let resolved = resolve_schema(&store, &config.catalog_file)
        .with_context(|| format!("failed to resolve catalog {}", config.catalog_file))?;
    let markdown = render_markdown(&resolved.document, &resolved.registry);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&config.schema_dir));
    if output == Path::new("-") {
        print!("{markdown}");
        return Ok(0);
    }

    std::fs::write(&output, &markdown)
        .with_context(|| format!("failed to write {}", output.display()))?;
    let skipped = resolved.registry.skipped().len();
    let documented = resolved.document.references().len().saturating_sub(skipped);
    println!(
        "Wrote {} ({documented} request(s), {skipped} unavailable)",
        output.display()
    );
    Ok(0)
}
