//! # Check Subcommand
//!
//! Catalog consistency (references vs request files) followed by a full
//! audit: the catalog and every schema must compile, and every sample must
//! validate against its own schema.

use anyhow::{Context, Result};
use clap::Args;

use ncs_schema::{audit_catalog, check_consistency, CatalogConfig};

/// Arguments for the `ncs check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Only compare catalog references with request files.
    #[arg(long)]
    pub consistency_only: bool,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 if every check passed, 1 otherwise.
pub fn run_check(args: &CheckArgs, config: &CatalogConfig) -> Result<u8> {
    let store = config.store();
    let catalog = store
        .load(&config.catalog_file)
        .with_context(|| format!("failed to load catalog {}", config.catalog_file))?;

    let consistency = check_consistency(&catalog, &store)?;
    println!(
        "Catalog: {} reference(s), {} request file(s)",
        consistency.referenced, consistency.request_files
    );
    for name in &consistency.orphans {
        println!("  ORPHAN: {name} has no catalog entry");
    }
    for name in &consistency.dangling {
        println!("  DANGLING: {name} is referenced but missing");
    }
    for name in &consistency.duplicates {
        println!("  DUPLICATE: {name} is referenced more than once");
    }
    for index in &consistency.malformed_entries {
        println!("  MALFORMED: oneOf[{index}] is not a $ref to a schema file");
    }
    let mut failed = !consistency.is_consistent();

    if !args.consistency_only {
        let audit = audit_catalog(&store, &config.catalog_file)?;
        println!(
            "Schemas: {} compiled, samples: {} validated",
            audit.schemas_checked, audit.samples_checked
        );
        for finding in &audit.findings {
            println!("  FAIL: {finding}");
        }
        failed |= !audit.passed();
    }

    if failed {
        println!("\nCatalog check FAILED.");
        Ok(1)
    } else {
        println!("\nCatalog check passed.");
        Ok(0)
    }
}
