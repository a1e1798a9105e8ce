//! # New Subcommand
//!
//! Scaffolds the request and response schemas for a new API and adds the
//! request to the catalog.

use anyhow::Result;
use clap::Args;

use ncs_schema::{scaffold_api, CatalogConfig};

/// Arguments for the `ncs new` subcommand.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// API name, e.g. `card.random`. Must contain at least one dot.
    #[arg(value_name = "API_NAME")]
    pub api_name: String,
}

/// Execute the new subcommand.
pub fn run_new(args: &NewArgs, config: &CatalogConfig) -> Result<u8> {
    let report = scaffold_api(config, &args.api_name)?;
    let dir = config.schema_dir.display();
    println!("Created {dir}/{}", report.request_file);
    println!("Created {dir}/{}", report.response_file);
    println!(
        "Updated {dir}/{} (oneOf[{}])",
        config.catalog_file, report.catalog_index
    );
    println!("\nNext steps:");
    println!("1. Edit {} to add request properties", report.request_file);
    println!("2. Edit {} to add response properties", report.response_file);
    println!("3. Run `ncs check` to validate the schemas and their samples");
    Ok(0)
}
