//! # Version Subcommand
//!
//! Sets `version` or `apiVersion` to an exact `X.Y.Z` in every `*.json`
//! file of the schema directory.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use ncs_core::{SchemaVersion, VersionField};
use ncs_schema::{set_version, CatalogConfig};

/// Which field to update.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyArg {
    #[value(name = "version")]
    Version,
    #[value(name = "apiVersion")]
    ApiVersion,
}

impl From<PropertyArg> for VersionField {
    fn from(arg: PropertyArg) -> Self {
        match arg {
            PropertyArg::Version => VersionField::Version,
            PropertyArg::ApiVersion => VersionField::ApiVersion,
        }
    }
}

/// Arguments for the `ncs version` subcommand.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// The property to update.
    #[arg(long, value_enum)]
    pub property: PropertyArg,

    /// The exact version to set, e.g. `1.2.3`.
    #[arg(long)]
    pub target_version: String,
}

/// Execute the version subcommand.
pub fn run_version(args: &VersionArgs, config: &CatalogConfig) -> Result<u8> {
    let target = SchemaVersion::parse(&args.target_version)
        .with_context(|| format!("'{}' is not a valid X.Y.Z version", args.target_version))?;
    let field = VersionField::from(args.property);

    let report = set_version(&config.store(), field, target)?;
    for (file, reason) in &report.invalid {
        println!("Skipping invalid JSON: {file} ({reason})");
    }
    for file in &report.unchanged {
        println!("Skipping {file}: '{field}' is already '{target}'");
    }
    for change in &report.updated {
        println!(
            "Updated {field} in {} from '{}' to '{target}'",
            change.file, change.from
        );
    }
    println!("\nFinished. Updated {} file(s).", report.updated.len());
    Ok(0)
}
