//! # Registry Subcommand
//!
//! Prints the effective policy registry in the same YAML format that
//! `--registry` accepts, so a CI job can show what it validates against.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use retcheck_core::PolicyRegistry;

/// Arguments for the `retcheck registry` subcommand.
#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Print only the recognized policy refs, one per line.
    #[arg(long)]
    pub refs_only: bool,
}

/// Execute the registry subcommand, printing to stdout.
pub fn run_registry(args: &RegistryArgs, registry: &PolicyRegistry) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_registry_to(args, registry, &mut out)
}

/// Execute the registry subcommand, printing to `out`.
pub fn run_registry_to(
    args: &RegistryArgs,
    registry: &PolicyRegistry,
    out: &mut dyn Write,
) -> Result<u8> {
    if args.refs_only {
        for policy_ref in registry.policy_refs() {
            writeln!(out, "{policy_ref}")?;
        }
    } else {
        let yaml = registry
            .to_yaml_string()
            .context("failed to render registry")?;
        write!(out, "{yaml}")?;
    }
    Ok(0)
}
