//! # retcheck CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use retcheck_cli::registry::{run_registry, RegistryArgs};
use retcheck_cli::validate::{load_registry, run_validate, ValidateArgs};

/// Retention policy CI gate.
///
/// Checks that every data model declares a well-formed retention block and
/// references only recognized retention policies.
#[derive(Parser, Debug)]
#[command(name = "retcheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML file listing recognized policy refs and field rules.
    #[arg(long, global = true, value_name = "FILE")]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a retention configuration file.
    Validate(ValidateArgs),

    /// Print the effective policy registry.
    Registry(RegistryArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("retcheck v{} starting", env!("CARGO_PKG_VERSION"));

    let result = load_registry(cli.registry.as_deref()).and_then(|registry| match cli.command {
        Commands::Validate(args) => run_validate(&args, registry),
        Commands::Registry(args) => run_registry(&args, &registry),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
