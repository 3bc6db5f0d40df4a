//! # Validate Subcommand
//!
//! Loads a retention configuration file, runs the validator and prints
//! each diagnostic as it is produced, followed by a one-line verdict.
//!
//! ## Exit Codes
//!
//! - 0: the document is valid, or invalid without `--fail-on-invalid`.
//! - 1: the document could not be loaded, a policy entry was rejected by
//!   the strict schema, or the document is invalid with `--fail-on-invalid`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use retcheck_core::{Diagnostic, DiagnosticSink, PolicyRegistry, RetentionError};
use retcheck_schema::{
    load_document, PolicyEnforcement, RetentionValidator, ValidatorConfig, DEFAULT_DOCUMENT_PATH,
};

/// Verdict line for a passing document.
pub const VALID_MESSAGE: &str = "YAML file is valid.";
/// Verdict line for a failing document.
pub const INVALID_MESSAGE: &str = "YAML file is invalid.";

/// Arguments for the `retcheck validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Retention configuration file to validate.
    #[arg(value_name = "PATH", default_value = DEFAULT_DOCUMENT_PATH)]
    pub path: PathBuf,

    /// Treat any failed retention policy entry as making the document invalid.
    #[arg(long)]
    pub enforce: bool,

    /// Exit with status 1 when the document is invalid.
    #[arg(long)]
    pub fail_on_invalid: bool,
}

/// Writes each diagnostic to `out` as soon as it is emitted.
struct PrintSink<W: Write> {
    out: W,
    error: Option<std::io::Error>,
}

impl<W: Write> DiagnosticSink for PrintSink<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{diagnostic}") {
            self.error = Some(e);
        }
    }
}

/// Execute the validate subcommand, printing to stdout.
pub fn run_validate(args: &ValidateArgs, registry: PolicyRegistry) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_validate_to(args, registry, &mut out)
}

/// Execute the validate subcommand, printing to `out`.
///
/// Returns the process exit code.
pub fn run_validate_to(
    args: &ValidateArgs,
    registry: PolicyRegistry,
    out: &mut dyn Write,
) -> Result<u8> {
    let enforcement = if args.enforce {
        PolicyEnforcement::Enforcing
    } else {
        PolicyEnforcement::Advisory
    };
    let validator = RetentionValidator::new(ValidatorConfig {
        registry,
        enforcement,
    })
    .context("failed to build retention validator")?;

    let document = match load_document(&args.path) {
        Ok(document) => document,
        Err(RetentionError::DocumentLoad { reason, .. }) => {
            writeln!(out, "Error loading YAML file: {reason}")?;
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(path = %args.path.display(), ?enforcement, "validating retention configuration");

    let mut sink = PrintSink {
        out: &mut *out,
        error: None,
    };
    let result = validator.validate(&document, &mut sink);
    if let Some(e) = sink.error.take() {
        return Err(e).context("failed to write diagnostics");
    }
    let valid = result.with_context(|| format!("validation of {} aborted", args.path.display()))?;

    if valid {
        writeln!(out, "{VALID_MESSAGE}")?;
        Ok(0)
    } else {
        writeln!(out, "{INVALID_MESSAGE}")?;
        Ok(u8::from(args.fail_on_invalid))
    }
}

/// Load the registry named on the command line, or the built-in one.
pub fn load_registry(path: Option<&Path>) -> Result<PolicyRegistry> {
    match path {
        Some(path) => {
            let registry = PolicyRegistry::from_path(path)
                .with_context(|| format!("failed to load registry {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded policy registry");
            Ok(registry)
        }
        None => Ok(PolicyRegistry::builtin()),
    }
}
