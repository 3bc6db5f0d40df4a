//! # retcheck-cli: Retention Policy CI Gate
//!
//! Provides the `retcheck` command-line interface. The library half holds
//! the subcommand handlers so they can be tested without spawning a
//! process; `main.rs` only parses arguments, sets up logging and maps the
//! handler result to an exit code.
//!
//! ## Subcommands
//!
//! - `retcheck validate [PATH]`: validate a retention configuration file
//!   (default `example.yml`).
//! - `retcheck registry`: print the effective policy registry.
//!
//! ## Output
//!
//! Diagnostics and the verdict line go to stdout; logs go to stderr:
//!
//! ```bash
//! retcheck validate models/example.yml --fail-on-invalid
//! retcheck --registry ci/registry.yml validate --enforce
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate to `retcheck-schema`; no checks live here.

pub mod registry;
pub mod validate;
