//! # retcheck-core: Foundational Types for retcheck
//!
//! Defines the vocabulary shared by the validator and the CLI. Every other
//! crate in the workspace depends on `retcheck-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** [`ErrorKind`] classifies every diagnostic and
//!    every error caused by the document: `StructuralMissing`, `TypeMismatch`,
//!    `SemanticMismatch`, `ParseFailure`.
//!
//! 2. **Diagnostics are values.** Checks push [`Diagnostic`]s into a
//!    [`DiagnosticSink`] instead of printing, so the same run can feed a
//!    terminal, a test assertion, or a log.
//!
//! 3. **Immutable registry.** [`PolicyRegistry`] is built once at startup,
//!    from the built-in allow-lists or from a YAML file, and is only read
//!    afterwards.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `retcheck-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod identity;
pub mod registry;

// Re-export primary types for ergonomic imports.
pub use diagnostic::{child_location, index_location, Diagnostic, DiagnosticSink};
pub use error::{ErrorKind, RegistryError, RetentionError};
pub use identity::{has_policy_ref_prefix, PolicyRef, POLICY_REF_PREFIX};
pub use registry::{FieldRuleMatch, PolicyRegistry};
