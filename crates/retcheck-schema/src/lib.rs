//! # retcheck-schema: Retention Policy Validation
//!
//! Checks that every data model in a configuration document carries a
//! well-formed retention block at `config.meta.canva.retention`, and that
//! each retention policy it lists is well-typed and recognized.
//!
//! ## Runtime Validation (`validate`)
//!
//! - [`RetentionValidator::validate`]: runs the full pipeline over a parsed
//!   document, pushing diagnostics into a sink and returning the verdict.
//!
//! ## Policy Checks (`policy`)
//!
//! Per-entry checks, including the strict JSON Schema check backed by the
//! embedded `schemas/retention-policy.schema.json`.
//!
//! ## Document Loading (`document`)
//!
//! YAML text to `serde_yaml::Value`, preserving mapping order. Policy
//! entries are converted to JSON one at a time for the strict schema.
//!
//! ## Crate Policy
//!
//! - Depends only on `retcheck-core` internally.
//! - Validation never mutates the document.
//! - A policy entry rejected by the strict schema is an error, never a
//!   `false` verdict.

pub mod document;
pub mod policy;
pub mod validate;

pub use document::{load_document, parse_document, DEFAULT_DOCUMENT_PATH};
pub use policy::{CheckOutcome, PolicySchema, PolicyViolation};
pub use validate::{validate, PolicyEnforcement, RetentionValidator, ValidatorConfig};
