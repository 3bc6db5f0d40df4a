//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout retcheck. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every diagnostic, and every error caused by the document, is
//!   classified by a single [`ErrorKind`].
//! - Recoverable findings are [`Diagnostic`](crate::Diagnostic)s and only
//!   influence the boolean verdict. Conditions that abort a run are
//!   [`RetentionError`]s.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Classification shared by diagnostics and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// A required key is absent.
    StructuralMissing,
    /// A key is present but holds a value of the wrong type or format.
    TypeMismatch,
    /// A well-typed value is not recognized by the policy registry.
    SemanticMismatch,
    /// The source text could not be parsed into a document.
    ParseFailure,
}

impl ErrorKind {
    /// Stable snake_case label, used in structured log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuralMissing => "structural_missing",
            Self::TypeMismatch => "type_mismatch",
            Self::SemanticMismatch => "semantic_mismatch",
            Self::ParseFailure => "parse_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a validation run.
#[derive(Error, Debug)]
pub enum RetentionError {
    /// The document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path (or `<inline>`) of the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A retention policy entry failed the strict policy schema.
    #[error("retention policy at {location} rejected by schema:\n{violations}")]
    PolicySchemaRejected {
        /// Location of the policy entry within the document.
        location: String,
        /// One line per schema violation.
        violations: String,
    },

    /// The embedded policy schema could not be compiled.
    #[error("policy schema build error: {0}")]
    SchemaBuild(String),
}

impl RetentionError {
    /// The [`ErrorKind`] of the document fault behind this error, or `None`
    /// when the fault is not in the document.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::DocumentLoad { .. } => Some(ErrorKind::ParseFailure),
            Self::PolicySchemaRejected { .. } => Some(ErrorKind::TypeMismatch),
            Self::SchemaBuild(_) => None,
        }
    }
}

/// Errors raised while building a [`PolicyRegistry`](crate::PolicyRegistry).
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("cannot read registry file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The registry YAML is malformed or has unknown keys.
    #[error("failed to parse registry YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A policy identifier does not carry the `ret_` prefix.
    #[error("invalid policy ref {input:?}: {reason}")]
    InvalidPolicyRef { input: String, reason: String },

    /// The registry recognizes no policies at all.
    #[error("registry must list at least one policy ref")]
    EmptyPolicyRefs,

    /// A field rule maps its field to an empty tag.
    #[error("field rule {field:?} has an empty tag")]
    EmptyFieldTag { field: String },
}
