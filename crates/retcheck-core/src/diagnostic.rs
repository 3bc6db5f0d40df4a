//! # Diagnostics
//!
//! A [`Diagnostic`] is one human-readable finding produced while checking
//! a document. Diagnostics are pushed into a [`DiagnosticSink`] in the
//! order the checks run, so a sink that prints immediately reproduces the
//! exact line-by-line output of a run even when the run is later aborted.

use std::fmt;

use crate::error::ErrorKind;

/// A single finding with its classification and document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Classification of the finding.
    pub kind: ErrorKind,
    /// Dotted location within the document, e.g.
    /// `models[0].config.meta.canva.retention`. Empty for the root.
    pub location: String,
    /// Message shown to the user.
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receiver for diagnostics emitted during validation.
pub trait DiagnosticSink {
    /// Accept the next diagnostic.
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Build the location of a child key under `parent`.
pub fn child_location(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Build the location of a sequence element under `parent`.
pub fn index_location(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}
