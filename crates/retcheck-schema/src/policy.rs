//! # Retention Policy Checks
//!
//! The independent checks run against each entry of a model's
//! `retention_policy` sequence:
//!
//! 1. [`check_policy_ref`]: `policy_ref` is present, a string, and carries
//!    the `ret_` prefix.
//! 2. [`check_policy_enabled`]: `policy_enabled` is present and boolean.
//! 3. [`check_policy_params`]: every `policy_params` value is a string.
//! 4. [`PolicySchema::check`]: the entry conforms to the embedded
//!    `retention-policy.schema.json` (all three keys required, nothing
//!    else allowed). This is the only check that aborts a run.
//! 5. [`check_policy_semantics`]: `policy_ref` and every `policy_params`
//!    entry are recognized by the [`PolicyRegistry`].
//!
//! Checks 1 to 3 and 5 report through the [`DiagnosticSink`] and return a
//! [`CheckOutcome`]; the caller decides what a failed outcome means.

use std::fmt;

use jsonschema::Validator;
use retcheck_core::{
    child_location, has_policy_ref_prefix, Diagnostic, DiagnosticSink, ErrorKind,
    FieldRuleMatch, PolicyRegistry, RetentionError,
};
use serde_yaml::Value;

use crate::document::{policy_entry_to_json, render_value, type_name};

/// The strict policy entry schema, embedded at compile time.
pub const POLICY_SCHEMA_JSON: &str = include_str!("../schemas/retention-policy.schema.json");

/// Pass/fail result of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed,
}

impl CheckOutcome {
    pub fn passed(self) -> bool {
        self == Self::Passed
    }

    /// Logical AND of two outcomes.
    pub fn and(self, other: Self) -> Self {
        if self.passed() && other.passed() {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

fn fail(
    sink: &mut dyn DiagnosticSink,
    kind: ErrorKind,
    location: String,
    message: String,
) -> CheckOutcome {
    tracing::debug!(kind = %kind, location = %location, "{message}");
    sink.emit(Diagnostic::new(kind, location, message));
    CheckOutcome::Failed
}

/// `policy_ref` must exist, be a string, and start with `ret_`.
pub fn check_policy_ref(
    policy: &Value,
    location: &str,
    sink: &mut dyn DiagnosticSink,
) -> CheckOutcome {
    let at = child_location(location, "policy_ref");
    let Some(policy_ref) = policy.get("policy_ref") else {
        return fail(
            sink,
            ErrorKind::StructuralMissing,
            at,
            "policy_ref info missed.".to_string(),
        );
    };
    let Some(policy_ref) = policy_ref.as_str() else {
        return fail(
            sink,
            ErrorKind::TypeMismatch,
            at,
            format!("policy_ref data type error. Type: {}", type_name(policy_ref)),
        );
    };
    if !has_policy_ref_prefix(policy_ref) {
        return fail(
            sink,
            ErrorKind::TypeMismatch,
            at,
            format!("policy_ref:{policy_ref} format error."),
        );
    }
    CheckOutcome::Passed
}

/// `policy_enabled` must exist and be exactly `true` or `false`.
pub fn check_policy_enabled(
    policy: &Value,
    location: &str,
    sink: &mut dyn DiagnosticSink,
) -> CheckOutcome {
    let at = child_location(location, "policy_enabled");
    match policy.get("policy_enabled") {
        None => fail(
            sink,
            ErrorKind::StructuralMissing,
            at,
            "policy_enabled info missed.".to_string(),
        ),
        Some(Value::Bool(_)) => CheckOutcome::Passed,
        Some(other) => fail(
            sink,
            ErrorKind::TypeMismatch,
            at,
            format!("policy_enabled is not Boolean {}", render_value(other)),
        ),
    }
}

/// When `policy_params` is present, each of its values must be a string.
///
/// Stops at the first offending entry.
pub fn check_policy_params(
    policy: &Value,
    location: &str,
    sink: &mut dyn DiagnosticSink,
) -> CheckOutcome {
    let Some(params) = policy.get("policy_params") else {
        return CheckOutcome::Passed;
    };
    let at = child_location(location, "policy_params");
    let Some(params) = params.as_mapping() else {
        return fail(
            sink,
            ErrorKind::TypeMismatch,
            at,
            format!(
                "policy_params should be a mapping, but actual value is {}, whose type is {}",
                render_value(params),
                type_name(params)
            ),
        );
    };
    for (key, value) in params {
        if !value.is_string() {
            let key = render_value(key);
            return fail(
                sink,
                ErrorKind::TypeMismatch,
                child_location(&at, &key),
                format!(
                    "Key {key} should have a string value, but actual value is {}, whose type is {}",
                    render_value(value),
                    type_name(value)
                ),
            );
        }
    }
    CheckOutcome::Passed
}

/// `policy_ref` must be registered and every `policy_params` entry must map
/// a known field to its registered tag. A non-string value never matches
/// a tag.
///
/// Stops at the first mismatch.
pub fn check_policy_semantics(
    policy: &Value,
    location: &str,
    registry: &PolicyRegistry,
    sink: &mut dyn DiagnosticSink,
) -> CheckOutcome {
    let policy_ref = policy.get("policy_ref").and_then(Value::as_str).unwrap_or_default();
    if !registry.recognizes_policy(policy_ref) {
        return fail(
            sink,
            ErrorKind::SemanticMismatch,
            child_location(location, "policy_ref"),
            format!("policy_ref:{policy_ref} is not a recognized retention policy."),
        );
    }

    let Some(params) = policy.get("policy_params").and_then(Value::as_mapping) else {
        return CheckOutcome::Passed;
    };
    let at = child_location(location, "policy_params");
    for (key, value) in params {
        let key = render_value(key);
        match registry.match_field(&key, value.as_str()) {
            FieldRuleMatch::Matches => {}
            FieldRuleMatch::UnknownField => {
                return fail(
                    sink,
                    ErrorKind::SemanticMismatch,
                    child_location(&at, &key),
                    format!("policy_params key {key} is not a recognized field."),
                );
            }
            FieldRuleMatch::WrongTag(expected) => {
                return fail(
                    sink,
                    ErrorKind::SemanticMismatch,
                    child_location(&at, &key),
                    format!(
                        "policy_params key {key} must map to {expected}, found {}.",
                        render_value(value)
                    ),
                );
            }
        }
    }
    CheckOutcome::Passed
}

/// One reason a policy entry was rejected by the strict schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    /// JSON Pointer into the entry; empty for the entry itself.
    pub pointer: String,
    pub message: String,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.pointer.is_empty() { "/" } else { &self.pointer };
        write!(f, "  {at}: {}", self.message)
    }
}

/// Compiled form of the strict policy entry schema.
///
/// Compiled once; `Send + Sync`.
pub struct PolicySchema {
    validator: Validator,
}

impl PolicySchema {
    /// Compile the embedded schema.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::SchemaBuild` if the embedded schema is not
    /// valid JSON or not a valid Draft 2020-12 schema.
    pub fn embedded() -> Result<Self, RetentionError> {
        let schema: serde_json::Value = serde_json::from_str(POLICY_SCHEMA_JSON)
            .map_err(|e| RetentionError::SchemaBuild(format!("invalid JSON: {e}")))?;
        Self::from_value(&schema)
    }

    /// Compile a policy schema from a JSON value.
    fn from_value(schema: &serde_json::Value) -> Result<Self, RetentionError> {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(schema)
            .map_err(|e| RetentionError::SchemaBuild(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Every violation of the schema by `policy`, in schema order.
    ///
    /// An entry holding a value JSON cannot represent yields that single
    /// violation and is not checked further.
    pub fn violations(&self, policy: &Value) -> Vec<PolicyViolation> {
        let policy = match policy_entry_to_json(policy) {
            Ok(policy) => policy,
            Err(e) => {
                return vec![PolicyViolation {
                    pointer: e.pointer,
                    message: e.reason,
                }]
            }
        };
        self.validator
            .iter_errors(&policy)
            .map(|e| PolicyViolation {
                pointer: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }

    /// Check `policy` against the schema.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::PolicySchemaRejected` listing every
    /// violation. This error is not recoverable: it ends the run.
    pub fn check(&self, policy: &Value, location: &str) -> Result<(), RetentionError> {
        let violations = self.violations(policy);
        if violations.is_empty() {
            return Ok(());
        }
        let violations = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        Err(RetentionError::PolicySchemaRejected {
            location: location.to_string(),
            violations,
        })
    }
}
