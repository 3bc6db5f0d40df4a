//! # Retention Validation
//!
//! Walks a parsed document and decides whether every model carries a
//! well-formed retention block.
//!
//! ## Check Order
//!
//! 1. Presence: `version`, `models`, then per model `name`, `config`,
//!    `config.meta`, `config.meta.canva`, `config.meta.canva.retention`.
//! 2. `has_retention_policy` present and strictly boolean.
//! 3. When `has_retention_policy` is `true`, every `retention_policy` entry
//!    goes through the checks in [`crate::policy`].
//!
//! A failure in steps 1 and 2 ends the run with `Ok(false)`; no later model is
//! looked at. Per-policy failures are reported and folded into a policy
//! outcome whose effect depends on [`PolicyEnforcement`]. A policy entry
//! rejected by the strict schema ends the run with an `Err`.

use retcheck_core::{
    child_location, index_location, Diagnostic, DiagnosticSink, ErrorKind, PolicyRegistry,
    RetentionError,
};
use serde_yaml::Value;

use crate::document::{render_value, type_name};
use crate::policy::{
    check_policy_enabled, check_policy_params, check_policy_ref, check_policy_semantics,
    CheckOutcome, PolicySchema,
};

/// What a failed retention policy entry does to the verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyEnforcement {
    /// Failures are reported but the verdict only reflects document,
    /// model and retention-flag structure.
    #[default]
    Advisory,
    /// Any failed policy entry makes the verdict `false`. Remaining
    /// policies and models are still checked.
    Enforcing,
}

/// Immutable validator settings, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    pub registry: PolicyRegistry,
    pub enforcement: PolicyEnforcement,
}

/// Validates retention configuration documents.
///
/// Holds only immutable state, so one instance can check any number of
/// documents and repeated runs over the same document are identical.
pub struct RetentionValidator {
    config: ValidatorConfig,
    policy_schema: PolicySchema,
}

impl RetentionValidator {
    /// Create a validator, compiling the embedded policy schema.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::SchemaBuild` if the policy schema fails to
    /// compile.
    pub fn new(config: ValidatorConfig) -> Result<Self, RetentionError> {
        Ok(Self {
            config,
            policy_schema: PolicySchema::embedded()?,
        })
    }

    /// Validator with the built-in registry in advisory mode.
    pub fn builtin() -> Result<Self, RetentionError> {
        Self::new(ValidatorConfig::default())
    }

    /// Validate `document`, pushing diagnostics into `sink` as they occur.
    ///
    /// Returns `Ok(true)` when the document passes, `Ok(false)` when it
    /// does not.
    ///
    /// # Errors
    ///
    /// Returns `RetentionError::PolicySchemaRejected` when a retention policy
    /// entry fails the strict schema. Diagnostics emitted before that point
    /// remain in `sink`.
    pub fn validate(
        &self,
        document: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<bool, RetentionError> {
        if require(document, "", "version", "version info missed.", sink).is_none() {
            return Ok(false);
        }
        let Some(models) = require(document, "", "models", "model info missed.", sink) else {
            return Ok(false);
        };
        let Some(models) = models.as_sequence() else {
            report(
                sink,
                ErrorKind::TypeMismatch,
                "models".to_string(),
                format!("models is not a sequence, found {}.", type_name(models)),
            );
            return Ok(false);
        };

        let mut valid = true;
        for (index, model) in models.iter().enumerate() {
            let location = index_location("models", index);
            match self.validate_model(model, &location, sink)? {
                ModelVerdict::Rejected => return Ok(false),
                ModelVerdict::PolicyFailures => valid = false,
                ModelVerdict::Accepted => {}
            }
        }

        tracing::info!(models = models.len(), valid, "retention validation finished");
        Ok(valid)
    }

    fn validate_model(
        &self,
        model: &Value,
        location: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ModelVerdict, RetentionError> {
        let Some(name) = require(model, location, "name", "name info missed.", sink) else {
            return Ok(ModelVerdict::Rejected);
        };
        tracing::debug!(model = %render_value(name), location, "checking model");

        let Some(config) = require(model, location, "config", "config info missed.", sink) else {
            return Ok(ModelVerdict::Rejected);
        };
        let location = child_location(location, "config");
        let Some(meta) = require(config, &location, "meta", "config.meta info missed.", sink)
        else {
            return Ok(ModelVerdict::Rejected);
        };
        let location = child_location(&location, "meta");
        let Some(canva) = require(meta, &location, "canva", "config.canva info missed.", sink)
        else {
            return Ok(ModelVerdict::Rejected);
        };
        let location = child_location(&location, "canva");
        let Some(retention) = require(
            canva,
            &location,
            "retention",
            "config.canva.retention info missed.",
            sink,
        ) else {
            return Ok(ModelVerdict::Rejected);
        };
        let location = child_location(&location, "retention");

        let Some(flag) = require(
            retention,
            &location,
            "has_retention_policy",
            "has_retention_policy info missed.",
            sink,
        ) else {
            return Ok(ModelVerdict::Rejected);
        };
        let has_policy = match flag {
            Value::Bool(b) => *b,
            other => {
                report(
                    sink,
                    ErrorKind::TypeMismatch,
                    child_location(&location, "has_retention_policy"),
                    format!("has_retention_policy is not Boolean {}", render_value(other)),
                );
                return Ok(ModelVerdict::Rejected);
            }
        };
        if !has_policy {
            return Ok(ModelVerdict::Accepted);
        }

        let Some(policies) = require(
            retention,
            &location,
            "retention_policy",
            "retention_policy info missed.",
            sink,
        ) else {
            return Ok(ModelVerdict::Rejected);
        };
        let location = child_location(&location, "retention_policy");
        let Some(policies) = policies.as_sequence() else {
            report(
                sink,
                ErrorKind::TypeMismatch,
                location,
                format!("retention_policy is not a sequence, found {}.", type_name(policies)),
            );
            return Ok(ModelVerdict::Rejected);
        };

        let mut all_passed = true;
        for (index, policy) in policies.iter().enumerate() {
            let location = index_location(&location, index);
            if !self.validate_policy(policy, &location, sink)?.passed() {
                all_passed = false;
                match self.config.enforcement {
                    PolicyEnforcement::Advisory => {
                        tracing::warn!(location = %location, "retention policy failed checks (advisory)");
                    }
                    PolicyEnforcement::Enforcing => {
                        tracing::warn!(location = %location, "retention policy failed checks");
                    }
                }
            }
        }

        if all_passed || self.config.enforcement == PolicyEnforcement::Advisory {
            Ok(ModelVerdict::Accepted)
        } else {
            Ok(ModelVerdict::PolicyFailures)
        }
    }

    fn validate_policy(
        &self,
        policy: &Value,
        location: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<CheckOutcome, RetentionError> {
        tracing::debug!(location, "checking retention policy");
        let outcome = check_policy_ref(policy, location, sink)
            .and(check_policy_enabled(policy, location, sink))
            .and(check_policy_params(policy, location, sink));

        self.policy_schema.check(policy, location)?;

        Ok(outcome.and(check_policy_semantics(
            policy,
            location,
            &self.config.registry,
            sink,
        )))
    }
}

enum ModelVerdict {
    Accepted,
    /// At least one policy entry failed under `PolicyEnforcement::Enforcing`.
    PolicyFailures,
    /// A structural check failed; the run stops.
    Rejected,
}

/// Validate with the built-in registry in advisory mode.
pub fn validate(document: &Value, sink: &mut dyn DiagnosticSink) -> Result<bool, RetentionError> {
    RetentionValidator::builtin()?.validate(document, sink)
}

/// Look up `key` in `parent`, reporting `message` when it is absent.
///
/// A non-mapping parent has no keys.
fn require<'a>(
    parent: &'a Value,
    location: &str,
    key: &str,
    message: &str,
    sink: &mut dyn DiagnosticSink,
) -> Option<&'a Value> {
    let value = parent.get(key);
    if value.is_none() {
        report(
            sink,
            ErrorKind::StructuralMissing,
            child_location(location, key),
            message.to_string(),
        );
    }
    value
}

fn report(sink: &mut dyn DiagnosticSink, kind: ErrorKind, location: String, message: String) {
    tracing::debug!(kind = %kind, location = %location, "{message}");
    sink.emit(Diagnostic::new(kind, location, message));
}
