//! Integration test: validate the YAML fixtures under `tests/fixtures/`
//! end to end, from file loading through the verdict.

use std::path::PathBuf;

use proptest::prelude::*;
use retcheck_core::{Diagnostic, ErrorKind, RetentionError};
use retcheck_schema::{
    load_document, parse_document, PolicyEnforcement, RetentionValidator, ValidatorConfig,
};
use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn check(name: &str) -> (Result<bool, RetentionError>, Vec<Diagnostic>) {
    let document = load_document(&fixture(name)).expect("fixture should parse");
    let validator = RetentionValidator::builtin().expect("embedded schema compiles");
    let mut sink = Vec::new();
    let result = validator.validate(&document, &mut sink);
    (result, sink)
}

#[test]
fn valid_document_passes() {
    let (result, diagnostics) = check("valid.yml");
    assert!(result.unwrap());
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

#[test]
fn missing_version_reports_and_stops() {
    let (result, diagnostics) = check("missing_version.yml");
    assert!(!result.unwrap());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "version info missed.");
    assert_eq!(diagnostics[0].kind, ErrorKind::StructuralMissing);
}

#[test]
fn empty_models_passes() {
    let (result, diagnostics) = check("empty_models.yml");
    assert!(result.unwrap());
    assert!(diagnostics.is_empty());
}

#[test]
fn numeric_retention_flag_fails() {
    let (result, diagnostics) = check("numeric_flag.yml");
    assert!(!result.unwrap());
    assert_eq!(diagnostics[0].message, "has_retention_policy is not Boolean 1");
}

#[test]
fn quoted_retention_flag_fails() {
    let (result, diagnostics) = check("string_flag.yml");
    assert!(!result.unwrap());
    assert_eq!(diagnostics[0].kind, ErrorKind::TypeMismatch);
}

#[test]
fn bad_policy_ref_is_reported_but_not_fatal() {
    let (result, diagnostics) = check("bad_policy_ref.yml");
    assert!(result.unwrap());
    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert!(
        messages.contains(&"policy_ref:bad_1 format error."),
        "got: {messages:?}"
    );
}

#[test]
fn bad_policy_ref_fails_when_enforcing() {
    let document = load_document(&fixture("bad_policy_ref.yml")).unwrap();
    let validator = RetentionValidator::new(ValidatorConfig {
        enforcement: PolicyEnforcement::Enforcing,
        ..ValidatorConfig::default()
    })
    .unwrap();
    let mut sink: Vec<Diagnostic> = Vec::new();
    assert!(!validator.validate(&document, &mut sink).unwrap());
}

#[test]
fn missing_policy_params_aborts_run() {
    let (result, diagnostics) = check("missing_policy_params.yml");
    let err = result.unwrap_err();
    assert!(
        matches!(err, RetentionError::PolicySchemaRejected { .. }),
        "expected PolicySchemaRejected, got: {err}"
    );
    // The second model has no config but is never reached.
    assert!(diagnostics.iter().all(|d| d.message != "config info missed."));
}

#[test]
fn revalidation_is_identical() {
    let validator = RetentionValidator::builtin().unwrap();
    for name in ["valid.yml", "unrelated_infinity.yml", "bad_policy_ref.yml", "numeric_flag.yml", "missing_policy_params.yml"] {
        let document = load_document(&fixture(name)).unwrap();
        let before = document.clone();

        let mut first: Vec<Diagnostic> = Vec::new();
        let mut second: Vec<Diagnostic> = Vec::new();
        let a = validator.validate(&document, &mut first).map_err(|e| e.to_string());
        let b = validator.validate(&document, &mut second).map_err(|e| e.to_string());

        assert_eq!(a, b, "{name}: verdict changed between runs");
        assert_eq!(first, second, "{name}: diagnostics changed between runs");
        assert_eq!(document, before, "{name}: document was mutated");
    }
}

#[test]
fn parse_failure_happens_before_validation() {
    let err = parse_document("version: 2\nmodels: [\n", "inline.yml").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ParseFailure));
}

#[test]
fn non_finite_numbers_outside_policies_still_validate() {
    let (result, diagnostics) = check("unrelated_infinity.yml");
    assert!(result.unwrap());
    assert!(diagnostics.is_empty(), "unexpected: {diagnostics:?}");
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z_0-9]{0,12}".prop_map(Value::String),
    ]
}

fn policy_entry() -> impl Strategy<Value = Value> {
    (
        prop::option::of(scalar()),
        prop::option::of(scalar()),
        prop::option::of(prop::collection::btree_map("[a-z_]{1,12}", scalar(), 0..4)),
    )
        .prop_map(|(policy_ref, enabled, params)| {
            let mut entry = serde_json::Map::new();
            if let Some(v) = policy_ref {
                entry.insert("policy_ref".to_string(), v);
            }
            if let Some(v) = enabled {
                entry.insert("policy_enabled".to_string(), v);
            }
            if let Some(p) = params {
                entry.insert(
                    "policy_params".to_string(),
                    Value::Object(p.into_iter().collect()),
                );
            }
            Value::Object(entry)
        })
}

fn wrap(retention: Value) -> serde_yaml::Value {
    let document = json!({
        "version": 2,
        "models": [{
            "name": "generated",
            "config": {"meta": {"canva": {"retention": retention}}}
        }]
    });
    serde_yaml::to_value(&document).unwrap()
}

proptest! {
    /// Validation is deterministic for arbitrary policy entries.
    #[test]
    fn validation_is_deterministic(entries in prop::collection::vec(policy_entry(), 0..4)) {
        let validator = RetentionValidator::builtin().unwrap();
        let document = wrap(json!({"has_retention_policy": true, "retention_policy": entries}));
        let mut first: Vec<Diagnostic> = Vec::new();
        let mut second: Vec<Diagnostic> = Vec::new();
        let a = validator.validate(&document, &mut first).map_err(|e| e.to_string());
        let b = validator.validate(&document, &mut second).map_err(|e| e.to_string());
        prop_assert_eq!(a, b);
        prop_assert_eq!(first, second);
    }

    /// Advisory mode never turns a completed run into `false`.
    #[test]
    fn advisory_runs_that_finish_are_valid(entries in prop::collection::vec(policy_entry(), 0..4)) {
        let validator = RetentionValidator::builtin().unwrap();
        let document = wrap(json!({"has_retention_policy": true, "retention_policy": entries}));
        let mut sink: Vec<Diagnostic> = Vec::new();
        if let Ok(verdict) = validator.validate(&document, &mut sink) {
            prop_assert!(verdict);
        }
    }

    /// Any non-boolean retention flag is rejected.
    #[test]
    fn non_boolean_flag_is_rejected(flag in scalar().prop_filter("non-boolean", |v| !v.is_boolean())) {
        let validator = RetentionValidator::builtin().unwrap();
        let document = wrap(json!({"has_retention_policy": flag}));
        let mut sink: Vec<Diagnostic> = Vec::new();
        prop_assert!(!validator.validate(&document, &mut sink).unwrap());
        prop_assert_eq!(sink.len(), 1);
        prop_assert_eq!(sink[0].kind, ErrorKind::TypeMismatch);
    }
}
