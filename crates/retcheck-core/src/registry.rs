//! # Policy Registry
//!
//! The set of retention policies and field rules a document may reference.
//! A registry is built once at startup, either from the built-in defaults
//! or from a YAML file, and is immutable afterwards.
//!
//! ## File Format
//!
//! ```yaml
//! policy_refs:
//!   - ret_2_2
//! field_rules:
//!   user_country: tax_region
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::identity::PolicyRef;

/// Policy identifiers recognized when no registry file is given.
pub const BUILTIN_POLICY_REFS: &[&str] = &["ret_2_2"];

/// Field-to-tag rules recognized when no registry file is given.
pub const BUILTIN_FIELD_RULES: &[(&str, &str)] = &[("user_country", "tax_region")];

/// Recognized policy identifiers and the tag each parameter field must map to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyRegistry {
    policy_refs: BTreeSet<PolicyRef>,
    #[serde(default)]
    field_rules: BTreeMap<String, String>,
}

/// Result of looking up one `policy_params` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRuleMatch<'a> {
    /// The field is known and maps to the expected tag.
    Matches,
    /// The field is not in the registry.
    UnknownField,
    /// The field is known but must map to the contained tag.
    WrongTag(&'a str),
}

impl PolicyRegistry {
    /// The built-in registry.
    pub fn builtin() -> Self {
        let policy_refs = BUILTIN_POLICY_REFS
            .iter()
            .filter_map(|r| PolicyRef::new(*r).ok())
            .collect();
        let field_rules = BUILTIN_FIELD_RULES
            .iter()
            .map(|(field, tag)| (field.to_string(), tag.to_string()))
            .collect();
        Self {
            policy_refs,
            field_rules,
        }
    }

    /// Parse a registry from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Yaml`] for malformed YAML, unknown keys or
    /// policy refs without the `ret_` prefix,
    /// [`RegistryError::EmptyPolicyRefs`] when no policy is listed and
    /// [`RegistryError::EmptyFieldTag`] when a field rule has an empty tag.
    pub fn from_yaml_str(content: &str) -> Result<Self, RegistryError> {
        let registry: Self = serde_yaml::from_str(content)?;
        registry.check()?;
        Ok(registry)
    }

    /// Load a registry from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    fn check(&self) -> Result<(), RegistryError> {
        if self.policy_refs.is_empty() {
            return Err(RegistryError::EmptyPolicyRefs);
        }
        if let Some((field, _)) = self.field_rules.iter().find(|(_, tag)| tag.is_empty()) {
            return Err(RegistryError::EmptyFieldTag {
                field: field.clone(),
            });
        }
        Ok(())
    }

    /// True when `policy_ref` names a recognized policy.
    pub fn recognizes_policy(&self, policy_ref: &str) -> bool {
        self.policy_refs.iter().any(|r| r.as_str() == policy_ref)
    }

    /// Check one `policy_params` entry against the field rules.
    ///
    /// `tag` is `None` when the entry's value is not a string; such an entry
    /// never matches. Comparison is exact and case-sensitive.
    pub fn match_field(&self, field: &str, tag: Option<&str>) -> FieldRuleMatch<'_> {
        match self.field_rules.get(field) {
            None => FieldRuleMatch::UnknownField,
            Some(expected) if tag == Some(expected.as_str()) => FieldRuleMatch::Matches,
            Some(expected) => FieldRuleMatch::WrongTag(expected),
        }
    }

    /// Recognized policy identifiers, sorted.
    pub fn policy_refs(&self) -> impl Iterator<Item = &PolicyRef> {
        self.policy_refs.iter()
    }

    /// Field rules, sorted by field name.
    pub fn field_rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_rules
            .iter()
            .map(|(field, tag)| (field.as_str(), tag.as_str()))
    }

    /// Render the registry in the same YAML format it is loaded from.
    pub fn to_yaml_string(&self) -> Result<String, RegistryError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_recognizes_ret_2_2() {
        let registry = PolicyRegistry::builtin();
        assert!(registry.recognizes_policy("ret_2_2"));
        assert!(!registry.recognizes_policy("ret_1_1"));
        assert!(!registry.recognizes_policy("RET_2_2"));
    }

    #[test]
    fn builtin_field_rule() {
        let registry = PolicyRegistry::builtin();
        assert_eq!(
            registry.match_field("user_country", Some("tax_region")),
            FieldRuleMatch::Matches
        );
        assert_eq!(
            registry.match_field("user_country", Some("Tax_Region")),
            FieldRuleMatch::WrongTag("tax_region")
        );
        assert_eq!(
            registry.match_field("user_country", None),
            FieldRuleMatch::WrongTag("tax_region")
        );
        assert_eq!(
            registry.match_field("user_email", Some("tax_region")),
            FieldRuleMatch::UnknownField
        );
    }

    #[test]
    fn parse_registry_yaml() {
        let registry = PolicyRegistry::from_yaml_str(
            "policy_refs: [ret_2_2, ret_7_1]\nfield_rules:\n  user_country: tax_region\n  signup_ip: network_origin\n",
        )
        .unwrap();
        assert!(registry.recognizes_policy("ret_7_1"));
        assert_eq!(
            registry.match_field("signup_ip", Some("network_origin")),
            FieldRuleMatch::Matches
        );
        assert_eq!(registry.policy_refs().count(), 2);
    }

    #[test]
    fn field_rules_default_to_empty() {
        let registry = PolicyRegistry::from_yaml_str("policy_refs: [ret_3_0]\n").unwrap();
        assert_eq!(registry.field_rules().count(), 0);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = PolicyRegistry::from_yaml_str("policy_refs: [ret_2_2]\nextra: 1\n").unwrap_err();
        assert!(matches!(err, RegistryError::Yaml(_)));
    }

    #[test]
    fn rejects_unprefixed_policy_ref() {
        let err = PolicyRegistry::from_yaml_str("policy_refs: [keep_forever]\n").unwrap_err();
        assert!(err.to_string().contains("keep_forever"), "got: {err}");
    }

    #[test]
    fn rejects_empty_policy_refs() {
        let err = PolicyRegistry::from_yaml_str("policy_refs: []\n").unwrap_err();
        assert!(matches!(err, RegistryError::EmptyPolicyRefs));
    }

    #[test]
    fn rejects_empty_field_tag() {
        let err = PolicyRegistry::from_yaml_str(
            "policy_refs: [ret_2_2]\nfield_rules:\n  user_country: \"\"\n",
        )
        .unwrap_err();
        match err {
            RegistryError::EmptyFieldTag { field } => assert_eq!(field, "user_country"),
            other => panic!("expected EmptyFieldTag, got: {other}"),
        }
    }

    #[test]
    fn yaml_output_reloads() {
        let registry = PolicyRegistry::builtin();
        let text = registry.to_yaml_string().unwrap();
        assert!(text.contains("ret_2_2"));
        assert_eq!(PolicyRegistry::from_yaml_str(&text).unwrap(), registry);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.yml");
        std::fs::write(&path, "policy_refs: [ret_5_5]\n").unwrap();
        let registry = PolicyRegistry::from_path(&path).unwrap();
        assert!(registry.recognizes_policy("ret_5_5"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = PolicyRegistry::from_path(Path::new("/tmp/retcheck-no-such-registry.yml"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Read { .. }));
    }
}
