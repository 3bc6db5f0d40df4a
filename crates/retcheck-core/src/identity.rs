//! # Policy Identifiers
//!
//! Newtype wrapper for retention policy references so that registry
//! entries cannot be built from arbitrary strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Prefix every retention policy reference carries.
pub const POLICY_REF_PREFIX: &str = "ret_";

/// A retention policy reference such as `ret_2_2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyRef(String);

impl PolicyRef {
    /// Create a policy reference from a string.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidPolicyRef`] if the string does not
    /// start with [`POLICY_REF_PREFIX`] or has nothing after it.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistryError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), RegistryError> {
        match s.strip_prefix(POLICY_REF_PREFIX) {
            None => Err(RegistryError::InvalidPolicyRef {
                input: s.to_string(),
                reason: format!("must start with {POLICY_REF_PREFIX:?}"),
            }),
            Some("") => Err(RegistryError::InvalidPolicyRef {
                input: s.to_string(),
                reason: "missing identifier after prefix".to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// True when `candidate` has the shape of a policy reference.
///
/// Compares the first four characters, so a value shorter than the prefix
/// never matches.
pub fn has_policy_ref_prefix(candidate: &str) -> bool {
    candidate.starts_with(POLICY_REF_PREFIX)
}

impl TryFrom<String> for PolicyRef {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PolicyRef> for String {
    fn from(value: PolicyRef) -> Self {
        value.0
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
