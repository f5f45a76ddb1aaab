use crate::config::SecurityConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single password policy violation.
///
/// Serialized into API responses so clients can render a complete
/// remediation list.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PolicyViolation {
    #[error("password must be at least {minimum} characters")]
    TooShort { minimum: usize },
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain a digit")]
    MissingNumber,
    #[error("password must contain a special character")]
    MissingSpecialChar,
}

/// Check a candidate password against the policy.
///
/// Pure rule checker with no side effects. Every violated rule is reported,
/// not just the first. Used on create and on any credential-update path;
/// never during login, which only verifies.
pub fn validate_password(
    candidate: &str,
    policy: &SecurityConfig,
) -> std::result::Result<(), Vec<PolicyViolation>> {
    let mut violations = Vec::new();

    if candidate.chars().count() < policy.password_min_length {
        violations.push(PolicyViolation::TooShort {
            minimum: policy.password_min_length,
        });
    }
    if policy.password_require_uppercase && !candidate.chars().any(char::is_uppercase) {
        violations.push(PolicyViolation::MissingUppercase);
    }
    if policy.password_require_lowercase && !candidate.chars().any(char::is_lowercase) {
        violations.push(PolicyViolation::MissingLowercase);
    }
    if policy.password_require_numbers && !candidate.chars().any(char::is_numeric) {
        violations.push(PolicyViolation::MissingNumber);
    }
    if policy.password_require_special_chars
        && !candidate.chars().any(|c| !c.is_alphanumeric())
    {
        violations.push(PolicyViolation::MissingSpecialChar);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// The dedicated hashing collaborator. The core never designs or performs
/// password hashing itself; it stores and passes around the opaque verifier
/// this trait produces.
pub trait CredentialHasher: Send + Sync {
    /// Produce an opaque verifier for a raw candidate.
    fn hash(&self, candidate: &str) -> Result<String>;

    /// Compare a raw candidate against a stored verifier. Returns
    /// `Ok(false)` on mismatch; errors are reserved for malformed verifier
    /// material.
    fn verify(&self, candidate: &str, verifier: &str) -> Result<bool>;
}
