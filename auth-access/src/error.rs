use crate::password::PolicyViolation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which login identity field collided on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    Username,
    Email,
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// A normalized username or email collides with an existing record,
    /// active or inactive.
    #[error("{field:?} already in use")]
    DuplicateIdentity { field: IdentityField },

    /// The candidate password fails the security policy. Carries every
    /// violation so callers can present a complete remediation list.
    #[error("password does not meet the security policy")]
    WeakCredential(Vec<PolicyViolation>),

    /// Generic authentication failure. Deliberately covers both an unknown
    /// identity and a wrong secret so callers cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity is temporarily locked out after repeated failures.
    /// The lockout expires on its own at `unlocks_at`.
    #[error("account locked until {unlocks_at}")]
    AccountLocked { unlocks_at: DateTime<Utc> },

    /// The account exists and the credentials match, but the account has
    /// been deactivated. An administrative state, not a secret.
    #[error("account is inactive")]
    AccountInactive,

    #[error("session expired")]
    SessionExpired,

    #[error("not found")]
    NotFound,

    #[error("invalid security configuration: {0}")]
    ConfigInvalid(String),

    /// The hashing collaborator rejected the stored verifier or failed to
    /// produce one.
    #[error("credential hashing failed")]
    Hashing,

    /// Storage backend failure. Fatal to the request; never retried here.
    #[error("storage backend error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
