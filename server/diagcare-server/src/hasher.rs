//! Argon2id implementation of the core's hashing collaborator.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use auth_access::{AuthError, CredentialHasher};

/// Hashes and verifies credentials with Argon2id default parameters.
#[derive(Default)]
pub struct ArgonCredentialHasher {
    argon2: Argon2<'static>,
}

impl ArgonCredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for ArgonCredentialHasher {
    fn hash(&self, candidate: &str) -> auth_access::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(candidate.as_bytes(), &salt)
            .map_err(|_| AuthError::Hashing)?;
        Ok(hash.to_string())
    }

    fn verify(&self, candidate: &str, verifier: &str) -> auth_access::Result<bool> {
        let parsed = PasswordHash::new(verifier).map_err(|_| AuthError::Hashing)?;
        Ok(self
            .argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hasher = ArgonCredentialHasher::new();
        let verifier = hasher.hash("StrongP@ss1").unwrap();

        assert!(verifier.starts_with("$argon2"));
        assert!(hasher.verify("StrongP@ss1", &verifier).unwrap());
        assert!(!hasher.verify("wrong_password", &verifier).unwrap());
    }

    #[test]
    fn malformed_verifier_is_an_error_not_a_match() {
        let hasher = ArgonCredentialHasher::new();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }
}
