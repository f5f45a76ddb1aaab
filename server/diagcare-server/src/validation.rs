//! Request validation utilities for consistent validation across handlers
//!
//! This module provides a `RequestValidation` trait and helper macros to
//! centralize validation logic and ensure consistent error messages.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// Implement this trait for all create/update request types to ensure
/// consistent validation across the API.
pub trait RequestValidation {
    /// Validates the request and returns an error if validation fails
    ///
    /// Returns `Ok(())` if validation passes, or `Err(ApiError)` with
    /// a validation error message if validation fails.
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.identity, !self.identity.trim().is_empty(), "Identity is required");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.len();
        validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating email format (basic check)
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        validate_field!($field, $field.contains('@') && $field.contains('.'), $message);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRequest {
        identity: String,
        email: String,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!(self.identity, "Identity is required");
            validate_length!(
                self.identity,
                1,
                200,
                "Identity must be between 1 and 200 characters"
            );
            validate_email!(self.email, "Invalid email format");
            Ok(())
        }
    }

    #[test]
    fn test_validation_success() {
        let request = TestRequest {
            identity: "alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_identity() {
        let request = TestRequest {
            identity: "   ".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_email() {
        let request = TestRequest {
            identity: "alice".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
