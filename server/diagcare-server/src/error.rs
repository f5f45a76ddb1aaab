//! API error envelope and the mapping from core errors to HTTP statuses.
//!
//! Authentication failures stay deliberately vague on the wire: unknown
//! identity and wrong password produce byte-identical bodies. Lockout and
//! inactive states are administrative, not secrets, so they carry detail.

use auth_access::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Success envelope returned by every 2xx JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

/// Error body with a machine-readable `kind` discriminator.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable error discriminator, e.g. `invalid_credentials` or `locked`.
    #[schema(example = "invalid_credentials")]
    pub kind: String,
    /// Human-readable message safe to display.
    pub message: String,
    /// When the lockout ends; only present for `kind = "locked"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocks_at: Option<DateTime<Utc>>,
    /// Password policy violations; only present for `kind = "weak_password"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub violations: Option<serde_json::Value>,
}

/// An HTTP-mapped error. Convertible from [`AuthError`] so handlers can
/// use `?` on core calls.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                kind: kind.to_string(),
                message: message.into(),
                unlocks_at: None,
                violations: None,
            },
        }
    }

    /// 422 for malformed or incomplete request payloads.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", message)
    }

    /// 401 for requests without a usable session credential.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateIdentity { .. } => {
                Self::new(StatusCode::CONFLICT, "duplicate", err.to_string())
            }
            AuthError::WeakCredential(violations) => {
                let messages: Vec<String> =
                    violations.iter().map(ToString::to_string).collect();
                let mut body = Self::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "weak_password",
                    messages.join("; "),
                );
                body.body.violations = serde_json::to_value(&violations).ok();
                body
            }
            AuthError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "invalid credentials",
            ),
            AuthError::AccountLocked { unlocks_at } => {
                let mut body = Self::new(
                    StatusCode::LOCKED,
                    "locked",
                    "too many failed attempts, try again later",
                );
                body.body.unlocks_at = Some(unlocks_at);
                body
            }
            AuthError::AccountInactive => {
                Self::new(StatusCode::FORBIDDEN, "inactive", "account is inactive")
            }
            AuthError::SessionExpired => {
                Self::new(StatusCode::UNAUTHORIZED, "session_expired", "session expired")
            }
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "not_found", "not found"),
            AuthError::ConfigInvalid(reason) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "config_invalid", reason)
            }
            AuthError::Hashing | AuthError::Storage(_) => {
                // internal detail stays out of the response
                error!(%err, "internal error while serving request");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_access::{IdentityField, PolicyViolation};

    #[test]
    fn duplicate_maps_to_409() {
        let err = ApiError::from(AuthError::DuplicateIdentity {
            field: IdentityField::Email,
        });
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.kind, "duplicate");
    }

    #[test]
    fn weak_password_maps_to_422_with_violations() {
        let err = ApiError::from(AuthError::WeakCredential(vec![
            PolicyViolation::MissingNumber,
        ]));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.kind, "weak_password");
        assert!(err.body.violations.is_some());
    }

    #[test]
    fn lockout_maps_to_423_with_unlock_time() {
        let unlocks_at = Utc::now();
        let err = ApiError::from(AuthError::AccountLocked { unlocks_at });
        assert_eq!(err.status, StatusCode::LOCKED);
        assert_eq!(err.body.unlocks_at, Some(unlocks_at));
    }

    #[test]
    fn unknown_identity_and_wrong_password_share_one_body() {
        let a = ApiError::from(AuthError::InvalidCredentials);
        let b = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(
            serde_json::to_string(&a.body).unwrap(),
            serde_json::to_string(&b.body).unwrap()
        );
    }

    #[test]
    fn storage_errors_stay_generic() {
        let err = ApiError::from(AuthError::Storage(anyhow::anyhow!("pg connection refused")));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body.message.contains("pg"));
    }
}
