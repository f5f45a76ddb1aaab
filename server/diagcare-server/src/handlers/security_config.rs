use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::DiagcareServer;
use auth_access::SecurityConfig;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Security policy as it appears on the wire. PUT replaces the whole
/// policy; every field is required so nothing is ever partially applied.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SecurityConfigView {
    #[schema(example = 30)]
    pub session_timeout_minutes: i64,
    #[schema(example = 5)]
    pub max_login_attempts: u32,
    #[schema(example = 15)]
    pub lockout_duration_minutes: i64,
    #[schema(example = 8)]
    pub password_min_length: usize,
    pub password_require_uppercase: bool,
    pub password_require_lowercase: bool,
    pub password_require_numbers: bool,
    pub password_require_special_chars: bool,
    pub audit_log_enabled: bool,
}

impl From<SecurityConfig> for SecurityConfigView {
    fn from(config: SecurityConfig) -> Self {
        Self {
            session_timeout_minutes: config.session_timeout_minutes,
            max_login_attempts: config.max_login_attempts,
            lockout_duration_minutes: config.lockout_duration_minutes,
            password_min_length: config.password_min_length,
            password_require_uppercase: config.password_require_uppercase,
            password_require_lowercase: config.password_require_lowercase,
            password_require_numbers: config.password_require_numbers,
            password_require_special_chars: config.password_require_special_chars,
            audit_log_enabled: config.audit_log_enabled,
        }
    }
}

impl From<SecurityConfigView> for SecurityConfig {
    fn from(view: SecurityConfigView) -> Self {
        Self {
            session_timeout_minutes: view.session_timeout_minutes,
            max_login_attempts: view.max_login_attempts,
            lockout_duration_minutes: view.lockout_duration_minutes,
            password_min_length: view.password_min_length,
            password_require_uppercase: view.password_require_uppercase,
            password_require_lowercase: view.password_require_lowercase,
            password_require_numbers: view.password_require_numbers,
            password_require_special_chars: view.password_require_special_chars,
            audit_log_enabled: view.audit_log_enabled,
        }
    }
}

/// Read the security policy currently in force
#[utoipa::path(
    get,
    path = crate::routes::paths::docs::CONFIG_SECURITY,
    tag = "config",
    responses(
        (status = 200, description = "Current security policy", body = SecurityConfigView)
    )
)]
pub async fn get_security_config(
    State(server): State<DiagcareServer>,
) -> Result<Json<ApiResponse<SecurityConfigView>>, ApiError> {
    Ok(Json(api_success(server.auth.config().into())))
}

/// Replace the security policy
///
/// The payload is validated before it takes effect; a rejected payload
/// leaves the previous policy in force.
#[utoipa::path(
    put,
    path = crate::routes::paths::docs::CONFIG_SECURITY,
    tag = "config",
    request_body = SecurityConfigView,
    responses(
        (status = 200, description = "New policy in force", body = SecurityConfigView),
        (status = 422, description = "Out-of-range policy rejected, previous one retained",
            body = crate::error::ErrorBody)
    )
)]
pub async fn put_security_config(
    State(server): State<DiagcareServer>,
    Json(request): Json<SecurityConfigView>,
) -> Result<Json<ApiResponse<SecurityConfigView>>, ApiError> {
    server.auth.update_config(request.into())?;
    Ok(Json(api_success(server.auth.config().into())))
}
