use crate::error::{api_success, ApiError, ApiResponse};
use crate::handlers::users::UserView;
use crate::handlers::{client_info, session_id_from_headers};
use crate::server::DiagcareServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_length, validate_required};
use auth_access::{Action, LoginAttempt, Session};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authentication request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "identity": "alice",
    "credential": "StrongP@ss1"
}))]
pub struct LoginRequest {
    /// Username or email address
    #[schema(example = "alice")]
    pub identity: String,
    /// User password
    #[schema(example = "StrongP@ss1")]
    pub credential: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.identity, "Identity is required");
        validate_required!(self.credential, "Credential is required");

        validate_length!(
            self.identity,
            1,
            200,
            "Identity must be between 1 and 200 characters"
        );
        validate_length!(
            self.credential,
            1,
            128,
            "Credential must be between 1 and 128 characters"
        );

        Ok(())
    }
}

/// An issued session as it appears on the wire
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            issued_at: session.issued_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
        }
    }
}

/// Successful authentication response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub session_id: Uuid,
    /// Sliding expiry; every authorized request pushes it forward
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

/// Logout request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub session_id: Uuid,
}

/// Permission check query
#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionQuery {
    /// Module name, e.g. `reports`
    pub module: String,
    /// Action name, e.g. `view`
    pub action: String,
}

/// Permission check response
#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionResponse {
    pub allowed: bool,
}

/// User login handler
#[utoipa::path(
    post,
    path = crate::routes::paths::docs::AUTH_LOGIN,
    tag = "authentication",
    request_body(
        content = LoginRequest,
        description = "User login credentials",
        example = json!({
            "identity": "alice",
            "credential": "StrongP@ss1"
        })
    ),
    responses(
        (status = 200, description = "Authentication successful", body = LoginResponse),
        (status = 401, description = "Unknown identity or wrong credential; the two are indistinguishable",
            body = crate::error::ErrorBody,
            example = json!({ "kind": "invalid_credentials", "message": "invalid credentials" })
        ),
        (status = 423, description = "Identity locked out after repeated failures",
            body = crate::error::ErrorBody,
            example = json!({
                "kind": "locked",
                "message": "too many failed attempts, try again later",
                "unlocks_at": "2025-01-15T10:45:00Z"
            })
        ),
        (status = 403, description = "Account deactivated by an administrator", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(server): State<DiagcareServer>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    request.validate()?;

    let login = server
        .auth
        .login(&request.identity, &request.credential, client_info(&headers))
        .await?;

    Ok(Json(api_success(LoginResponse {
        session_id: login.session.session_id,
        expires_at: login.session.expires_at,
        user: login.user.into(),
    })))
}

/// User logout handler; idempotent
#[utoipa::path(
    post,
    path = crate::routes::paths::docs::AUTH_LOGOUT,
    tag = "authentication",
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Session revoked (or was already gone)")
    )
)]
pub async fn logout(
    State(server): State<DiagcareServer>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    server.auth.logout(request.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permission check for the calling session
#[utoipa::path(
    get,
    path = crate::routes::paths::docs::AUTH_PERMISSION,
    tag = "authentication",
    params(
        ("module" = String, Query, description = "Module name"),
        ("action" = String, Query, description = "Action name")
    ),
    responses(
        (status = 200, description = "Evaluation result", body = PermissionResponse),
        (status = 401, description = "Missing, expired or malformed session", body = crate::error::ErrorBody)
    )
)]
pub async fn check_permission(
    State(server): State<DiagcareServer>,
    headers: HeaderMap,
    Query(query): Query<PermissionQuery>,
) -> Result<Json<ApiResponse<PermissionResponse>>, ApiError> {
    let session_id = session_id_from_headers(&headers)?;
    let action = Action::from_str(&query.action).map_err(ApiError::validation)?;

    let allowed = server
        .auth
        .check_permission(session_id, &query.module, action)
        .await?;

    Ok(Json(api_success(PermissionResponse { allowed })))
}

/// Live sessions held by the calling user
#[utoipa::path(
    get,
    path = crate::routes::paths::docs::AUTH_SESSIONS,
    tag = "authentication",
    responses(
        (status = 200, description = "Active sessions, oldest activity first", body = [SessionView]),
        (status = 401, description = "Missing, expired or malformed session", body = crate::error::ErrorBody)
    )
)]
pub async fn list_sessions(
    State(server): State<DiagcareServer>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<SessionView>>>, ApiError> {
    let session_id = session_id_from_headers(&headers)?;
    let user = server.auth.validate_session(session_id).await?;

    let sessions = server
        .auth
        .sessions()
        .sessions_for_user(user.id, Utc::now())
        .await?;

    Ok(Json(api_success(
        sessions.into_iter().map(SessionView::from).collect(),
    )))
}

/// Audit trail query
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttemptQuery {
    /// The login handle the attempts were submitted under
    pub identity: String,
}

/// A recorded login attempt
#[derive(Debug, Serialize, ToSchema)]
pub struct AttemptView {
    pub identity: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub source_address: Option<String>,
    pub client_agent: Option<String>,
}

impl From<LoginAttempt> for AttemptView {
    fn from(attempt: LoginAttempt) -> Self {
        Self {
            identity: attempt.identity,
            timestamp: attempt.timestamp,
            success: attempt.success,
            source_address: attempt.source_address,
            client_agent: attempt.client_agent,
        }
    }
}

/// Login attempt audit trail for one identity
#[utoipa::path(
    get,
    path = crate::routes::paths::docs::AUTH_ATTEMPTS,
    tag = "authentication",
    params(("identity" = String, Query, description = "Login handle to look up")),
    responses(
        (status = 200, description = "Recorded attempts, oldest first", body = [AttemptView]),
        (status = 401, description = "Missing, expired or malformed session", body = crate::error::ErrorBody)
    )
)]
pub async fn list_login_attempts(
    State(server): State<DiagcareServer>,
    headers: HeaderMap,
    Query(query): Query<AttemptQuery>,
) -> Result<Json<ApiResponse<Vec<AttemptView>>>, ApiError> {
    let session_id = session_id_from_headers(&headers)?;
    server.auth.validate_session(session_id).await?;

    let attempts = server.auth.login_attempts(&query.identity).await?;
    Ok(Json(api_success(
        attempts.into_iter().map(AttemptView::from).collect(),
    )))
}
