use crate::error::{api_success, ApiError, ApiResponse};
use crate::notify::spawn_user_created_notifications;
use crate::server::DiagcareServer;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_field, validate_length, validate_required};
use auth_access::{Action, NewUser, PermissionGrant, Role, User, UserPatch};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// A capability grant as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrantView {
    /// Module name, or "all" for the wildcard grant
    #[schema(example = "reports")]
    pub module: String,
    /// Granted actions
    #[schema(example = json!(["view", "create"]))]
    pub actions: Vec<String>,
}

impl GrantView {
    fn into_grant(self) -> Result<PermissionGrant, ApiError> {
        let actions = self
            .actions
            .iter()
            .map(|raw| Action::from_str(raw).map_err(ApiError::validation))
            .collect::<Result<_, _>>()?;
        Ok(PermissionGrant {
            module: self.module,
            actions,
        })
    }
}

impl From<&PermissionGrant> for GrantView {
    fn from(grant: &PermissionGrant) -> Self {
        let mut actions: Vec<String> = grant.actions.iter().map(ToString::to_string).collect();
        actions.sort();
        Self {
            module: grant.module.clone(),
            actions,
        }
    }
}

/// Public projection of a user record. Never carries credential material.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@diagcare.dev")]
    pub email: String,
    pub name: String,
    #[schema(example = "technician")]
    pub role: String,
    pub permissions: Vec<GrantView>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub tenant_id: Option<Uuid>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
            permissions: user.permissions.iter().map(GrantView::from).collect(),
            is_active: user.is_active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
            tenant_id: user.tenant_id,
        }
    }
}

/// User creation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@diagcare.dev")]
    pub email: String,
    #[schema(example = "Alice Moreno")]
    pub name: String,
    /// Raw candidate password, checked against the security policy
    #[schema(example = "StrongP@ss1")]
    pub password: String,
    #[schema(example = "technician")]
    pub role: String,
    /// Explicit grants; the role's defaults apply when omitted
    pub permissions: Option<Vec<GrantView>>,
    /// Collection center scope
    pub tenant_id: Option<Uuid>,
}

impl RequestValidation for CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.username, "Username is required");
        validate_length!(
            self.username,
            2,
            100,
            "Username must be between 2 and 100 characters"
        );
        validate_required!(self.email, "Email is required");
        validate_email!(self.email, "Invalid email format");
        validate_required!(self.name, "Name is required");
        validate_required!(self.password, "Password is required");
        validate_required!(self.role, "Role is required");
        Ok(())
    }
}

/// User update request; absent fields are left untouched
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<GrantView>>,
    /// New raw password; triggers policy validation and revokes the
    /// user's existing sessions
    pub password: Option<String>,
}

/// Create a user account
///
/// Welcome (and, for privileged roles, security-alert) notifications go
/// out after the response is committed and never affect the outcome.
#[utoipa::path(
    post,
    path = crate::routes::paths::docs::USERS,
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 409, description = "Username or email already in use", body = crate::error::ErrorBody),
        (status = 422, description = "Password fails the security policy", body = crate::error::ErrorBody)
    )
)]
pub async fn create_user(
    State(server): State<DiagcareServer>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    request.validate()?;

    let role = Role::from_str(&request.role).map_err(ApiError::validation)?;
    let permissions = request
        .permissions
        .map(|grants| {
            grants
                .into_iter()
                .map(GrantView::into_grant)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let user = server
        .auth
        .register_user(NewUser {
            username: request.username,
            email: request.email,
            name: request.name,
            password: request.password,
            role,
            permissions,
            tenant_id: request.tenant_id,
        })
        .await?;

    spawn_user_created_notifications(server.notifier.clone(), user.clone());

    Ok((StatusCode::CREATED, Json(api_success(user.into()))))
}

/// List all user accounts
#[utoipa::path(
    get,
    path = crate::routes::paths::docs::USERS,
    tag = "users",
    responses(
        (status = 200, description = "All users", body = [UserView])
    )
)]
pub async fn list_users(
    State(server): State<DiagcareServer>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    let mut users = server.auth.list_users().await?;
    users.sort_by_key(|user| user.created_at);
    Ok(Json(api_success(users.into_iter().map(UserView::from).collect())))
}

/// Fetch one user by id
#[utoipa::path(
    get,
    path = crate::routes::paths::docs::USER_BY_ID,
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserView),
        (status = 404, description = "No such user", body = crate::error::ErrorBody)
    )
)]
pub async fn get_user(
    State(server): State<DiagcareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = server.auth.get_user(id).await?;
    Ok(Json(api_success(user.into())))
}

/// Apply a partial update to a user
#[utoipa::path(
    put,
    path = crate::routes::paths::docs::USER_BY_ID,
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserView),
        (status = 404, description = "No such user", body = crate::error::ErrorBody),
        (status = 422, description = "New password fails the security policy", body = crate::error::ErrorBody)
    )
)]
pub async fn update_user(
    State(server): State<DiagcareServer>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let role = request
        .role
        .as_deref()
        .map(Role::from_str)
        .transpose()
        .map_err(ApiError::validation)?;
    let permissions = request
        .permissions
        .map(|grants| {
            grants
                .into_iter()
                .map(GrantView::into_grant)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let user = server
        .auth
        .update_user(
            id,
            UserPatch {
                name: request.name,
                role,
                permissions,
                password: request.password,
            },
        )
        .await?;

    Ok(Json(api_success(user.into())))
}

/// Deactivate an account. Permissions and credentials are untouched; the
/// user simply can no longer authenticate.
#[utoipa::path(
    post,
    path = crate::routes::paths::docs::USER_DEACTIVATE,
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Deactivated user", body = UserView),
        (status = 404, description = "No such user", body = crate::error::ErrorBody)
    )
)]
pub async fn deactivate_user(
    State(server): State<DiagcareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = server.auth.deactivate_user(id).await?;
    Ok(Json(api_success(user.into())))
}

/// Reactivate a previously deactivated account
#[utoipa::path(
    post,
    path = crate::routes::paths::docs::USER_REACTIVATE,
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Reactivated user", body = UserView),
        (status = 404, description = "No such user", body = crate::error::ErrorBody)
    )
)]
pub async fn reactivate_user(
    State(server): State<DiagcareServer>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = server.auth.reactivate_user(id).await?;
    Ok(Json(api_success(user.into())))
}

/// Remove a user from the active registry
///
/// Historical login attempts stay in the audit trail; only the account
/// record itself is removed.
#[utoipa::path(
    delete,
    path = crate::routes::paths::docs::USER_BY_ID,
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User removed")
    )
)]
pub async fn delete_user(
    State(server): State<DiagcareServer>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    server.auth.sessions().revoke_all_for_user(id).await?;
    server.auth.delete_user(id).await?;
    info!(user_id = %id, "user removed from registry");
    Ok(StatusCode::NO_CONTENT)
}
