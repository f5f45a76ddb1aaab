use crate::server::DiagcareServer;
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,

        // Authentication endpoints
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::check_permission,
        crate::handlers::auth::list_sessions,
        crate::handlers::auth::list_login_attempts,

        // User management endpoints
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::deactivate_user,
        crate::handlers::users::reactivate_user,
        crate::handlers::users::delete_user,

        // Configuration endpoints
        crate::handlers::security_config::get_security_config,
        crate::handlers::security_config::put_security_config,
    ),
    components(
        schemas(
            // Health schemas
            crate::handlers::health::HealthResponse,

            // Authentication schemas
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::LogoutRequest,
            crate::handlers::auth::SessionView,
            crate::handlers::auth::PermissionQuery,
            crate::handlers::auth::PermissionResponse,
            crate::handlers::auth::AttemptQuery,
            crate::handlers::auth::AttemptView,

            // User schemas
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::users::UserView,
            crate::handlers::users::GrantView,

            // Configuration schemas
            crate::handlers::security_config::SecurityConfigView,

            // Error schema
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "System health endpoints"),
        (name = "authentication", description = "Login, logout, sessions and permission checks"),
        (name = "users", description = "User accounts, roles and capability grants"),
        (name = "config", description = "Runtime security policy"),
    ),
    info(
        title = "DiagCare Engine API",
        version = "0.1.0",
        description = "Authentication, session and role-based access control API for the DiagCare diagnostic platform.",
        contact(
            name = "DiagCare Team",
            email = "api@diagcare.dev",
            url = "https://diagcare.dev"
        ),
    ),
    servers(
        (url = "http://localhost:8081", description = "Local development server"),
        (url = "https://api.diagcare.dev", description = "Production server"),
    ),
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes
pub fn create_docs_routes() -> Router<DiagcareServer> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
