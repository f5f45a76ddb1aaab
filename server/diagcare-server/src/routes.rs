use crate::{
    handlers::{auth, health, security_config, users},
    openapi,
    server::DiagcareServer,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Route path constants. The nested modules hold router-relative paths;
/// [`paths::docs`] holds the full paths the OpenAPI annotations use.
pub mod paths {
    pub const API_V1: &str = "/api/v1";

    pub mod health {
        pub const HEALTH: &str = "/health";
    }

    pub mod auth {
        pub const LOGIN: &str = "/login";
        pub const LOGOUT: &str = "/logout";
        pub const PERMISSION: &str = "/permission";
        pub const SESSIONS: &str = "/sessions";
        pub const ATTEMPTS: &str = "/attempts";
    }

    pub mod users {
        pub const USERS: &str = "/users";
        pub const USER_BY_ID: &str = "/users/:id";
        pub const USER_DEACTIVATE: &str = "/users/:id/deactivate";
        pub const USER_REACTIVATE: &str = "/users/:id/reactivate";
    }

    pub mod config {
        pub const SECURITY: &str = "/config/security";
    }

    /// Full request paths for OpenAPI documentation.
    pub mod docs {
        pub const HEALTH: &str = "/health";
        pub const AUTH_LOGIN: &str = "/api/v1/auth/login";
        pub const AUTH_LOGOUT: &str = "/api/v1/auth/logout";
        pub const AUTH_PERMISSION: &str = "/api/v1/auth/permission";
        pub const AUTH_SESSIONS: &str = "/api/v1/auth/sessions";
        pub const AUTH_ATTEMPTS: &str = "/api/v1/auth/attempts";
        pub const USERS: &str = "/api/v1/users";
        pub const USER_BY_ID: &str = "/api/v1/users/{id}";
        pub const USER_DEACTIVATE: &str = "/api/v1/users/{id}/deactivate";
        pub const USER_REACTIVATE: &str = "/api/v1/users/{id}/reactivate";
        pub const CONFIG_SECURITY: &str = "/api/v1/config/security";
    }
}

/// Create health check routes
pub fn health_routes() -> Router<DiagcareServer> {
    Router::new().route(paths::health::HEALTH, get(health::health_check))
}

/// Create authentication routes
pub fn auth_routes() -> Router<DiagcareServer> {
    Router::new()
        .route(paths::auth::LOGIN, post(auth::login))
        .route(paths::auth::LOGOUT, post(auth::logout))
        .route(paths::auth::PERMISSION, get(auth::check_permission))
        .route(paths::auth::SESSIONS, get(auth::list_sessions))
        .route(paths::auth::ATTEMPTS, get(auth::list_login_attempts))
}

/// Create user management routes
pub fn user_routes() -> Router<DiagcareServer> {
    Router::new()
        .route(paths::users::USERS, get(users::list_users))
        .route(paths::users::USERS, post(users::create_user))
        .route(paths::users::USER_BY_ID, get(users::get_user))
        .route(paths::users::USER_BY_ID, put(users::update_user))
        .route(paths::users::USER_BY_ID, delete(users::delete_user))
        .route(paths::users::USER_DEACTIVATE, post(users::deactivate_user))
        .route(paths::users::USER_REACTIVATE, post(users::reactivate_user))
}

/// Create security configuration routes
pub fn config_routes() -> Router<DiagcareServer> {
    Router::new()
        .route(paths::config::SECURITY, get(security_config::get_security_config))
        .route(paths::config::SECURITY, put(security_config::put_security_config))
}

/// Create API v1 routes
pub fn api_v1_routes() -> Router<DiagcareServer> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(user_routes())
        .merge(config_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<DiagcareServer> {
    Router::new()
        // Health check routes (no authentication required)
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        // API v1 routes
        .nest(paths::API_V1, api_v1_routes())
}
