//! DiagCare Server - authentication, session and access-control API
//!
//! This library provides the HTTP boundary over the `auth-access` security
//! core: login and logout, permission checks, user administration and the
//! runtime security policy.

pub mod error;
pub mod handlers;
pub mod hasher;
pub mod notify;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod validation;

// Re-export commonly used types
pub use error::*;
pub use server::{DiagcareServer, ServerConfig};

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Permissive CORS for the web clients; tightened per deployment.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Create the main application router with all routes and middleware
pub fn create_app(server: DiagcareServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
        .with_state(server)
}
