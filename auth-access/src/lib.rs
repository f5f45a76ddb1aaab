//! Authentication, session and role-based access control core for DiagCare Engine
//!
//! This module provides the security core shared by every DiagCare service:
//! - User registration and credential lifecycle
//! - Login with rolling-window lockout tracking
//! - Sliding-expiry session management
//! - Permission evaluation against per-user capability grants
//! - Password policy validation
//!
//! The core owns no storage engine: backends implement the repository traits
//! in [`repository`], and credential hashing is delegated to a
//! [`password::CredentialHasher`] supplied by the composition root.
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_access::{AuthService, ClientInfo, NewUser, Role};
//!
//! # async fn example(service: AuthService) -> Result<(), auth_access::AuthError> {
//! let user = service
//!     .register_user(NewUser::new("alice", "alice@example.com", "Alice", "StrongP@ss1", Role::Technician))
//!     .await?;
//!
//! let login = service.login("alice", "StrongP@ss1", ClientInfo::default()).await?;
//! println!("session {} expires {}", login.session.session_id, login.session.expires_at);
//! # Ok(())
//! # }
//! ```

pub mod attempts;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod permissions;
pub mod repository;
pub mod service;
pub mod sessions;

pub use config::*;
pub use error::*;
pub use models::*;
pub use password::{validate_password, CredentialHasher, PolicyViolation};
pub use permissions::{default_grants, has_permission, WILDCARD_MODULE};
pub use service::*;
