//! Outbound notification boundary.
//!
//! User creation succeeds or fails on its own; welcome and security-alert
//! delivery happens afterwards, off the request path, and a delivery
//! failure is only ever logged.

use async_trait::async_trait;
use auth_access::User;
use std::sync::Arc;
use tracing::{info, warn};

/// Collaborator for post-creation notifications. A production deployment
/// backs this with the mail gateway; the default implementation just logs.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_welcome(&self, user: &User) -> anyhow::Result<()>;

    /// Sent when a privileged (admin/dev) account is created.
    async fn send_security_alert(&self, user: &User) -> anyhow::Result<()>;
}

/// Tracing-backed notifier for development and tests.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, user: &User) -> anyhow::Result<()> {
        info!(user_id = %user.id, email = %user.email, "welcome notification queued");
        Ok(())
    }

    async fn send_security_alert(&self, user: &User) -> anyhow::Result<()> {
        info!(user_id = %user.id, role = %user.role, "security alert queued for privileged account");
        Ok(())
    }
}

/// Fire-and-forget notification fan-out after a successful create.
pub fn spawn_user_created_notifications(notifier: Arc<dyn Notifier>, user: User) {
    tokio::spawn(async move {
        if let Err(err) = notifier.send_welcome(&user).await {
            warn!(user_id = %user.id, %err, "welcome notification failed");
        }
        if user.role.is_privileged() {
            if let Err(err) = notifier.send_security_alert(&user).await {
                warn!(user_id = %user.id, %err, "security alert notification failed");
            }
        }
    });
}
