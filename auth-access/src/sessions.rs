//! Sliding-expiry session management.
//!
//! Expiry is recomputed from the most recent activity, matching the
//! platform's last-activity model: every authorized request extends the
//! session, and an idle session dies after the configured timeout.

use crate::config::SecurityConfig;
use crate::error::{AuthError, Result};
use crate::models::Session;
use crate::repository::SessionRepository;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Security configuration shared between the service and its components.
pub type SharedSecurityConfig = Arc<RwLock<SecurityConfig>>;

/// Tracks session activity and expiry over a [`SessionRepository`].
///
/// Independent of the authenticator after issuance: any holder of a session
/// id can touch, validate or revoke it.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionRepository>,
    config: SharedSecurityConfig,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionRepository>, config: SharedSecurityConfig) -> Self {
        Self { store, config }
    }

    fn timeout(&self) -> Duration {
        Duration::minutes(self.config.read().session_timeout_minutes)
    }

    /// Create a session for a user. A user may hold several concurrent
    /// sessions; nothing here restricts that.
    pub async fn issue(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Session> {
        let session = Session {
            session_id: Uuid::new_v4(),
            user_id,
            issued_at: now,
            last_activity_at: now,
            expires_at: now + self.timeout(),
        };
        self.store.insert(session.clone()).await?;
        debug!(session_id = %session.session_id, user_id = %user_id, "session issued");
        Ok(session)
    }

    /// Record activity on a session, sliding its expiry forward. An already
    /// expired session is removed and reported as [`AuthError::SessionExpired`].
    pub async fn touch(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<Session> {
        let mut session = self
            .store
            .find(session_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if now >= session.expires_at {
            self.store.remove(session_id).await?;
            return Err(AuthError::SessionExpired);
        }

        session.last_activity_at = now;
        session.expires_at = now + self.timeout();
        self.store.update(session.clone()).await?;
        Ok(session)
    }

    pub async fn is_valid(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        Ok(self
            .store
            .find(session_id)
            .await?
            .is_some_and(|session| now < session.expires_at))
    }

    /// Explicit logout. Idempotent: revoking an unknown or already revoked
    /// session succeeds.
    pub async fn revoke(&self, session_id: Uuid) -> Result<()> {
        self.store.remove(session_id).await?;
        debug!(session_id = %session_id, "session revoked");
        Ok(())
    }

    /// Revoke every session a user holds, e.g. after a credential change.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64> {
        let removed = self.store.remove_for_user(user_id).await?;
        if removed > 0 {
            info!(user_id = %user_id, removed, "revoked all sessions for user");
        }
        Ok(removed)
    }

    /// Live (unexpired) sessions for a user.
    pub async fn sessions_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Session>> {
        let mut sessions = self.store.find_for_user(user_id).await?;
        sessions.retain(|session| now < session.expires_at);
        sessions.sort_by_key(|session| session.last_activity_at);
        Ok(sessions)
    }

    /// Remove expired rows; driven by the server's background reaper.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        self.store.remove_expired(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemorySessionStore;

    fn manager() -> SessionManager {
        let config = Arc::new(RwLock::new(SecurityConfig::default()));
        SessionManager::new(Arc::new(InMemorySessionStore::new()), config)
    }

    #[tokio::test]
    async fn issue_sets_sliding_expiry_from_now() {
        let manager = manager();
        let now = Utc::now();

        let session = manager.issue(Uuid::new_v4(), now).await.unwrap();
        assert_eq!(session.expires_at, now + Duration::minutes(30));
        assert!(manager.is_valid(session.session_id, now).await.unwrap());
    }

    #[tokio::test]
    async fn touch_extends_expiry() {
        let manager = manager();
        let now = Utc::now();
        let session = manager.issue(Uuid::new_v4(), now).await.unwrap();

        let later = now + Duration::minutes(20);
        let touched = manager.touch(session.session_id, later).await.unwrap();
        assert_eq!(touched.expires_at, later + Duration::minutes(30));
        assert_eq!(touched.last_activity_at, later);
    }

    #[tokio::test]
    async fn touch_after_expiry_fails_and_removes() {
        let manager = manager();
        let now = Utc::now();
        let session = manager.issue(Uuid::new_v4(), now).await.unwrap();

        let late = now + Duration::minutes(31);
        let err = manager.touch(session.session_id, late).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionExpired));

        // the expired session is gone; a second touch reports not-found
        let err = manager.touch(session.session_id, late).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let manager = manager();
        let now = Utc::now();
        let session = manager.issue(Uuid::new_v4(), now).await.unwrap();

        manager.revoke(session.session_id).await.unwrap();
        manager.revoke(session.session_id).await.unwrap();
        assert!(!manager.is_valid(session.session_id, now).await.unwrap());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let manager = manager();
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let stale = manager.issue(user_id, now - Duration::minutes(45)).await.unwrap();
        let live = manager.issue(user_id, now).await.unwrap();

        let removed = manager.purge_expired(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!manager.is_valid(stale.session_id, now).await.unwrap());
        assert!(manager.is_valid(live.session_id, now).await.unwrap());
    }
}
