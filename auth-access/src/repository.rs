//! Storage contracts for the security core and their in-memory backends.
//!
//! The core owns no storage engine; any durable store can sit behind these
//! traits. The in-memory implementations back tests, development and the
//! default server wiring.

use crate::error::{AuthError, IdentityField, Result};
use crate::models::{normalize_identity, LoginAttempt, Session, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. The normalized-uniqueness check and the insertion
    /// must be atomic: two concurrent creates for the same identity must
    /// never both succeed.
    async fn create(&self, user: User) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Case-insensitive, trimmed match against usernames first, falling
    /// back to emails.
    async fn find_by_login_identity(&self, identity: &str) -> Result<Option<User>>;

    /// Replace a user record. Login identities are immutable; only the
    /// mutable fields of `user` are honored.
    async fn update(&self, user: User) -> Result<User>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<User>;

    async fn list(&self) -> Result<Vec<User>>;

    /// Remove a user from the active registry. Historical login attempts
    /// keyed by identity string are not purged.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: Session) -> Result<()>;
    async fn find(&self, session_id: Uuid) -> Result<Option<Session>>;
    /// Last-writer-wins on concurrent updates of the same session.
    async fn update(&self, session: Session) -> Result<()>;
    async fn remove(&self, session_id: Uuid) -> Result<()>;
    async fn remove_for_user(&self, user_id: Uuid) -> Result<u64>;
    async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<Session>>;
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Append-only audit trail of login attempts, indexed by identity.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync {
    async fn append(&self, attempt: LoginAttempt) -> Result<()>;
    async fn for_identity(&self, identity: &str) -> Result<Vec<LoginAttempt>>;
}

#[derive(Default)]
struct RegistryInner {
    users: HashMap<Uuid, User>,
    by_username: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
}

/// In-memory user registry.
///
/// A single `RwLock` over the record map and both identity indexes makes
/// the create-time uniqueness check and insertion one critical section.
#[derive(Default)]
pub struct InMemoryUserRegistry {
    inner: RwLock<RegistryInner>,
}

impl InMemoryUserRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRegistry {
    async fn create(&self, user: User) -> Result<User> {
        let mut inner = self.inner.write();

        if inner.by_username.contains_key(&user.username) {
            return Err(AuthError::DuplicateIdentity {
                field: IdentityField::Username,
            });
        }
        if inner.by_email.contains_key(&user.email) {
            return Err(AuthError::DuplicateIdentity {
                field: IdentityField::Email,
            });
        }

        inner.by_username.insert(user.username.clone(), user.id);
        inner.by_email.insert(user.email.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    async fn find_by_login_identity(&self, identity: &str) -> Result<Option<User>> {
        let key = normalize_identity(identity);
        let inner = self.inner.read();
        let id = inner
            .by_username
            .get(&key)
            .or_else(|| inner.by_email.get(&key));
        Ok(id.and_then(|id| inner.users.get(id)).cloned())
    }

    async fn update(&self, user: User) -> Result<User> {
        let mut inner = self.inner.write();
        if !inner.users.contains_key(&user.id) {
            return Err(AuthError::NotFound);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<User> {
        let mut inner = self.inner.write();
        let user = inner.users.get_mut(&id).ok_or(AuthError::NotFound)?;
        user.last_login_at = Some(at);
        Ok(user.clone())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().users.values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(user) = inner.users.remove(&id) {
            inner.by_username.remove(&user.username);
            inner.by_email.remove(&user.email);
        }
        Ok(())
    }
}

/// In-memory session table. Entries are independent per session, so a
/// concurrent map with per-key locking is all the coordination needed.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn insert(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.session_id, session);
        Ok(())
    }

    async fn find(&self, session_id: Uuid) -> Result<Option<Session>> {
        Ok(self.sessions.get(&session_id).map(|entry| entry.clone()))
    }

    async fn update(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.session_id, session);
        Ok(())
    }

    async fn remove(&self, session_id: Uuid) -> Result<()> {
        self.sessions.remove(&session_id);
        Ok(())
    }

    async fn remove_for_user(&self, user_id: Uuid) -> Result<u64> {
        let before = self.sessions.len() as u64;
        self.sessions.retain(|_, session| session.user_id != user_id);
        Ok(before.saturating_sub(self.sessions.len() as u64))
    }

    async fn find_for_user(&self, user_id: Uuid) -> Result<Vec<Session>> {
        Ok(self
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let before = self.sessions.len() as u64;
        self.sessions.retain(|_, session| now < session.expires_at);
        Ok(before.saturating_sub(self.sessions.len() as u64))
    }
}

/// In-memory append-only attempt log.
#[derive(Default)]
pub struct InMemoryAttemptLog {
    attempts: DashMap<String, Vec<LoginAttempt>>,
}

impl InMemoryAttemptLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoginAttemptRepository for InMemoryAttemptLog {
    async fn append(&self, attempt: LoginAttempt) -> Result<()> {
        self.attempts
            .entry(attempt.identity.clone())
            .or_default()
            .push(attempt);
        Ok(())
    }

    async fn for_identity(&self, identity: &str) -> Result<Vec<LoginAttempt>> {
        let key = normalize_identity(identity);
        Ok(self
            .attempts
            .get(&key)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}
