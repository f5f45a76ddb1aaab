use crate::attempts::AttemptTracker;
use crate::config::SecurityConfig;
use crate::error::{AuthError, Result};
use crate::models::{
    normalize_identity, Action, ClientInfo, LoginAttempt, LoginSuccess, NewUser, User, UserPatch,
};
use crate::password::{validate_password, CredentialHasher};
use crate::permissions::{default_grants, has_permission};
use crate::repository::{LoginAttemptRepository, SessionRepository, UserRepository};
use crate::sessions::{SessionManager, SharedSecurityConfig};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// The security service: credential lifecycle, login orchestration, session
/// validation and permission checks.
///
/// Explicitly constructed and injected wherever it is needed; holding its
/// own state makes isolated tests and multiple in-process configurations
/// possible.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    attempt_log: Arc<dyn LoginAttemptRepository>,
    tracker: AttemptTracker,
    sessions: SessionManager,
    hasher: Arc<dyn CredentialHasher>,
    config: SharedSecurityConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        session_store: Arc<dyn SessionRepository>,
        attempt_log: Arc<dyn LoginAttemptRepository>,
        hasher: Arc<dyn CredentialHasher>,
        config: SecurityConfig,
    ) -> Self {
        let config: SharedSecurityConfig = Arc::new(RwLock::new(config));
        Self {
            users,
            attempt_log,
            tracker: AttemptTracker::new(),
            sessions: SessionManager::new(session_store, Arc::clone(&config)),
            hasher,
            config,
        }
    }

    /// Snapshot of the current security configuration.
    pub fn config(&self) -> SecurityConfig {
        self.config.read().clone()
    }

    /// Replace the security configuration. The new value is validated
    /// first; on failure the previous configuration stays in force.
    pub fn update_config(&self, new: SecurityConfig) -> Result<()> {
        new.validate()?;
        *self.config.write() = new;
        info!("security configuration updated");
        Ok(())
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Create a user. Identities are normalized before the uniqueness
    /// check; the password is policy-checked and hashed before storage;
    /// the role's default grants apply unless explicit grants are given.
    ///
    /// Welcome or alert notifications are the caller's responsibility,
    /// after this returns; creation never depends on their delivery.
    pub async fn register_user(&self, new: NewUser) -> Result<User> {
        let policy = self.config();
        if let Err(violations) = validate_password(&new.password, &policy) {
            return Err(AuthError::WeakCredential(violations));
        }

        let verifier = self.hasher.hash(&new.password)?;
        let user = User {
            id: Uuid::new_v4(),
            username: normalize_identity(&new.username),
            email: normalize_identity(&new.email),
            name: new.name.trim().to_string(),
            credential_verifier: verifier,
            role: new.role,
            permissions: new
                .permissions
                .unwrap_or_else(|| default_grants(new.role)),
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
            tenant_id: new.tenant_id,
        };

        let user = self.users.create(user).await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, "user created");
        Ok(user)
    }

    /// Partial update. Password strength is only re-checked when the patch
    /// carries a credential change; a credential change also revokes every
    /// session the user holds.
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User> {
        let mut user = self.users.find_by_id(id).await?.ok_or(AuthError::NotFound)?;

        if let Some(name) = patch.name {
            user.name = name.trim().to_string();
        }
        if let Some(role) = patch.role {
            user.role = role;
            if patch.permissions.is_none() {
                user.permissions = default_grants(role);
            }
        }
        if let Some(permissions) = patch.permissions {
            user.permissions = permissions;
        }

        let mut credential_changed = false;
        if let Some(password) = patch.password {
            let policy = self.config();
            if let Err(violations) = validate_password(&password, &policy) {
                return Err(AuthError::WeakCredential(violations));
            }
            user.credential_verifier = self.hasher.hash(&password)?;
            credential_changed = true;
        }

        let user = self.users.update(user).await?;
        if credential_changed {
            self.sessions.revoke_all_for_user(user.id).await?;
        }
        Ok(user)
    }

    /// Toggle `is_active` off. Permissions and credentials are untouched.
    pub async fn deactivate_user(&self, id: Uuid) -> Result<User> {
        self.set_active(id, false).await
    }

    /// Toggle `is_active` back on.
    pub async fn reactivate_user(&self, id: Uuid) -> Result<User> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<User> {
        let mut user = self.users.find_by_id(id).await?.ok_or(AuthError::NotFound)?;
        user.is_active = active;
        let user = self.users.update(user).await?;
        info!(user_id = %user.id, active, "account active state changed");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users.find_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list().await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.users.delete(id).await
    }

    /// Authenticate with the current wall clock.
    pub async fn login(
        &self,
        identity: &str,
        credential: &str,
        client: ClientInfo,
    ) -> Result<LoginSuccess> {
        self.login_at(identity, credential, client, Utc::now()).await
    }

    /// Authenticate at an explicit instant.
    ///
    /// The order is deliberate: the lockout check comes before any
    /// credential work so a locked-out caller learns nothing about
    /// credential correctness, and an unknown identity fails exactly like
    /// a wrong password. The per-identity window lock is held across the
    /// whole sequence, serializing concurrent attempts for one identity.
    pub async fn login_at(
        &self,
        identity: &str,
        credential: &str,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> Result<LoginSuccess> {
        let identity_key = normalize_identity(identity);
        let mut window = self.tracker.acquire(&identity_key).await;
        let policy = self.config();

        if let Some(unlocks_at) = window.is_locked(now, &policy) {
            warn!(identity = %identity_key, %unlocks_at, "login rejected: identity locked out");
            return Err(AuthError::AccountLocked { unlocks_at });
        }

        let resolved = self.users.find_by_login_identity(&identity_key).await?;
        let matched = match resolved {
            Some(user) if self.hasher.verify(credential, &user.credential_verifier)? => Some(user),
            _ => None,
        };

        // unknown identity and wrong secret take the same path out
        let Some(user) = matched else {
            window.record(&identity_key, false, now, &policy);
            self.audit_attempt(&identity_key, false, &client, now, &policy);
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            info!(user_id = %user.id, "login rejected: account inactive");
            return Err(AuthError::AccountInactive);
        }

        window.record(&identity_key, true, now, &policy);
        self.audit_attempt(&identity_key, true, &client, now, &policy);
        drop(window);

        let user = self.users.record_login(user.id, now).await?;
        let session = self.sessions.issue(user.id, now).await?;
        info!(user_id = %user.id, session_id = %session.session_id, "login succeeded");

        Ok(LoginSuccess { session, user })
    }

    /// Explicit logout; idempotent.
    pub async fn logout(&self, session_id: Uuid) -> Result<()> {
        self.sessions.revoke(session_id).await
    }

    /// Resolve a live session to its user, sliding the expiry forward.
    /// A deactivated user invalidates the session on the spot.
    pub async fn validate_session(&self, session_id: Uuid) -> Result<User> {
        self.validate_session_at(session_id, Utc::now()).await
    }

    pub async fn validate_session_at(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<User> {
        let session = self.sessions.touch(session_id, now).await?;
        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !user.is_active {
            self.sessions.revoke(session_id).await?;
            return Err(AuthError::AccountInactive);
        }

        Ok(user)
    }

    /// Permission check for the holder of a live session.
    pub async fn check_permission(
        &self,
        session_id: Uuid,
        module: &str,
        action: Action,
    ) -> Result<bool> {
        let user = self.validate_session(session_id).await?;
        Ok(has_permission(&user, module, action))
    }

    /// Audit trail of attempts for one identity.
    pub async fn login_attempts(&self, identity: &str) -> Result<Vec<LoginAttempt>> {
        self.attempt_log.for_identity(identity).await
    }

    /// Drop idle attempt windows; driven by the server's background reaper
    /// alongside session purging.
    pub fn purge_idle_attempts(&self, now: DateTime<Utc>) {
        self.tracker.purge_idle(now);
    }

    /// Append to the audit trail without blocking the login path.
    fn audit_attempt(
        &self,
        identity: &str,
        success: bool,
        client: &ClientInfo,
        now: DateTime<Utc>,
        policy: &SecurityConfig,
    ) {
        if !policy.audit_log_enabled {
            return;
        }
        let attempt = LoginAttempt {
            identity: identity.to_string(),
            timestamp: now,
            success,
            source_address: client.source_address.clone(),
            client_agent: client.client_agent.clone(),
        };
        let log = Arc::clone(&self.attempt_log);
        tokio::spawn(async move {
            if let Err(err) = log.append(attempt).await {
                warn!(%err, "failed to append login attempt to audit log");
            }
        });
    }
}
