//! End-to-end tests for the security core: registration, lockout, sessions
//! and permission evaluation wired through in-memory backends.

use auth_access::repository::{InMemoryAttemptLog, InMemorySessionStore, InMemoryUserRegistry};
use auth_access::{
    Action, AuthError, AuthService, ClientInfo, CredentialHasher, NewUser, PermissionGrant, Role,
    SecurityConfig, UserPatch, WILDCARD_MODULE,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Transparent stand-in for the production hashing collaborator.
struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, candidate: &str) -> auth_access::Result<String> {
        Ok(format!("plain${candidate}"))
    }

    fn verify(&self, candidate: &str, verifier: &str) -> auth_access::Result<bool> {
        Ok(verifier
            .strip_prefix("plain$")
            .is_some_and(|stored| stored == candidate))
    }
}

fn service() -> AuthService {
    service_with_config(SecurityConfig::default())
}

fn service_with_config(config: SecurityConfig) -> AuthService {
    AuthService::new(
        Arc::new(InMemoryUserRegistry::new()),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(InMemoryAttemptLog::new()),
        Arc::new(PlainHasher),
        config,
    )
}

fn alice() -> NewUser {
    NewUser::new("alice", "alice@example.com", "Alice", "StrongP@ss1", Role::Technician)
}

#[tokio::test]
async fn create_assigns_default_grants_from_role() {
    let service = service();

    let user = service.register_user(alice()).await.unwrap();
    assert_eq!(user.role, Role::Technician);
    assert_eq!(user.permissions, auth_access::default_grants(Role::Technician));
    assert!(user.is_active);
    assert!(user.last_login_at.is_none());
}

#[tokio::test]
async fn uniqueness_is_case_insensitive_across_create_calls() {
    let service = service();
    service.register_user(alice()).await.unwrap();

    // same username, different case and padding
    let err = service
        .register_user(NewUser::new(
            "  ALICE ",
            "other@example.com",
            "Other",
            "StrongP@ss1",
            Role::Doctor,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateIdentity { .. }));

    // same email, different case
    let err = service
        .register_user(NewUser::new(
            "bob",
            "Alice@Example.COM",
            "Bob",
            "StrongP@ss1",
            Role::Doctor,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateIdentity { .. }));
}

#[tokio::test]
async fn weak_password_reports_every_violation() {
    let service = service();

    let err = service
        .register_user(NewUser::new("weak", "weak@example.com", "Weak", "abc", Role::Doctor))
        .await
        .unwrap_err();

    match err {
        AuthError::WeakCredential(violations) => assert_eq!(violations.len(), 4),
        other => panic!("expected WeakCredential, got {other:?}"),
    }
}

#[tokio::test]
async fn login_with_correct_credentials_issues_session() {
    let service = service();
    service.register_user(alice()).await.unwrap();

    let now = Utc::now();
    let login = service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), now)
        .await
        .unwrap();

    assert_eq!(login.session.expires_at, now + Duration::minutes(30));
    assert_eq!(login.user.last_login_at, Some(now));
}

#[tokio::test]
async fn login_accepts_email_as_identity() {
    let service = service();
    service.register_user(alice()).await.unwrap();

    service
        .login("Alice@Example.COM", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_identity_and_wrong_password_fail_identically() {
    let service = service();
    service.register_user(alice()).await.unwrap();

    let unknown = service
        .login("nonexistent_user", "anything", ClientInfo::default())
        .await
        .unwrap_err();
    let wrong = service
        .login("alice", "wrong_password", ClientInfo::default())
        .await
        .unwrap_err();

    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn sixth_attempt_is_locked_even_with_correct_credential() {
    let service = service();
    service.register_user(alice()).await.unwrap();
    let now = Utc::now();

    for _ in 0..5 {
        let err = service
            .login_at("alice", "wrong_password", ClientInfo::default(), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    let err = service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), now)
        .await
        .unwrap_err();
    match err {
        AuthError::AccountLocked { unlocks_at } => {
            assert_eq!(unlocks_at, now + Duration::minutes(15));
        }
        other => panic!("expected AccountLocked, got {other:?}"),
    }
}

#[tokio::test]
async fn lockout_expires_without_explicit_unlock() {
    let service = service();
    service.register_user(alice()).await.unwrap();
    let now = Utc::now();

    for _ in 0..5 {
        let _ = service
            .login_at("alice", "wrong_password", ClientInfo::default(), now)
            .await;
    }

    let after_lockout = now + Duration::minutes(16);
    let login = service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), after_lockout)
        .await
        .unwrap();
    assert_eq!(login.session.expires_at, after_lockout + Duration::minutes(30));
}

#[tokio::test]
async fn success_resets_the_consecutive_failure_count() {
    let service = service();
    service.register_user(alice()).await.unwrap();
    let now = Utc::now();

    for _ in 0..4 {
        let _ = service
            .login_at("alice", "wrong_password", ClientInfo::default(), now)
            .await;
    }
    service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), now)
        .await
        .unwrap();

    // five fresh failures are required before lockout triggers again
    for _ in 0..4 {
        let _ = service
            .login_at("alice", "wrong_password", ClientInfo::default(), now)
            .await;
    }
    service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), now)
        .await
        .unwrap();
}

#[tokio::test]
async fn attempts_for_unknown_identities_still_lock_out() {
    let service = service();
    let now = Utc::now();

    for _ in 0..5 {
        let _ = service
            .login_at("probe_user", "guess", ClientInfo::default(), now)
            .await;
    }

    let err = service
        .login_at("probe_user", "guess", ClientInfo::default(), now)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked { .. }));
}

#[tokio::test]
async fn deactivated_user_cannot_login_but_gets_distinct_error() {
    let service = service();
    let user = service.register_user(alice()).await.unwrap();
    service.deactivate_user(user.id).await.unwrap();

    let err = service
        .login("alice", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountInactive));

    service.reactivate_user(user.id).await.unwrap();
    service
        .login("alice", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn session_touched_under_timeout_never_expires() {
    let service = service();
    service.register_user(alice()).await.unwrap();
    let start = Utc::now();

    let login = service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), start)
        .await
        .unwrap();
    let session_id = login.session.session_id;

    // activity every 20 minutes keeps a 30-minute session alive indefinitely
    let mut now = start;
    for _ in 0..6 {
        now += Duration::minutes(20);
        service.validate_session_at(session_id, now).await.unwrap();
    }

    // two idle hours later the session is gone
    let err = service
        .validate_session_at(session_id, now + Duration::hours(2))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionExpired));
}

#[tokio::test]
async fn logout_revokes_immediately_and_is_idempotent() {
    let service = service();
    service.register_user(alice()).await.unwrap();

    let login = service
        .login("alice", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap();
    let session_id = login.session.session_id;

    service.logout(session_id).await.unwrap();
    service.logout(session_id).await.unwrap();

    let err = service.validate_session(session_id).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound));
}

#[tokio::test]
async fn permission_union_and_wildcard_through_a_session() {
    let service = service();
    let grants = vec![
        PermissionGrant::new("reports", [Action::View]),
        PermissionGrant::new(WILDCARD_MODULE, [Action::Delete]),
    ];
    service
        .register_user(alice().with_permissions(grants))
        .await
        .unwrap();

    let login = service
        .login("alice", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap();
    let session_id = login.session.session_id;

    assert!(service
        .check_permission(session_id, "reports", Action::View)
        .await
        .unwrap());
    assert!(service
        .check_permission(session_id, "anything", Action::Delete)
        .await
        .unwrap());
    assert!(!service
        .check_permission(session_id, "reports", Action::Edit)
        .await
        .unwrap());
}

#[tokio::test]
async fn credential_change_revokes_existing_sessions() {
    let service = service();
    let user = service.register_user(alice()).await.unwrap();

    let login = service
        .login("alice", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap();

    service
        .update_user(
            user.id,
            UserPatch {
                password: Some("NewStr0ng!Pass".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();

    let err = service
        .validate_session(login.session.session_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    // old credential no longer verifies, new one does
    let err = service
        .login("alice", "StrongP@ss1", ClientInfo::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    service
        .login("alice", "NewStr0ng!Pass", ClientInfo::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn role_change_rederives_default_grants() {
    let service = service();
    let user = service.register_user(alice()).await.unwrap();

    let updated = service
        .update_user(
            user.id,
            UserPatch {
                role: Some(Role::Accountant),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role, Role::Accountant);
    assert_eq!(updated.permissions, auth_access::default_grants(Role::Accountant));
}

#[tokio::test]
async fn invalid_config_update_keeps_previous_config() {
    let service = service();
    let before = service.config();

    let err = service
        .update_config(SecurityConfig {
            max_login_attempts: 0,
            ..SecurityConfig::default()
        })
        .unwrap_err();
    assert!(matches!(err, AuthError::ConfigInvalid(_)));
    assert_eq!(service.config(), before);
}

#[tokio::test]
async fn audit_log_records_both_outcomes() {
    let service = service();
    service.register_user(alice()).await.unwrap();

    let client = ClientInfo {
        source_address: Some("203.0.113.7".to_string()),
        client_agent: Some("diagcare-web/2.1".to_string()),
    };
    let _ = service.login("alice", "wrong_password", client.clone()).await;
    service.login("alice", "StrongP@ss1", client).await.unwrap();

    // audit writes are fire-and-forget; give the spawned tasks a beat
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let attempts = service.login_attempts("alice").await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().any(|attempt| !attempt.success));
    assert!(attempts.iter().any(|attempt| attempt.success));
    assert!(attempts
        .iter()
        .all(|attempt| attempt.source_address.as_deref() == Some("203.0.113.7")));
}

/// The full lifecycle scenario: create a technician, lock her out, wait out
/// the lockout, then log in and get a 30-minute sliding session.
#[tokio::test]
async fn technician_lockout_scenario() {
    let service = service();
    let now = Utc::now();

    let user = service.register_user(alice()).await.unwrap();
    assert_eq!(user.permissions, auth_access::default_grants(Role::Technician));

    for _ in 0..5 {
        let err = service
            .login_at("alice", "wrong_password", ClientInfo::default(), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    let err = service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), now)
        .await
        .unwrap_err();
    let unlocks_at = match err {
        AuthError::AccountLocked { unlocks_at } => unlocks_at,
        other => panic!("expected AccountLocked, got {other:?}"),
    };
    assert_eq!(unlocks_at, now + Duration::minutes(15));

    let after = unlocks_at + Duration::seconds(1);
    let login = service
        .login_at("alice", "StrongP@ss1", ClientInfo::default(), after)
        .await
        .unwrap();
    assert_eq!(login.session.expires_at, after + Duration::minutes(30));
}
