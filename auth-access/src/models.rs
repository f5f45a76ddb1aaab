use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Staff roles in a diagnostic collection center.
///
/// A role is only a shorthand for a default set of [`PermissionGrant`]s;
/// authorization decisions are always made against the user's grants, never
/// against the role itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Dev,
    Doctor,
    Technician,
    Receptionist,
    Accountant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dev => "dev",
            Role::Doctor => "doctor",
            Role::Technician => "technician",
            Role::Receptionist => "receptionist",
            Role::Accountant => "accountant",
        }
    }

    /// Roles whose creation warrants a security alert to the operations team.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Dev)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "dev" => Ok(Role::Dev),
            "doctor" => Ok(Role::Doctor),
            "technician" => Ok(Role::Technician),
            "receptionist" => Ok(Role::Receptionist),
            "accountant" => Ok(Role::Accountant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Capability verbs a grant can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Export,
    Import,
    Lock,
    Unlock,
    Verify,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
            Action::Import => "import",
            Action::Lock => "lock",
            Action::Unlock => "unlock",
            Action::Verify => "verify",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "view" => Ok(Action::View),
            "create" => Ok(Action::Create),
            "edit" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            "export" => Ok(Action::Export),
            "import" => Ok(Action::Import),
            "lock" => Ok(Action::Lock),
            "unlock" => Ok(Action::Unlock),
            "verify" => Ok(Action::Verify),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// A `(module, action-set)` pair authorizing a capability.
///
/// Grants for the same module accumulate; no grant ever revokes another.
/// The module name `"all"` matches every module during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub module: String,
    pub actions: HashSet<Action>,
}

impl PermissionGrant {
    pub fn new(module: impl Into<String>, actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            module: module.into(),
            actions: actions.into_iter().collect(),
        }
    }
}

/// Identity and authorization unit for one staff member.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique login handle, stored trimmed and lowercased.
    pub username: String,
    /// Unique contact address, stored trimmed and lowercased.
    pub email: String,
    pub name: String,
    /// Opaque secret material produced by the hashing collaborator.
    /// Never serialized and never logged.
    #[serde(skip_serializing, default)]
    pub credential_verifier: String,
    pub role: Role,
    pub permissions: Vec<PermissionGrant>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// Scopes the user to one collection center, when set.
    pub tenant_id: Option<Uuid>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("credential_verifier", &"<redacted>")
            .field("role", &self.role)
            .field("permissions", &self.permissions)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Input for creating a user. The password is the raw candidate; it is
/// policy-checked and handed to the hashing collaborator before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    /// Explicit grants; when absent the role's default grants apply.
    pub permissions: Option<Vec<PermissionGrant>>,
    pub tenant_id: Option<Uuid>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            name: name.into(),
            password: password.into(),
            role,
            permissions: None,
            tenant_id: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_permissions(mut self, permissions: Vec<PermissionGrant>) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Partial update for a user record. Login identities are immutable after
/// creation; a role change without explicit grants re-derives the role's
/// default grants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub permissions: Option<Vec<PermissionGrant>>,
    pub password: Option<String>,
}

/// One authentication attempt, append-only for audit and lockout computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// The raw submitted login handle (normalized), which may not resolve
    /// to any known user.
    pub identity: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub source_address: Option<String>,
    pub client_agent: Option<String>,
}

/// Transport-level metadata attached to a login attempt.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub source_address: Option<String>,
    pub client_agent: Option<String>,
}

/// An issued session with sliding expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Successful login outcome.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub session: Session,
    pub user: User,
}

/// Normalize a login identity for comparison and storage: trim whitespace
/// and fold case.
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}
