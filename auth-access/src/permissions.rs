//! Permission evaluation over per-user capability grants.
//!
//! Evaluation is a pure function of `(user, module, action)`. Grants only
//! ever add capabilities: the effective policy is the union of all matching
//! grants, and deny-overrides does not exist.

use crate::models::{Action, PermissionGrant, Role, User};
use tracing::debug;

/// A grant with this module name matches every module during evaluation.
pub const WILDCARD_MODULE: &str = "all";

/// Module names used by the default role grants.
pub mod modules {
    pub const DASHBOARD: &str = "dashboard";
    pub const PATIENTS: &str = "patients";
    pub const REPORTS: &str = "reports";
    pub const INVOICES: &str = "invoices";
    pub const TEST_CATALOG: &str = "test_catalog";
    pub const CENTERS: &str = "centers";
    pub const USERS: &str = "users";
    pub const SETTINGS: &str = "settings";
}

/// Check whether `user` may perform `action` on `module`.
///
/// Inactive users are always denied. Returns `true` on the first grant whose
/// module matches (exactly or via [`WILDCARD_MODULE`]) and whose action set
/// contains `action`.
pub fn has_permission(user: &User, module: &str, action: Action) -> bool {
    if !user.is_active {
        debug!(user_id = %user.id, "permission denied: account inactive");
        return false;
    }

    let allowed = user.permissions.iter().any(|grant| {
        (grant.module == module || grant.module == WILDCARD_MODULE)
            && grant.actions.contains(&action)
    });

    debug!(user_id = %user.id, module, action = %action, allowed, "permission check");
    allowed
}

/// Default grants derived from a role at user creation.
///
/// The table is additive only; administrators can replace a user's grants
/// later without touching the role.
pub fn default_grants(role: Role) -> Vec<PermissionGrant> {
    use Action::{Create, Delete, Edit, Export, Import, Lock, Unlock, Verify, View};

    match role {
        Role::Admin | Role::Dev => vec![PermissionGrant::new(
            WILDCARD_MODULE,
            [View, Create, Edit, Delete, Export, Import, Lock, Unlock, Verify],
        )],
        Role::Doctor => vec![
            PermissionGrant::new(modules::DASHBOARD, [View]),
            PermissionGrant::new(modules::PATIENTS, [View]),
            PermissionGrant::new(modules::REPORTS, [View, Edit, Verify]),
        ],
        Role::Technician => vec![
            PermissionGrant::new(modules::DASHBOARD, [View]),
            PermissionGrant::new(modules::PATIENTS, [View]),
            PermissionGrant::new(modules::REPORTS, [View, Create, Edit]),
            PermissionGrant::new(modules::TEST_CATALOG, [View]),
        ],
        Role::Receptionist => vec![
            PermissionGrant::new(modules::DASHBOARD, [View]),
            PermissionGrant::new(modules::PATIENTS, [View, Create, Edit]),
            PermissionGrant::new(modules::INVOICES, [View, Create]),
            PermissionGrant::new(modules::TEST_CATALOG, [View]),
        ],
        Role::Accountant => vec![
            PermissionGrant::new(modules::DASHBOARD, [View]),
            PermissionGrant::new(modules::REPORTS, [View]),
            PermissionGrant::new(modules::INVOICES, [View, Create, Edit, Export]),
        ],
    }
}
