//! Fixed access rules and the per-decision failure defaults.
//!
//! The two decisions in this crate deliberately use opposite defaults:
//! visibility scoping falls back to the requesting user alone, while the
//! entitlement gate falls back to allowing the feature. Both defaults live
//! here next to the role sets they are evaluated against.

use super::Role;

/// Roles that administer a team and always see the pooled view when
/// sharing is on.
pub const ADMIN_ROLES: &[&str] = &["admin", "owner", "team_admin", "super_admin"];

/// Roles that are entitled to paid features regardless of billing rows.
pub const PAID_ROLES: &[&str] = &[
    "admin",
    "owner",
    "team_admin",
    "super_admin",
    "pro",
    "premium",
    "business",
    "enterprise",
    "paid",
];

/// Roles that explicitly signal no entitlement.
pub const DENIED_ROLES: &[&str] = &["guest", "free"];

/// Role given to user rows synthesised from identity metadata.
pub const DEFAULT_MEMBER_ROLE: &str = "member";

/// What a visibility decision degrades to when it cannot be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDefault {
    /// Only the requesting user's own records.
    SelfOnly,
}

/// What an entitlement decision degrades to when it cannot be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementDefault {
    /// The feature is available.
    Allow,
}

impl EntitlementDefault {
    /// The boolean the gate returns for this default.
    pub fn as_bool(self) -> bool {
        match self {
            Self::Allow => true,
        }
    }
}

/// Failure default for the sharing scope resolver.
pub const SCOPE_FAILURE_DEFAULT: ScopeDefault = ScopeDefault::SelfOnly;

/// Failure default for the entitlement gate.
pub const ENTITLEMENT_DEFAULT: EntitlementDefault = EntitlementDefault::Allow;

/// Whether the role administers a team.
pub fn is_admin_role(role: Option<&Role>) -> bool {
    role.is_some_and(|role| role.is_one_of(ADMIN_ROLES))
}

/// Whether the role is always entitled to paid features.
pub fn is_paid_role(role: Option<&Role>) -> bool {
    role.is_some_and(|role| role.is_one_of(PAID_ROLES))
}

/// Whether the role explicitly denies paid features.
pub fn is_denied_role(role: Option<&Role>) -> bool {
    role.is_some_and(|role| role.is_one_of(DENIED_ROLES))
}
