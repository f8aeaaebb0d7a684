//! Driving ports exposed to inbound adapters.
//!
//! None of these operations can fail: every lookup failure is absorbed into
//! the most conservative result available at that point.

use async_trait::async_trait;

use crate::domain::{SharingScope, TeamContext, UserId};

/// Resolve the `(team, role)` pair for a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamContextQuery: Send + Sync {
    /// Best-effort team context; `TeamContext::empty()` on total failure.
    async fn resolve_context(&self, user_id: &UserId) -> TeamContext;
}

/// Compute whose records a user may view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharingScopeQuery: Send + Sync {
    /// Sharing scope; always contains the requesting user.
    async fn resolve_scope(&self, user_id: &UserId) -> SharingScope;
}

/// Decide whether a user may use a paid feature at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitlementQuery: Send + Sync {
    /// `false` only on an explicit free or guest signal.
    async fn is_entitled(&self, user_id: &UserId) -> bool;
}
