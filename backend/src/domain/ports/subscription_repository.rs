//! Port over per-user subscription tiers.

use async_trait::async_trait;

use super::DirectoryError;
use crate::domain::{SubscriptionTier, UserId};

/// Billing tier lookups used only by the entitlement gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Tier of the user's most recent subscription row.
    async fn find_tier(&self, user_id: &UserId) -> Result<Option<SubscriptionTier>, DirectoryError>;
}
