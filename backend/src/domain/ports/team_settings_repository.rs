//! Port over the `team_settings` table.

use async_trait::async_trait;

use super::DirectoryError;
use crate::domain::{TeamId, TeamSettings, UserId};

/// Sharing settings, keyed by team in newer rows and by the billing admin in
/// rows written under the seat model.
///
/// `Ok(None)` means no row exists for the key; callers apply
/// [`TeamSettings::default`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamSettingsRepository: Send + Sync {
    /// Settings row keyed by team identifier.
    async fn find_by_team(&self, team_id: &TeamId) -> Result<Option<TeamSettings>, DirectoryError>;

    /// Settings row keyed by team admin identifier.
    async fn find_by_admin(&self, admin_id: &UserId)
    -> Result<Option<TeamSettings>, DirectoryError>;
}
