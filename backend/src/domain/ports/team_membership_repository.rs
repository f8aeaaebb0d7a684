//! Port over the `team_members` table.

use async_trait::async_trait;

use super::DirectoryError;
use crate::domain::{TeamId, UserId};

/// The membership-table model: one `(team_id, user_id)` row per member.
///
/// Environments that predate the table report
/// [`DirectoryError::MissingRelation`] from every method.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamMembershipRepository: Send + Sync {
    /// Return the team of the first membership row for the user.
    async fn find_team_for_user(&self, user_id: &UserId) -> Result<Option<TeamId>, DirectoryError>;

    /// List members of the team.
    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<UserId>, DirectoryError>;

    /// Upsert the `(team_id, user_id)` pair; an existing row is kept as is.
    async fn link(&self, team_id: &TeamId, user_id: &UserId) -> Result<(), DirectoryError>;
}
