//! Port over the `users` table.

use async_trait::async_trait;

use super::DirectoryError;
use crate::domain::{NewUserRecord, TeamId, UserId, UserRecord};

/// Reads and opportunistic repairs against user rows.
///
/// The read methods back the legacy single-column membership model; the
/// write methods are only ever called from backfill tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user row by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DirectoryError>;

    /// Fetch the user's plan column, if the environment has one.
    async fn find_plan(&self, id: &UserId) -> Result<Option<String>, DirectoryError>;

    /// List every user whose legacy `team_id` column names the team.
    async fn list_team_members(&self, team_id: &TeamId) -> Result<Vec<UserId>, DirectoryError>;

    /// Find a user of the team whose role is one of `admin_roles`.
    ///
    /// Implementations must pick deterministically (lowest id first).
    async fn find_team_admin(
        &self,
        team_id: &TeamId,
        admin_roles: &[&'static str],
    ) -> Result<Option<UserId>, DirectoryError>;

    /// Set the legacy `team_id` column on an existing row.
    async fn assign_team(&self, id: &UserId, team_id: &TeamId) -> Result<(), DirectoryError>;

    /// Insert a minimal user row. Existing rows are left untouched.
    async fn insert_user(&self, record: &NewUserRecord) -> Result<(), DirectoryError>;
}
