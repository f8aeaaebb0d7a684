//! Port over the `team_invites` table.

use async_trait::async_trait;

use super::DirectoryError;
use crate::domain::TeamInvite;

/// Invite lookups used as the last membership inference source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamInviteRepository: Send + Sync {
    /// Most recent invite addressed to the email, whatever its status.
    async fn latest_for_email(&self, email: &str) -> Result<Option<TeamInvite>, DirectoryError>;
}
