//! Port over the billing-seat table.

use async_trait::async_trait;

use super::DirectoryError;
use crate::domain::UserId;

/// The billing-seat model: `(team_admin_id, team_member_id)` pairs stating
/// that a member's usage is billed under an admin. Seat grants carry no team
/// identity of their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeatGrantRepository: Send + Sync {
    /// Return the admin billing the member, if any.
    async fn find_admin_for_member(
        &self,
        member_id: &UserId,
    ) -> Result<Option<UserId>, DirectoryError>;

    /// List members billed under the admin.
    async fn list_members_for_admin(&self, admin_id: &UserId) -> Result<Vec<UserId>, DirectoryError>;
}
