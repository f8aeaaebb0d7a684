//! PostgreSQL-backed `TeamInviteRepository` over `team_invites`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{DirectoryError, TeamInviteRepository};
use crate::domain::{InviteStatus, TeamId, TeamInvite};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::team_invites;

/// Diesel-backed implementation of the [`TeamInviteRepository`] port.
#[derive(Clone)]
pub struct DieselTeamInviteRepository {
    pool: DbPool,
}

impl DieselTeamInviteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamInviteRepository for DieselTeamInviteRepository {
    async fn latest_for_email(&self, email: &str) -> Result<Option<TeamInvite>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(String, String, Option<String>)> = team_invites::table
            .filter(team_invites::email.eq(email))
            .select((team_invites::email, team_invites::team_id, team_invites::status))
            .order_by(team_invites::created_at.desc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some((email, team_id, status)) = row else {
            return Ok(None);
        };
        let Some(team_id) = TeamId::from_column(Some(team_id)) else {
            debug!("ignoring invite with invalid team id");
            return Ok(None);
        };
        Ok(Some(TeamInvite {
            email,
            team_id,
            status: InviteStatus::from_column(status.as_deref()),
        }))
    }
}
