//! PostgreSQL-backed `TeamMembershipRepository` over `team_members`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DirectoryError, TeamMembershipRepository};
use crate::domain::{TeamId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewMembershipRow;
use super::pool::DbPool;
use super::schema::team_members;
use super::user_ids;

/// Diesel-backed implementation of the [`TeamMembershipRepository`] port.
#[derive(Clone)]
pub struct DieselTeamMembershipRepository {
    pool: DbPool,
}

impl DieselTeamMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamMembershipRepository for DieselTeamMembershipRepository {
    async fn find_team_for_user(&self, user_id: &UserId) -> Result<Option<TeamId>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let team: Option<String> = team_members::table
            .filter(team_members::user_id.eq(user_id.as_str()))
            .select(team_members::team_id)
            .order_by(team_members::team_id.asc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(TeamId::from_column(team))
    }

    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<UserId>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<String> = team_members::table
            .filter(team_members::team_id.eq(team_id.as_str()))
            .select(team_members::user_id)
            .order_by(team_members::user_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(user_ids(ids))
    }

    async fn link(&self, team_id: &TeamId, user_id: &UserId) -> Result<(), DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(team_members::table)
            .values(&NewMembershipRow {
                team_id: team_id.as_str(),
                user_id: user_id.as_str(),
            })
            .on_conflict((team_members::team_id, team_members::user_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
