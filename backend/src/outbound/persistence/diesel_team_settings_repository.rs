//! PostgreSQL-backed `TeamSettingsRepository` over `team_settings`.
//!
//! Rows are keyed by either `team_id` or `team_admin_id` depending on which
//! schema generation created them; each lookup filters on one key only.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DirectoryError, TeamSettingsRepository};
use crate::domain::{TeamId, TeamSettings, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::TeamSettingsRow;
use super::pool::DbPool;
use super::schema::team_settings;

/// Diesel-backed implementation of the [`TeamSettingsRepository`] port.
#[derive(Clone)]
pub struct DieselTeamSettingsRepository {
    pool: DbPool,
}

impl DieselTeamSettingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_settings(row: TeamSettingsRow) -> TeamSettings {
    TeamSettings::from_columns(row.share_deals, row.share_deals_members)
}

#[async_trait]
impl TeamSettingsRepository for DieselTeamSettingsRepository {
    async fn find_by_team(&self, team_id: &TeamId) -> Result<Option<TeamSettings>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TeamSettingsRow> = team_settings::table
            .filter(team_settings::team_id.eq(team_id.as_str()))
            .select(TeamSettingsRow::as_select())
            .order_by(team_settings::id.asc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_settings))
    }

    async fn find_by_admin(
        &self,
        admin_id: &UserId,
    ) -> Result<Option<TeamSettings>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<TeamSettingsRow> = team_settings::table
            .filter(team_settings::team_admin_id.eq(admin_id.as_str()))
            .select(TeamSettingsRow::as_select())
            .order_by(team_settings::id.asc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_settings))
    }
}
