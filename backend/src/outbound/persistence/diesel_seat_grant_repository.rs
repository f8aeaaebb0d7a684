//! PostgreSQL-backed `SeatGrantRepository` over `team_seats`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{DirectoryError, SeatGrantRepository};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::team_seats;
use super::user_ids;

/// Diesel-backed implementation of the [`SeatGrantRepository`] port.
#[derive(Clone)]
pub struct DieselSeatGrantRepository {
    pool: DbPool,
}

impl DieselSeatGrantRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatGrantRepository for DieselSeatGrantRepository {
    async fn find_admin_for_member(
        &self,
        member_id: &UserId,
    ) -> Result<Option<UserId>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let admin: Option<String> = team_seats::table
            .filter(team_seats::team_member_id.eq(member_id.as_str()))
            .select(team_seats::team_admin_id)
            .order_by(team_seats::team_admin_id.asc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(UserId::from_column(admin))
    }

    async fn list_members_for_admin(&self, admin_id: &UserId) -> Result<Vec<UserId>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<String> = team_seats::table
            .filter(team_seats::team_admin_id.eq(admin_id.as_str()))
            .select(team_seats::team_member_id)
            .distinct()
            .order_by(team_seats::team_member_id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(user_ids(ids))
    }
}
