//! PostgreSQL-backed `UserDirectory` implementation using Diesel ORM.
//!
//! Reads tolerate environments without `users.team_id` by retrying the
//! lookup without that column. Writes do not retry; the backfill scheduler
//! decides how to recover from a missing column.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{DirectoryError, UserDirectory};
use crate::domain::{NewUserRecord, Role, TeamId, UserId, UserRecord};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, NewUserRowWithoutTeam, UserRow, UserRowWithoutTeam};
use super::pool::DbPool;
use super::schema::users;
use super::user_ids;

/// Diesel-backed implementation of the [`UserDirectory`] port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_row(&self, id: &UserId) -> Result<Option<UserRow>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let full = users::table
            .filter(users::id.eq(id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error);

        match full {
            Err(error) if error.is_missing_column() => {
                debug!(user_id = %id, "users.team_id missing, reading row without it");
                let row = users::table
                    .filter(users::id.eq(id.as_str()))
                    .select(UserRowWithoutTeam::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Ok(row.map(UserRow::from))
            }
            other => other,
        }
    }
}

fn row_to_record(row: UserRow) -> Option<UserRecord> {
    let Some(id) = UserId::from_column(Some(row.id)) else {
        debug!("skipping user row with invalid id");
        return None;
    };
    Some(UserRecord {
        id,
        team_id: TeamId::from_column(row.team_id),
        role: Role::from_column(row.role.as_deref()),
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
    })
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.find_row(id).await?.and_then(row_to_record))
    }

    async fn find_plan(&self, id: &UserId) -> Result<Option<String>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let plan: Option<Option<String>> = users::table
            .filter(users::id.eq(id.as_str()))
            .select(users::plan)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(plan.flatten())
    }

    async fn list_team_members(&self, team_id: &TeamId) -> Result<Vec<UserId>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<String> = users::table
            .filter(users::team_id.eq(team_id.as_str()))
            .select(users::id)
            .order_by(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(user_ids(ids))
    }

    async fn find_team_admin(
        &self,
        team_id: &TeamId,
        admin_roles: &[&'static str],
    ) -> Result<Option<UserId>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let candidates: Vec<(String, Option<String>)> = users::table
            .filter(users::team_id.eq(team_id.as_str()))
            .filter(users::role.is_not_null())
            .select((users::id, users::role))
            .order_by(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(candidates
            .into_iter()
            .find(|(_, role)| {
                Role::from_column(role.as_deref()).is_some_and(|role| role.is_one_of(admin_roles))
            })
            .and_then(|(id, _)| UserId::from_column(Some(id))))
    }

    async fn assign_team(&self, id: &UserId, team_id: &TeamId) -> Result<(), DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.filter(users::id.eq(id.as_str())))
            .set(users::team_id.eq(team_id.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn insert_user(&self, record: &NewUserRecord) -> Result<(), DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = match &record.team_id {
            Some(team_id) => {
                let row = NewUserRow {
                    id: record.id.as_str(),
                    team_id: team_id.as_str(),
                    role: record.role.as_str(),
                    email: record.email.as_deref(),
                    first_name: record.first_name.as_deref(),
                    last_name: record.last_name.as_deref(),
                };
                diesel::insert_into(users::table)
                    .values(&row)
                    .on_conflict(users::id)
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
            None => {
                let row = NewUserRowWithoutTeam {
                    id: record.id.as_str(),
                    role: record.role.as_str(),
                    email: record.email.as_deref(),
                    first_name: record.first_name.as_deref(),
                    last_name: record.last_name.as_deref(),
                };
                diesel::insert_into(users::table)
                    .values(&row)
                    .on_conflict(users::id)
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
        };

        inserted.map(|_| ()).map_err(map_diesel_error)
    }
}
