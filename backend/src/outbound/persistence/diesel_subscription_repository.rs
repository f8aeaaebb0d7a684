//! PostgreSQL-backed `SubscriptionRepository` over `subscriptions`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DirectoryError, SubscriptionRepository};
use crate::domain::{SubscriptionTier, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::subscriptions;

/// Diesel-backed implementation of the [`SubscriptionRepository`] port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn find_tier(&self, user_id: &UserId) -> Result<Option<SubscriptionTier>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let tier: Option<Option<String>> = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id.as_str()))
            .select(subscriptions::tier)
            .order_by(subscriptions::updated_at.desc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(tier.flatten().as_deref().and_then(SubscriptionTier::parse))
    }
}
