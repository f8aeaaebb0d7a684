//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! One adapter per driven port, all sharing a `bb8` pool through
//! `diesel-async`. Adapters only translate rows into domain records;
//! missing tables and columns are reported as `DirectoryError` schema
//! variance for the resolvers to interpret.
//!
//! # Example
//!
//! ```ignore
//! use access_engine::outbound::persistence::{DbPool, PoolConfig, diesel_ports};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/crm")).await?;
//! let ports = diesel_ports(pool, Arc::new(FixtureIdentityProvider));
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::IdentityProvider;
use crate::domain::{AccessPorts, UserId};

mod diesel_error_mapping;
mod diesel_seat_grant_repository;
mod diesel_subscription_repository;
mod diesel_team_invite_repository;
mod diesel_team_membership_repository;
mod diesel_team_settings_repository;
mod diesel_user_directory;
mod models;
mod pool;
mod schema;

pub use diesel_seat_grant_repository::DieselSeatGrantRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_team_invite_repository::DieselTeamInviteRepository;
pub use diesel_team_membership_repository::DieselTeamMembershipRepository;
pub use diesel_team_settings_repository::DieselTeamSettingsRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Wire every relational port to the pool, alongside the identity provider.
pub fn diesel_ports(pool: DbPool, identity: Arc<dyn IdentityProvider>) -> AccessPorts {
    AccessPorts {
        users: Arc::new(DieselUserDirectory::new(pool.clone())),
        memberships: Arc::new(DieselTeamMembershipRepository::new(pool.clone())),
        seat_grants: Arc::new(DieselSeatGrantRepository::new(pool.clone())),
        settings: Arc::new(DieselTeamSettingsRepository::new(pool.clone())),
        invites: Arc::new(DieselTeamInviteRepository::new(pool.clone())),
        subscriptions: Arc::new(DieselSubscriptionRepository::new(pool)),
        identity,
    }
}

/// Convert identifier columns, dropping empty or padded values.
fn user_ids(raw: Vec<String>) -> Vec<UserId> {
    let total = raw.len();
    let ids: Vec<UserId> = raw
        .into_iter()
        .filter_map(|id| UserId::from_column(Some(id)))
        .collect();
    if ids.len() != total {
        debug!(dropped = total - ids.len(), "dropped invalid user ids");
    }
    ids
}
