//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Identifier columns are plain text here;
//! conversion into validated domain identifiers happens in the adapters.

use diesel::prelude::*;

use super::schema::{team_members, team_settings, users};

/// Row struct for reading a user, including the legacy team column.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub team_id: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Row struct for reading a user where `users.team_id` does not exist.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRowWithoutTeam {
    pub id: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<UserRowWithoutTeam> for UserRow {
    fn from(row: UserRowWithoutTeam) -> Self {
        Self {
            id: row.id,
            team_id: None,
            role: row.role,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

/// Insertable user row carrying its team.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a str,
    pub team_id: &'a str,
    pub role: &'a str,
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Insertable user row that never references `users.team_id`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRowWithoutTeam<'a> {
    pub id: &'a str,
    pub role: &'a str,
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Insertable membership link.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = team_members)]
pub(crate) struct NewMembershipRow<'a> {
    pub team_id: &'a str,
    pub user_id: &'a str,
}

/// Sharing flags of a settings row.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = team_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamSettingsRow {
    pub share_deals: Option<bool>,
    pub share_deals_members: Option<bool>,
}
