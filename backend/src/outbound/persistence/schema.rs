//! Diesel table definitions for the tables the engine reads.
//!
//! Environments differ in which of these tables and columns exist. Queries
//! that touch a missing table or column fail with a Postgres "does not exist"
//! error, which the adapters classify as schema variance rather than a fault.
//! For that reason `users.plan` and `users.team_id` are never selected
//! together with unrelated columns unless the caller can recover.

diesel::table! {
    /// Application users. `team_id` is the legacy single-team membership.
    users (id) {
        id -> Text,
        team_id -> Nullable<Text>,
        role -> Nullable<Text>,
        email -> Nullable<Text>,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        /// Billing plan label; read only as an entitlement fallback.
        plan -> Nullable<Text>,
    }
}

diesel::table! {
    /// Membership rows of the newer team model.
    team_members (team_id, user_id) {
        team_id -> Text,
        user_id -> Text,
    }
}

diesel::table! {
    /// Billing seat grants: the member's usage is billed to the admin.
    team_seats (team_admin_id, team_member_id) {
        team_admin_id -> Text,
        team_member_id -> Text,
    }
}

diesel::table! {
    /// Sharing configuration keyed by team or, for older rows, by admin.
    team_settings (id) {
        id -> Text,
        team_id -> Nullable<Text>,
        team_admin_id -> Nullable<Text>,
        share_deals -> Nullable<Bool>,
        share_deals_members -> Nullable<Bool>,
    }
}

diesel::table! {
    /// Invitations addressed to an email.
    team_invites (id) {
        id -> Text,
        email -> Text,
        team_id -> Text,
        status -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Subscription history; the newest row is current.
    subscriptions (user_id, updated_at) {
        user_id -> Text,
        tier -> Nullable<Text>,
        updated_at -> Timestamptz,
    }
}
