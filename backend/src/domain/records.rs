//! Records read from the persistence layer and the identity provider.
//!
//! Every record here is owned by the surrounding CRUD features. The engine
//! only reads them and, through [`crate::domain::Backfill`], patches linkage
//! that another source has already proven.

use serde::{Deserialize, Serialize};

use super::policy::DEFAULT_MEMBER_ROLE;
use super::{Role, TeamId, UserId};

/// A row of the `users` table as the resolver sees it.
///
/// `team_id` is the legacy single-column membership. When present it is
/// authoritative and short-circuits every other source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub team_id: Option<TeamId>,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserRecord {
    /// Start a record for the given user with every optional field empty.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            team_id: None,
            role: None,
            email: None,
            first_name: None,
            last_name: None,
        }
    }

    /// Set the legacy team column.
    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Set the role label.
    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Role::parse(role);
        self
    }

    /// Set the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Minimal user row synthesised from identity metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub team_id: Option<TeamId>,
}

impl NewUserRecord {
    /// Synthesise a row from identity metadata, defaulting the role to
    /// [`DEFAULT_MEMBER_ROLE`]. The provider-level role is ignored.
    pub fn from_identity(id: UserId, identity: &IdentityMetadata, team_id: TeamId) -> Self {
        Self {
            id,
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            role: identity
                .role
                .clone()
                .unwrap_or_else(|| Role::from(DEFAULT_MEMBER_ROLE.to_owned())),
            team_id: Some(team_id),
        }
    }

    /// The same row without the `team_id` column, for schemas that lack it.
    pub fn without_team(&self) -> Self {
        Self {
            team_id: None,
            ..self.clone()
        }
    }
}

/// Per-team sharing configuration.
///
/// A missing settings row means both flags are on; see [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSettings {
    pub share_deals: bool,
    pub share_deals_members: bool,
}

impl TeamSettings {
    /// Build settings from nullable stored flags, filling gaps with `true`.
    pub fn from_columns(share_deals: Option<bool>, share_deals_members: Option<bool>) -> Self {
        let defaults = Self::default();
        Self {
            share_deals: share_deals.unwrap_or(defaults.share_deals),
            share_deals_members: share_deals_members.unwrap_or(defaults.share_deals_members),
        }
    }
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            share_deals: true,
            share_deals_members: true,
        }
    }
}

/// Lifecycle state of a team invite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteStatus {
    /// No status recorded.
    Unset,
    /// Invite sent but not yet acted on.
    Pending,
    /// Invite accepted.
    Accepted,
    /// Any other state (revoked, expired, declined, ...).
    Other(String),
}

impl InviteStatus {
    /// Parse a stored status column.
    pub fn from_column(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::Unset;
        };
        match value.to_lowercase().as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Whether an invite in this state can be used to infer membership.
    pub fn implies_membership(&self) -> bool {
        matches!(self, Self::Unset | Self::Pending | Self::Accepted)
    }
}

/// A row of the `team_invites` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInvite {
    pub email: String,
    pub team_id: TeamId,
    pub status: InviteStatus,
}

/// Metadata the identity provider attaches to the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityMetadata {
    pub team_id: Option<TeamId>,
    /// CRM role recorded in the provider's custom metadata maps.
    pub role: Option<Role>,
    /// The provider's own principal role, such as `authenticated`. Used only
    /// to report a role, never persisted.
    pub provider_role: Option<Role>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A user's billing plan tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionTier(String);

impl SubscriptionTier {
    /// Normalise a stored tier string; blank values carry no signal.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            None
        } else {
            Some(Self(normalised))
        }
    }

    /// The normalised tier label.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether this tier is the explicit free plan.
    pub fn is_free(&self) -> bool {
        self.0 == "free"
    }
}
