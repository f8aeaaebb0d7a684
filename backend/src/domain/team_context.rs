//! Team and role resolution over disagreeing membership sources.
//!
//! No single table is the source of truth for membership. The legacy
//! `users.team_id` column, the `team_members` table, billing seat grants,
//! identity provider metadata and pending invites may each know the answer,
//! and they are consulted in a fixed order. A team found in a secondary
//! source is written back to the primary ones through [`Backfill`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ports::{
    DirectoryError, IdentityProvider, SeatGrantRepository, TeamContextQuery,
    TeamInviteRepository, TeamMembershipRepository, UserDirectory,
};
use super::{Backfill, IdentityMetadata, NewUserRecord, Role, TeamId, UserId, UserRecord};

/// A user's organisational membership as far as it can be determined.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamContext {
    pub team_id: Option<TeamId>,
    pub role: Option<Role>,
}

impl TeamContext {
    /// Context with neither team nor role, returned on total failure.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context from its parts.
    pub fn new(team_id: Option<TeamId>, role: Option<Role>) -> Self {
        Self { team_id, role }
    }
}

/// Secondary sources consulted once the user row has no team, in order.
///
/// The user row itself is consulted first and short-circuits the list when
/// it carries a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
    /// `team_members` rows.
    Membership,
    /// Seat grants, resolved through the billing admin's own team.
    SeatGrant,
    /// Team recorded in identity provider metadata.
    IdentityMetadata,
    /// Most recent usable invite addressed to the user's email.
    Invite,
}

/// Order in which [`ContextSource`]s are consulted.
pub const CONTEXT_PRECEDENCE: [ContextSource; 4] = [
    ContextSource::Membership,
    ContextSource::SeatGrant,
    ContextSource::IdentityMetadata,
    ContextSource::Invite,
];

enum SourceOutcome {
    Found(TeamId),
    NotFound,
    /// Stop consulting further sources and return what is known.
    Halt,
}

enum UserLookup {
    Found(UserRecord),
    Missing,
    Failed,
}

impl UserLookup {
    fn record(&self) -> Option<&UserRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::Missing | Self::Failed => None,
        }
    }
}

struct Resolution {
    user_id: UserId,
    user: UserLookup,
    identity: IdentityMetadata,
}

impl Resolution {
    fn known_role(&self) -> Option<Role> {
        self.user
            .record()
            .and_then(|user| user.role.clone())
            .or_else(|| self.identity.role.clone())
            .or_else(|| self.identity.provider_role.clone())
    }

    fn email(&self) -> Option<&str> {
        self.identity
            .email
            .as_deref()
            .or_else(|| self.user.record().and_then(|user| user.email.as_deref()))
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Resolves [`TeamContext`] for a user; see the module documentation.
#[derive(Clone)]
pub struct TeamContextResolver {
    users: Arc<dyn UserDirectory>,
    memberships: Arc<dyn TeamMembershipRepository>,
    seat_grants: Arc<dyn SeatGrantRepository>,
    invites: Arc<dyn TeamInviteRepository>,
    identity: Arc<dyn IdentityProvider>,
    backfill: Backfill,
}

impl TeamContextResolver {
    /// Create a resolver over the given sources.
    pub fn new(
        users: Arc<dyn UserDirectory>,
        memberships: Arc<dyn TeamMembershipRepository>,
        seat_grants: Arc<dyn SeatGrantRepository>,
        invites: Arc<dyn TeamInviteRepository>,
        identity: Arc<dyn IdentityProvider>,
        backfill: Backfill,
    ) -> Self {
        Self {
            users,
            memberships,
            seat_grants,
            invites,
            identity,
            backfill,
        }
    }

    /// Resolve the user's team and role. Never fails.
    pub async fn resolve(&self, user_id: &UserId) -> TeamContext {
        let user = self.load_user(user_id).await;
        if let Some(UserRecord {
            team_id: Some(team_id),
            role,
            ..
        }) = user.record()
        {
            debug!(%user_id, %team_id, "team context from user row");
            return TeamContext::new(Some(team_id.clone()), role.clone());
        }

        let identity = self.load_identity(user_id).await;
        let resolution = Resolution {
            user_id: user_id.clone(),
            user,
            identity,
        };
        let role = resolution.known_role();

        for source in CONTEXT_PRECEDENCE {
            match self.consult(source, &resolution).await {
                SourceOutcome::Found(team_id) => {
                    debug!(%user_id, %team_id, ?source, "team context resolved");
                    return TeamContext::new(Some(team_id), role);
                }
                SourceOutcome::NotFound => {}
                SourceOutcome::Halt => {
                    debug!(%user_id, ?source, "team context resolution halted");
                    return TeamContext::new(None, role);
                }
            }
        }

        debug!(%user_id, "no team context found");
        TeamContext::new(None, role)
    }

    async fn consult(&self, source: ContextSource, resolution: &Resolution) -> SourceOutcome {
        match source {
            ContextSource::Membership => self.from_membership(resolution).await,
            ContextSource::SeatGrant => self.from_seat_grant(resolution).await,
            ContextSource::IdentityMetadata => self.from_identity(resolution),
            ContextSource::Invite => self.from_invite(resolution).await,
        }
    }

    async fn load_user(&self, user_id: &UserId) -> UserLookup {
        match self.users.find_by_id(user_id).await {
            Ok(Some(record)) => UserLookup::Found(record),
            Ok(None) => UserLookup::Missing,
            Err(error) => {
                log_absorbed(&error, "user row lookup failed");
                UserLookup::Failed
            }
        }
    }

    async fn load_identity(&self, user_id: &UserId) -> IdentityMetadata {
        match self.identity.fetch_metadata(user_id).await {
            Ok(metadata) => metadata.unwrap_or_default(),
            Err(error) => {
                warn!(%user_id, %error, "identity metadata lookup failed");
                IdentityMetadata::default()
            }
        }
    }

    async fn from_membership(&self, resolution: &Resolution) -> SourceOutcome {
        let user_id = &resolution.user_id;
        match self.memberships.find_team_for_user(user_id).await {
            Ok(Some(team_id)) => {
                self.backfill.assign_team(user_id, &team_id);
                SourceOutcome::Found(team_id)
            }
            Ok(None) => SourceOutcome::NotFound,
            Err(error) if error.is_missing_relation() => {
                debug!(%error, "membership table absent in this environment");
                SourceOutcome::Halt
            }
            Err(error) => {
                log_absorbed(&error, "membership lookup failed");
                SourceOutcome::NotFound
            }
        }
    }

    async fn from_seat_grant(&self, resolution: &Resolution) -> SourceOutcome {
        let user_id = &resolution.user_id;
        let admin_id = match self.seat_grants.find_admin_for_member(user_id).await {
            Ok(Some(admin_id)) => admin_id,
            Ok(None) => return SourceOutcome::NotFound,
            Err(error) => {
                log_absorbed(&error, "seat grant lookup failed");
                return SourceOutcome::NotFound;
            }
        };

        let admin_team = match self.users.find_by_id(&admin_id).await {
            Ok(admin) => admin.and_then(|admin| admin.team_id),
            Err(error) => {
                log_absorbed(&error, "seat admin lookup failed");
                None
            }
        };

        match admin_team {
            Some(team_id) => {
                self.backfill.record_team(user_id, &team_id);
                SourceOutcome::Found(team_id)
            }
            None => SourceOutcome::NotFound,
        }
    }

    fn from_identity(&self, resolution: &Resolution) -> SourceOutcome {
        let Some(team_id) = resolution.identity.team_id.clone() else {
            return SourceOutcome::NotFound;
        };
        let user_id = &resolution.user_id;

        match resolution.user {
            UserLookup::Missing => self.backfill.ensure_user(NewUserRecord::from_identity(
                user_id.clone(),
                &resolution.identity,
                team_id.clone(),
            )),
            UserLookup::Found(_) | UserLookup::Failed => {
                self.backfill.assign_team(user_id, &team_id);
            }
        }
        self.backfill.link_membership(&team_id, user_id);
        SourceOutcome::Found(team_id)
    }

    async fn from_invite(&self, resolution: &Resolution) -> SourceOutcome {
        let Some(email) = resolution.email() else {
            return SourceOutcome::NotFound;
        };
        let invite = match self.invites.latest_for_email(email).await {
            Ok(invite) => invite,
            Err(error) => {
                log_absorbed(&error, "invite lookup failed");
                return SourceOutcome::NotFound;
            }
        };

        match invite {
            Some(invite) if invite.status.implies_membership() => {
                self.backfill.record_team(&resolution.user_id, &invite.team_id);
                SourceOutcome::Found(invite.team_id)
            }
            Some(invite) => {
                debug!(status = ?invite.status, "ignoring unusable invite");
                SourceOutcome::NotFound
            }
            None => SourceOutcome::NotFound,
        }
    }
}

/// Log a lookup failure that is being treated as "found nothing".
pub(crate) fn log_absorbed(error: &DirectoryError, context: &'static str) {
    if error.is_schema_variance() {
        debug!(%error, "{context}");
    } else {
        warn!(%error, "{context}");
    }
}

#[async_trait]
impl TeamContextQuery for TeamContextResolver {
    async fn resolve_context(&self, user_id: &UserId) -> TeamContext {
        self.resolve(user_id).await
    }
}

#[cfg(test)]
#[path = "team_context_tests.rs"]
mod tests;
