//! Deal visibility scoping.
//!
//! A user sees either their own records only, or the pooled records of the
//! team they belong to. Pooling depends on the team's sharing settings and on
//! whether the caller administers the team. Whenever a lookup cannot be
//! completed the scope narrows, never widens.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::policy::{ADMIN_ROLES, SCOPE_FAILURE_DEFAULT, ScopeDefault, is_admin_role};
use super::ports::{
    DirectoryError, SeatGrantRepository, SharingScopeQuery, TeamContextQuery,
    TeamMembershipRepository, TeamSettingsRepository, UserDirectory,
};
use super::team_context::log_absorbed;
use super::{Role, TeamId, TeamSettings, UserId};

/// Whose records a user may view, together with the inputs that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingScope {
    pub team_id: Option<TeamId>,
    pub team_admin_id: Option<UserId>,
    pub role: Option<Role>,
    pub share_deals: bool,
    pub share_deals_members: bool,
    /// Owner ids to filter business records by. Always contains the
    /// requesting user and never contains duplicates.
    pub visible_owner_ids: Vec<UserId>,
}

impl SharingScope {
    /// Scope for a user with no team: own records only, sharing off.
    pub fn self_only(user_id: &UserId) -> Self {
        Self {
            team_id: None,
            team_admin_id: None,
            role: None,
            share_deals: false,
            share_deals_members: false,
            visible_owner_ids: vec![user_id.clone()],
        }
    }

    /// Whether records owned by `owner_id` are visible.
    pub fn contains(&self, owner_id: &UserId) -> bool {
        self.visible_owner_ids.contains(owner_id)
    }
}

/// Team identity established before settings are consulted.
struct Anchor {
    team_id: Option<TeamId>,
    team_admin_id: Option<UserId>,
    role: Option<Role>,
    is_admin: bool,
}

impl Anchor {
    fn restricted(self, user_id: &UserId, settings: TeamSettings) -> SharingScope {
        SharingScope {
            team_id: self.team_id,
            team_admin_id: self.team_admin_id,
            role: self.role,
            share_deals: settings.share_deals,
            share_deals_members: settings.share_deals_members,
            visible_owner_ids: failure_default(user_id),
        }
    }
}

fn failure_default(user_id: &UserId) -> Vec<UserId> {
    match SCOPE_FAILURE_DEFAULT {
        ScopeDefault::SelfOnly => vec![user_id.clone()],
    }
}

/// Resolves [`SharingScope`] on top of a [`TeamContextQuery`].
#[derive(Clone)]
pub struct SharingScopeResolver {
    context: Arc<dyn TeamContextQuery>,
    users: Arc<dyn UserDirectory>,
    memberships: Arc<dyn TeamMembershipRepository>,
    seat_grants: Arc<dyn SeatGrantRepository>,
    settings: Arc<dyn TeamSettingsRepository>,
}

impl SharingScopeResolver {
    /// Create a resolver over the given context query and sources.
    pub fn new(
        context: Arc<dyn TeamContextQuery>,
        users: Arc<dyn UserDirectory>,
        memberships: Arc<dyn TeamMembershipRepository>,
        seat_grants: Arc<dyn SeatGrantRepository>,
        settings: Arc<dyn TeamSettingsRepository>,
    ) -> Self {
        Self {
            context,
            users,
            memberships,
            seat_grants,
            settings,
        }
    }

    /// Compute the user's sharing scope. Never fails.
    pub async fn resolve(&self, user_id: &UserId) -> SharingScope {
        let context = self.context.resolve_context(user_id).await;
        let is_admin = is_admin_role(context.role.as_ref());

        let team_admin_id = match (&context.team_id, is_admin) {
            (Some(_), _) => None,
            (None, true) => Some(user_id.clone()),
            (None, false) => self.seat_admin(user_id).await,
        };

        if context.team_id.is_none() && team_admin_id.is_none() {
            debug!(%user_id, "no team anchor, scope is self only");
            return SharingScope {
                role: context.role,
                ..SharingScope::self_only(user_id)
            };
        }

        let mut anchor = Anchor {
            team_id: context.team_id,
            team_admin_id,
            role: context.role,
            is_admin,
        };
        let settings = self.load_settings(&mut anchor).await;

        if !settings.share_deals {
            debug!(%user_id, "deal sharing disabled for team");
            return anchor.restricted(user_id, settings);
        }
        if !anchor.is_admin && !settings.share_deals_members {
            debug!(%user_id, "deal sharing disabled for members");
            return anchor.restricted(user_id, settings);
        }

        let visible_owner_ids = self.pooled_owners(user_id, &anchor).await;
        debug!(%user_id, owners = visible_owner_ids.len(), "pooled sharing scope");
        SharingScope {
            team_id: anchor.team_id,
            team_admin_id: anchor.team_admin_id,
            role: anchor.role,
            share_deals: settings.share_deals,
            share_deals_members: settings.share_deals_members,
            visible_owner_ids,
        }
    }

    async fn seat_admin(&self, user_id: &UserId) -> Option<UserId> {
        self.seat_grants
            .find_admin_for_member(user_id)
            .await
            .unwrap_or_else(|error| {
                log_absorbed(&error, "seat grant lookup failed");
                None
            })
    }

    /// Settings keyed by team, then by admin, then by the team's admin
    /// found by role. A missing row moves on to the next key; a failed
    /// lookup yields the defaults.
    async fn load_settings(&self, anchor: &mut Anchor) -> TeamSettings {
        if let Some(team_id) = &anchor.team_id {
            match self.settings.find_by_team(team_id).await {
                Ok(Some(settings)) => return settings,
                Ok(None) => {}
                Err(error) => {
                    log_absorbed(&error, "team settings lookup failed");
                    return TeamSettings::default();
                }
            }
        }

        if let Some(admin_id) = &anchor.team_admin_id {
            let by_admin = self.settings.find_by_admin(admin_id).await;
            return absorb(by_admin, "admin settings lookup failed").unwrap_or_default();
        }

        let Some(team_id) = &anchor.team_id else {
            return TeamSettings::default();
        };
        let admin = self.users.find_team_admin(team_id, ADMIN_ROLES).await;
        let Some(admin_id) = absorb(admin, "team admin lookup failed") else {
            return TeamSettings::default();
        };
        let by_admin = self.settings.find_by_admin(&admin_id).await;
        anchor.team_admin_id = Some(admin_id);
        absorb(by_admin, "admin settings lookup failed").unwrap_or_default()
    }

    async fn pooled_owners(&self, user_id: &UserId, anchor: &Anchor) -> Vec<UserId> {
        let members = match (&anchor.team_id, &anchor.team_admin_id) {
            (Some(team_id), _) => self.team_members(team_id).await,
            (None, Some(admin_id)) => self
                .seat_grants
                .list_members_for_admin(admin_id)
                .await
                .map_err(|error| log_absorbed(&error, "seat members lookup failed"))
                .ok(),
            (None, None) => None,
        };
        let Some(members) = members else {
            return failure_default(user_id);
        };

        let mut owners = vec![user_id.clone()];
        if let Some(admin_id) = anchor.team_admin_id.as_ref().filter(|id| *id != user_id) {
            owners.push(admin_id.clone());
        }
        let rest: BTreeSet<UserId> = members
            .into_iter()
            .filter(|id| !owners.contains(id))
            .collect();
        owners.extend(rest);
        owners
    }

    /// Members from the membership table and the legacy column, unioned.
    /// `None` only when neither source could be read.
    async fn team_members(&self, team_id: &TeamId) -> Option<Vec<UserId>> {
        let (linked, legacy) = tokio::join!(
            self.memberships.list_members(team_id),
            self.users.list_team_members(team_id),
        );
        match (linked, legacy) {
            (Err(linked_error), Err(legacy_error)) => {
                log_absorbed(&linked_error, "membership table lookup failed");
                log_absorbed(&legacy_error, "legacy team column lookup failed");
                None
            }
            (linked, legacy) => {
                let mut members = absorb_list(linked, "membership table lookup failed");
                members.extend(absorb_list(legacy, "legacy team column lookup failed"));
                Some(members)
            }
        }
    }
}

fn absorb<T>(result: Result<Option<T>, DirectoryError>, context: &'static str) -> Option<T> {
    result.unwrap_or_else(|error| {
        log_absorbed(&error, context);
        None
    })
}

fn absorb_list(result: Result<Vec<UserId>, DirectoryError>, context: &'static str) -> Vec<UserId> {
    result.unwrap_or_else(|error| {
        log_absorbed(&error, context);
        Vec::new()
    })
}

#[async_trait]
impl SharingScopeQuery for SharingScopeResolver {
    async fn resolve_scope(&self, user_id: &UserId) -> SharingScope {
        self.resolve(user_id).await
    }
}

#[cfg(test)]
#[path = "sharing_scope_tests.rs"]
mod tests;
