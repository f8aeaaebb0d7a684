//! Wiring of the three resolvers over one set of driven ports.

use std::sync::Arc;

use super::ports::{
    EntitlementQuery, IdentityProvider, SeatGrantRepository, SharingScopeQuery,
    SubscriptionRepository, TeamContextQuery, TeamInviteRepository, TeamMembershipRepository,
    TeamSettingsRepository, UserDirectory,
};
use super::{Backfill, EntitlementGate, SharingScopeResolver, TeamContextResolver};

/// Every data source the engine reads from.
#[derive(Clone)]
pub struct AccessPorts {
    /// `users` rows, including the legacy team column.
    pub users: Arc<dyn UserDirectory>,
    /// `team_members` rows.
    pub memberships: Arc<dyn TeamMembershipRepository>,
    /// `team_seats` rows.
    pub seat_grants: Arc<dyn SeatGrantRepository>,
    /// `team_settings` rows.
    pub settings: Arc<dyn TeamSettingsRepository>,
    /// `team_invites` rows.
    pub invites: Arc<dyn TeamInviteRepository>,
    /// `subscriptions` rows.
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// External identity provider.
    pub identity: Arc<dyn IdentityProvider>,
}

/// The context resolver, scope resolver and entitlement gate, layered so
/// the latter two consume the first.
#[derive(Clone)]
pub struct AccessEngine {
    context: Arc<TeamContextResolver>,
    scope: Arc<SharingScopeResolver>,
    entitlement: Arc<EntitlementGate>,
    backfill: Backfill,
}

impl AccessEngine {
    /// Build the engine from its ports.
    pub fn new(ports: AccessPorts) -> Self {
        let backfill = Backfill::new(Arc::clone(&ports.users), Arc::clone(&ports.memberships));
        let context = Arc::new(TeamContextResolver::new(
            Arc::clone(&ports.users),
            Arc::clone(&ports.memberships),
            Arc::clone(&ports.seat_grants),
            ports.invites,
            ports.identity,
            backfill.clone(),
        ));
        let context_query: Arc<dyn TeamContextQuery> = context.clone();
        let scope = Arc::new(SharingScopeResolver::new(
            Arc::clone(&context_query),
            Arc::clone(&ports.users),
            ports.memberships,
            ports.seat_grants,
            ports.settings,
        ));
        let entitlement = Arc::new(EntitlementGate::new(
            context_query,
            ports.subscriptions,
            ports.users,
        ));
        Self {
            context,
            scope,
            entitlement,
            backfill,
        }
    }

    /// Driving port for team context resolution.
    pub fn context_query(&self) -> Arc<dyn TeamContextQuery> {
        self.context.clone()
    }

    /// Driving port for sharing scope resolution.
    pub fn scope_query(&self) -> Arc<dyn SharingScopeQuery> {
        self.scope.clone()
    }

    /// Driving port for the entitlement gate.
    pub fn entitlement_query(&self) -> Arc<dyn EntitlementQuery> {
        self.entitlement.clone()
    }

    /// The entitlement gate itself, for callers that want the decision.
    pub fn entitlement_gate(&self) -> &EntitlementGate {
        &self.entitlement
    }

    /// Scheduler of the engine's repair writes.
    pub fn backfill(&self) -> &Backfill {
        &self.backfill
    }
}
