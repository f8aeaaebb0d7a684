//! Paid-feature gate.
//!
//! Distinct from visibility: this decides whether a feature can be used at
//! all. Only an explicit negative signal denies; unknown or unreadable
//! billing data allows.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::policy::{ENTITLEMENT_DEFAULT, is_denied_role, is_paid_role};
use super::ports::{EntitlementQuery, SubscriptionRepository, TeamContextQuery, UserDirectory};
use super::team_context::log_absorbed;
use super::{SubscriptionTier, UserId};

/// The rule that decided an entitlement check, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementDecision {
    /// The role is in the paid-role set.
    PaidRole,
    /// A team was resolved; team access is never gated per member.
    TeamMember,
    /// The role is explicitly `guest` or `free`.
    DeniedRole,
    /// The subscription tier is `free`.
    FreeTier,
    /// No tier row, and the user's plan column is `free`.
    FreePlan,
    /// No rule matched, or billing data could not be read.
    Default,
}

impl EntitlementDecision {
    /// Whether the decision grants access.
    pub fn allows(self) -> bool {
        match self {
            Self::PaidRole | Self::TeamMember => true,
            Self::DeniedRole | Self::FreeTier | Self::FreePlan => false,
            Self::Default => ENTITLEMENT_DEFAULT.as_bool(),
        }
    }
}

/// Decides [`EntitlementDecision`]s for users.
#[derive(Clone)]
pub struct EntitlementGate {
    context: Arc<dyn TeamContextQuery>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserDirectory>,
}

impl EntitlementGate {
    /// Create a gate over the given context query and billing sources.
    pub fn new(
        context: Arc<dyn TeamContextQuery>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            context,
            subscriptions,
            users,
        }
    }

    /// Evaluate the rules for a user and report which one applied.
    pub async fn decide(&self, user_id: &UserId) -> EntitlementDecision {
        let context = self.context.resolve_context(user_id).await;
        let role = context.role.as_ref();

        let decision = if is_paid_role(role) {
            EntitlementDecision::PaidRole
        } else if context.team_id.is_some() {
            EntitlementDecision::TeamMember
        } else if is_denied_role(role) {
            EntitlementDecision::DeniedRole
        } else {
            self.billing_decision(user_id).await
        };
        debug!(%user_id, ?decision, "entitlement decided");
        decision
    }

    async fn billing_decision(&self, user_id: &UserId) -> EntitlementDecision {
        match self.subscriptions.find_tier(user_id).await {
            Ok(Some(tier)) if tier.is_free() => return EntitlementDecision::FreeTier,
            Ok(Some(_)) => return EntitlementDecision::Default,
            Ok(None) => {}
            Err(error) if error.is_schema_variance() => {
                debug!(%user_id, %error, "subscriptions unavailable, consulting plan");
            }
            Err(error) => {
                warn!(%user_id, %error, "subscription lookup failed, allowing");
                return EntitlementDecision::Default;
            }
        }

        match self.users.find_plan(user_id).await {
            Ok(plan) => {
                let free = plan
                    .as_deref()
                    .and_then(SubscriptionTier::parse)
                    .is_some_and(|plan| plan.is_free());
                if free {
                    EntitlementDecision::FreePlan
                } else {
                    EntitlementDecision::Default
                }
            }
            Err(error) => {
                log_absorbed(&error, "plan lookup failed");
                EntitlementDecision::Default
            }
        }
    }
}

#[async_trait]
impl EntitlementQuery for EntitlementGate {
    async fn is_entitled(&self, user_id: &UserId) -> bool {
        self.decide(user_id).await.allows()
    }
}
