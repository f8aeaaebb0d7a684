//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports describe each independent data source the resolvers consult.
//! They are deliberately narrow: one trait per table or external service, so
//! each source can be stubbed in isolation. Driving ports are what the
//! inbound adapter depends on.

mod macros;
pub(crate) use macros::define_port_error;

mod access_queries;
mod directory_error;
mod identity_provider;
mod seat_grant_repository;
mod subscription_repository;
mod team_invite_repository;
mod team_membership_repository;
mod team_settings_repository;
mod user_directory;

#[cfg(test)]
pub use access_queries::{MockEntitlementQuery, MockSharingScopeQuery, MockTeamContextQuery};
pub use access_queries::{EntitlementQuery, SharingScopeQuery, TeamContextQuery};
pub use directory_error::DirectoryError;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use seat_grant_repository::MockSeatGrantRepository;
pub use seat_grant_repository::SeatGrantRepository;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::SubscriptionRepository;
#[cfg(test)]
pub use team_invite_repository::MockTeamInviteRepository;
pub use team_invite_repository::TeamInviteRepository;
#[cfg(test)]
pub use team_membership_repository::MockTeamMembershipRepository;
pub use team_membership_repository::TeamMembershipRepository;
#[cfg(test)]
pub use team_settings_repository::MockTeamSettingsRepository;
pub use team_settings_repository::TeamSettingsRepository;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
