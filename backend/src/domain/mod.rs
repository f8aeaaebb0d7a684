//! Domain primitives, policy and resolvers.
//!
//! Purpose: resolve a user's team context, deal sharing scope and paid-feature
//! entitlement from sources that disagree, without ever surfacing a failure.
//! Every data source sits behind a driven port in [`ports`]; the resolvers
//! only see those traits.
//!
//! Public surface:
//! - [`TeamContextResolver`]: `(team, role)` from the precedence chain.
//! - [`SharingScopeResolver`]: visible record owners for a user.
//! - [`EntitlementGate`]: fail-open paid-feature gate.
//! - [`AccessEngine`]: the three wired over one [`AccessPorts`] bundle.
//! - [`Error`] / [`ErrorCode`]: payloads for the inbound adapter.

mod backfill;
mod engine;
mod entitlement;
pub mod error;
mod ids;
pub mod policy;
pub mod ports;
mod records;
mod role;
mod schema_variance;
mod sharing_scope;
mod team_context;

pub use self::backfill::Backfill;
pub use self::engine::{AccessEngine, AccessPorts};
pub use self::entitlement::{EntitlementDecision, EntitlementGate};
pub use self::error::{ACCESS_DENIED_MESSAGE, Error, ErrorCode};
pub use self::ids::{IdentifierValidationError, TeamId, UserId};
pub use self::records::{
    IdentityMetadata, InviteStatus, NewUserRecord, SubscriptionTier, TeamInvite, TeamSettings,
    UserRecord,
};
pub use self::role::Role;
pub use self::schema_variance::{SchemaVariance, detect_schema_variance};
pub use self::sharing_scope::{SharingScope, SharingScopeResolver};
pub use self::team_context::{
    CONTEXT_PRECEDENCE, ContextSource, TeamContext, TeamContextResolver,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use access_engine::domain::{ApiResult, Error};
///
/// fn gate(entitled: bool) -> ApiResult<()> {
///     if entitled { Ok(()) } else { Err(Error::access_denied()) }
/// }
///
/// assert!(gate(false).is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
