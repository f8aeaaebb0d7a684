//! Port for the external identity provider.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{IdentityMetadata, UserId};

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider could not be reached or timed out.
        Transport { message: String } => "identity provider unreachable: {message}",
        /// The provider answered with an unexpected status.
        Status { status: u16 } => "identity provider returned status {status}",
        /// The provider's payload could not be decoded.
        Decode { message: String } => "identity provider payload invalid: {message}",
    }
}

/// Metadata attached to the authenticated principal, independent of the
/// relational store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch metadata for the user; `Ok(None)` when the principal is unknown.
    async fn fetch_metadata(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityMetadata>, IdentityProviderError>;
}

/// Identity provider used when no provider endpoint is configured.
///
/// Every lookup reports an unknown principal, so resolution relies on the
/// relational sources alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn fetch_metadata(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<IdentityMetadata>, IdentityProviderError> {
        Ok(None)
    }
}
