//! Reqwest-backed identity provider adapter.
//!
//! Fetches the principal from the provider's admin users endpoint using a
//! service key. The adapter owns transport details only: authentication
//! headers, timeout, status mapping and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::IdentityUserDto;
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{IdentityMetadata, UserId};

/// Identity provider adapter over HTTP.
pub struct HttpIdentityProvider {
    client: Client,
    base_url: Url,
    service_key: String,
}

impl HttpIdentityProvider {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            service_key: service_key.into(),
        })
    }

    fn user_url(&self, user_id: &UserId) -> Result<Url, IdentityProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| IdentityProviderError::transport("identity base URL cannot be a base"))?
            .pop_if_empty()
            .extend(["auth", "v1", "admin", "users", user_id.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_metadata(
        &self,
        user_id: &UserId,
    ) -> Result<Option<IdentityMetadata>, IdentityProviderError> {
        let response = self
            .client
            .get(self.user_url(user_id)?)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(IdentityProviderError::status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        parse_user(body.as_ref()).map(Some)
    }
}

fn parse_user(body: &[u8]) -> Result<IdentityMetadata, IdentityProviderError> {
    let decoded: IdentityUserDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::decode(format!("invalid identity user payload: {error}"))
    })?;
    Ok(decoded.into_metadata())
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(error.to_string())
}
