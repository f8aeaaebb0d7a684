//! Access resolution HTTP handlers.
//!
//! ```text
//! GET /api/v1/access/context
//! GET /api/v1/access/scope
//! GET /api/v1/access/entitlement
//! ```
//!
//! Paid-feature handlers elsewhere gate themselves with
//! [`require_entitlement`].

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Response payload for the entitlement probe.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitlementResponse {
    pub entitled: bool,
}

/// Reject the request with the fixed access-denied error unless `user_id`
/// is entitled to paid features.
///
/// # Errors
///
/// Returns [`Error::access_denied`] when the gate answers `false`.
pub async fn require_entitlement(state: &HttpState, user_id: &UserId) -> ApiResult<()> {
    if state.entitlement.is_entitled(user_id).await {
        Ok(())
    } else {
        debug!(user_id = %user_id, "paid feature refused");
        Err(Error::access_denied())
    }
}

/// Team and role resolved for the session user.
#[get("/access/context")]
pub async fn get_context(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let context = state.context.resolve_context(&user_id).await;
    Ok(private_json().json(context))
}

/// Sharing scope for the session user.
#[get("/access/scope")]
pub async fn get_scope(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let scope = state.scope.resolve_scope(&user_id).await;
    Ok(private_json().json(scope))
}

/// Whether the session user may use paid features.
#[get("/access/entitlement")]
pub async fn get_entitlement(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let entitled = state.entitlement.is_entitled(&user_id).await;
    Ok(private_json().json(EntitlementResponse { entitled }))
}

fn private_json() -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder.insert_header(("Cache-Control", "private, no-store"));
    builder
}
