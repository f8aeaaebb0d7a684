//! Errors surfaced by the inbound adapter.
//!
//! The resolvers never fail; these cover the remaining ways a request can go
//! wrong: no signed-in user, a refused entitlement, and session storage
//! faults.

use std::borrow::Cow;

use serde::Serialize;

/// Message returned when the entitlement gate denies a feature.
pub const ACCESS_DENIED_MESSAGE: &str = "access denied";

/// Stable machine-readable failure category, serialised in snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No authenticated user on the request.
    Unauthorized,
    /// The user is known but the feature is not available to them.
    Forbidden,
    /// Session storage or framework failure.
    InternalError,
}

/// Failure payload rendered as `{"code": ..., "message": ...}`.
///
/// # Examples
/// ```
/// use access_engine::domain::{Error, ErrorCode};
///
/// let err = Error::access_denied();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// assert_eq!(err.message(), "access denied");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Error {
    code: ErrorCode,
    message: Cow<'static, str>,
}

impl Error {
    fn with_code(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The request carries no usable session.
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_code(ErrorCode::Unauthorized, message)
    }

    /// The fixed response for a feature the entitlement gate refused.
    pub fn access_denied() -> Self {
        Self::with_code(ErrorCode::Forbidden, ACCESS_DENIED_MESSAGE)
    }

    /// An unexpected fault. The HTTP adapter redacts the message.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_code(ErrorCode::InternalError, message)
    }

    /// Whether the message may reach the client unredacted.
    pub fn is_internal(&self) -> bool {
        self.code == ErrorCode::InternalError
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
