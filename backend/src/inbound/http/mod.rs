//! HTTP inbound adapter exposing the access resolution endpoints.

pub mod access;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
