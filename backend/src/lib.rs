//! Identity and access resolution for the recruiting CRM backend.
//!
//! Given only a user identifier, the engine reconstructs the user's team and
//! role from several partially migrated sources, computes which record owners
//! the user may see, and decides whether a paid feature is entitled.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
