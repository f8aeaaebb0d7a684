//! Test utilities for the access engine.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

mod in_memory_directory;

pub use in_memory_directory::{InMemoryDirectory, Table};

use crate::domain::{TeamId, UserId};

/// Build a user id from a literal, panicking on invalid fixtures.
///
/// # Panics
///
/// Panics when `raw` is not a valid identifier.
pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw).unwrap_or_else(|error| panic!("invalid fixture user id {raw:?}: {error}"))
}

/// Build a team id from a literal, panicking on invalid fixtures.
///
/// # Panics
///
/// Panics when `raw` is not a valid identifier.
pub fn team_id(raw: &str) -> TeamId {
    TeamId::new(raw).unwrap_or_else(|error| panic!("invalid fixture team id {raw:?}: {error}"))
}
