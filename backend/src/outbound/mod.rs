//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed directory ports using Diesel ORM
//! - **identity**: HTTP identity provider client
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no resolution logic.

pub mod identity;
pub mod persistence;
