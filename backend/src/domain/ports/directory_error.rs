//! Error type shared by the relational directory ports.

use super::define_port_error;
use crate::domain::SchemaVariance;

define_port_error! {
    /// Failures raised by adapters over the relational store.
    ///
    /// `MissingRelation` and `MissingColumn` are expected in environments
    /// that are part-way through a migration; resolvers treat them as "this
    /// source does not exist here" rather than as failures.
    pub enum DirectoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "directory connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "directory query failed: {message}",
        /// The queried table does not exist in this environment.
        MissingRelation { message: String } => "relation missing: {message}",
        /// A referenced column does not exist in this environment.
        MissingColumn { message: String } => "column missing: {message}",
    }
}

impl DirectoryError {
    /// Build the error variant for a detected schema difference.
    pub fn from_variance(variance: SchemaVariance, message: impl Into<String>) -> Self {
        match variance {
            SchemaVariance::MissingRelation => Self::missing_relation(message),
            SchemaVariance::MissingColumn => Self::missing_column(message),
        }
    }

    /// Whether the failure reflects schema drift rather than a fault.
    pub fn is_schema_variance(&self) -> bool {
        self.is_missing_relation() || self.is_missing_column()
    }
}
