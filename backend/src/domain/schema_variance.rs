//! Detection of schema differences between partially migrated environments.
//!
//! A table or column can be absent in one environment and present in
//! another. Persistence adapters run every failure through
//! [`detect_schema_variance`] so the resolvers can branch on a variant instead
//! of on backend-specific error shapes.

/// Schema element reported missing by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariance {
    /// The queried table or view does not exist.
    MissingRelation,
    /// A referenced column does not exist.
    MissingColumn,
}

const UNDEFINED_TABLE_CODES: &[&str] = &["42P01", "PGRST205"];
const UNDEFINED_COLUMN_CODES: &[&str] = &["42703", "PGRST204"];
const DOES_NOT_EXIST: &str = "does not exist";

/// Classify an error by its code and message.
///
/// Codes win when present. Otherwise the message is inspected; the column
/// check runs first because Postgres column errors also name the relation
/// (`column "team_id" of relation "users" does not exist`).
///
/// # Examples
/// ```
/// use access_engine::domain::{detect_schema_variance, SchemaVariance};
///
/// assert_eq!(
///     detect_schema_variance(None, r#"relation "team_members" does not exist"#),
///     Some(SchemaVariance::MissingRelation),
/// );
/// assert_eq!(detect_schema_variance(Some("23505"), "duplicate key"), None);
/// ```
pub fn detect_schema_variance(code: Option<&str>, message: &str) -> Option<SchemaVariance> {
    if let Some(code) = code.map(str::trim) {
        if UNDEFINED_TABLE_CODES.contains(&code) {
            return Some(SchemaVariance::MissingRelation);
        }
        if UNDEFINED_COLUMN_CODES.contains(&code) {
            return Some(SchemaVariance::MissingColumn);
        }
    }

    let message = message.to_lowercase();
    if !message.contains(DOES_NOT_EXIST) {
        return None;
    }
    if message.contains("column") {
        Some(SchemaVariance::MissingColumn)
    } else if message.contains("relation") || message.contains("table") {
        Some(SchemaVariance::MissingRelation)
    } else {
        None
    }
}
