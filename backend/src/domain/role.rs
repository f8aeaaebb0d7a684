//! Free-text user roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A role label as stored on the user row or in identity metadata.
///
/// Roles are free text in every source the engine reads. The value is kept
/// trimmed and lower-cased so all comparisons are case-insensitive.
///
/// # Examples
/// ```
/// use access_engine::domain::Role;
///
/// let role = Role::parse(" Team_Admin ").expect("non-empty role");
/// assert_eq!(role.as_str(), "team_admin");
/// assert!(Role::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Normalise a raw role, returning `None` when it is blank.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalised = raw.trim().to_lowercase();
        if normalised.is_empty() {
            None
        } else {
            Some(Self(normalised))
        }
    }

    /// Normalise an optional raw column value.
    pub fn from_column(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }

    /// Borrow the normalised role label.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Case-insensitive membership test against a fixed role set.
    pub fn is_one_of(&self, set: &[&str]) -> bool {
        set.contains(&self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(value.trim().to_lowercase())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.0
    }
}
