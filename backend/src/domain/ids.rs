//! Identifier newtypes for users and teams.
//!
//! Identifiers are opaque strings issued by the persistence layer and the
//! identity provider. The only invariant the engine enforces is that they are
//! non-empty and carry no surrounding whitespace, so an empty column value can
//! never masquerade as a real owner id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by identifier constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    /// The identifier was empty.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier had leading or trailing whitespace.
    #[error("identifier must not contain surrounding whitespace")]
    Padded,
}

fn validate(raw: &str) -> Result<(), IdentifierValidationError> {
    if raw.is_empty() {
        return Err(IdentifierValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdentifierValidationError::Padded);
    }
    Ok(())
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(id: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                let id = id.into();
                validate(&id)?;
                Ok(Self(id))
            }

            /// Construct from an optional raw column value, dropping empty
            /// or malformed values.
            pub fn from_column(raw: Option<String>) -> Option<Self> {
                raw.and_then(|value| Self::new(value).ok())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_identifier! {
    /// Stable user identifier shared by the relational store and the
    /// identity provider.
    UserId
}

string_identifier! {
    /// Team identifier, as stored in `users.team_id` and `team_members`.
    TeamId
}
