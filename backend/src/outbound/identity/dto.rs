//! DTOs for decoding identity provider user payloads.
//!
//! Providers store custom attributes in two free-form maps. Keys are looked
//! up in `user_metadata` first, then `app_metadata`, in both camelCase and
//! snake_case spellings. Non-string values are ignored.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{IdentityMetadata, Role, TeamId};

/// Role keys in precedence order, each with its alternative spelling.
const ROLE_KEYS: [&[&str]; 3] = [&["role"], &["accountType", "account_type"], &["userType", "user_type"]];

#[derive(Debug, Default, Deserialize)]
pub(super) struct IdentityUserDto {
    #[serde(default)]
    pub(super) email: Option<String>,
    /// Provider-level role of the principal.
    #[serde(default)]
    pub(super) role: Option<String>,
    #[serde(default)]
    pub(super) user_metadata: Map<String, Value>,
    #[serde(default)]
    pub(super) app_metadata: Map<String, Value>,
}

impl IdentityUserDto {
    pub(super) fn into_metadata(self) -> IdentityMetadata {
        let role = ROLE_KEYS
            .iter()
            .find_map(|keys| self.lookup(keys).and_then(Role::parse));

        IdentityMetadata {
            team_id: self
                .lookup(&["teamId", "team_id"])
                .and_then(|raw| TeamId::from_column(Some(raw.trim().to_owned()))),
            role,
            provider_role: self.role.as_deref().and_then(Role::parse),
            email: self
                .lookup(&["email"])
                .map(str::to_owned)
                .or_else(|| self.email.clone())
                .and_then(non_blank),
            first_name: self
                .lookup(&["firstName", "first_name"])
                .map(str::to_owned)
                .and_then(non_blank),
            last_name: self
                .lookup(&["lastName", "last_name"])
                .map(str::to_owned)
                .and_then(non_blank),
        }
    }

    fn lookup(&self, keys: &[&str]) -> Option<&str> {
        [&self.user_metadata, &self.app_metadata]
            .into_iter()
            .flat_map(|map| keys.iter().filter_map(move |key| map.get(*key)))
            .filter_map(Value::as_str)
            .find(|value| !value.trim().is_empty())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
