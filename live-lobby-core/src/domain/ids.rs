use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation errors for lobby identifiers and participants
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("Lobby ID cannot be empty")]
    EmptyLobbyId,

    #[error("User ID cannot be empty")]
    EmptyUserId,

    #[error("Display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $empty:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting empty (or whitespace-only) input
            pub fn parse(raw: impl Into<String>) -> Result<Self, LobbyError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err($empty);
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = LobbyError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl JsonSchema for $name {
            fn schema_name() -> String {
                stringify!($name).to_string()
            }

            fn json_schema(gen: &mut SchemaGenerator) -> Schema {
                String::json_schema(gen)
            }
        }
    };
}

opaque_id!(
    /// Opaque identifier of one live-activity lobby, stable for its lifetime
    LobbyId,
    LobbyError::EmptyLobbyId
);

opaque_id!(
    /// Opaque identifier of one user; the identity key of a participant
    UserId,
    LobbyError::EmptyUserId
);
