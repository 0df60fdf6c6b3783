use crate::domain::{LobbyError, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_DISPLAY_NAME_LEN: usize = 50;

/// Role within the lobby
///
/// Only used for UI gating on the client. The membership store is the
/// authority on who may start an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// May issue the start command (the instructor of a classroom)
    #[serde(alias = "coordinator")]
    Coordinator,
    /// Regular participant waiting for the start signal
    #[serde(alias = "member")]
    Member,
}

impl Role {
    pub fn is_coordinator(&self) -> bool {
        matches!(self, Role::Coordinator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Coordinator => write!(f, "Coordinator"),
            Role::Member => write!(f, "Member"),
        }
    }
}

/// A participant of a lobby, identified by its user ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    user_id: UserId,
    #[serde(default)]
    display_name: String,
    role: Role,
}

impl Participant {
    /// Create a participant, validating the display name
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        role: Role,
    ) -> Result<Self, LobbyError> {
        let display_name = display_name.into();
        if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(LobbyError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_LEN,
            });
        }

        Ok(Participant {
            user_id,
            display_name,
            role,
        })
    }

    pub fn coordinator(user_id: UserId, display_name: impl Into<String>) -> Result<Self, LobbyError> {
        Self::new(user_id, display_name, Role::Coordinator)
    }

    pub fn member(user_id: UserId, display_name: impl Into<String>) -> Result<Self, LobbyError> {
        Self::new(user_id, display_name, Role::Member)
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Display name, falling back to the user ID when the store sent none
    pub fn display_name(&self) -> &str {
        if self.display_name.is_empty() {
            self.user_id.as_str()
        } else {
            &self.display_name
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_coordinator(&self) -> bool {
        self.role.is_coordinator()
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    #[test]
    fn test_create_coordinator() {
        let instructor = Participant::coordinator(user("t1"), "Ms. Frizzle").unwrap();

        assert_eq!(instructor.user_id().as_str(), "t1");
        assert_eq!(instructor.display_name(), "Ms. Frizzle");
        assert_eq!(instructor.role(), Role::Coordinator);
        assert!(instructor.is_coordinator());
    }

    #[test]
    fn test_create_member() {
        let student = Participant::member(user("s1"), "Arnold").unwrap();

        assert_eq!(student.role(), Role::Member);
        assert!(!student.is_coordinator());
    }

    #[test]
    fn test_display_name_length_validation() {
        let result = Participant::member(user("s1"), "a".repeat(51));

        assert_eq!(result, Err(LobbyError::DisplayNameTooLong { max: 50 }));
    }

    #[test]
    fn test_display_name_falls_back_to_user_id() {
        let participant: Participant =
            serde_json::from_str(r#"{"userId":"s7","role":"MEMBER"}"#).unwrap();

        assert_eq!(participant.display_name(), "s7");
    }

    #[test]
    fn test_wire_format() {
        let participant = Participant::coordinator(user("t1"), "Teach").unwrap();
        let json = serde_json::to_value(&participant).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"userId": "t1", "displayName": "Teach", "role": "COORDINATOR"})
        );
    }

    #[test]
    fn test_role_accepts_lowercase() {
        let role: Role = serde_json::from_str("\"member\"").unwrap();
        assert_eq!(role, Role::Member);

        let role: Role = serde_json::from_str("\"coordinator\"").unwrap();
        assert_eq!(role, Role::Coordinator);
    }
}
