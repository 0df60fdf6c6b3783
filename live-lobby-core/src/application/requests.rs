use crate::domain::{Participant, Role, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body of a membership store join request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
}

impl JoinRequest {
    pub fn new(user_id: UserId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            role,
        }
    }

    /// The participant this request registers
    pub fn into_participant(self) -> Result<Participant, crate::domain::LobbyError> {
        Participant::new(self.user_id, self.display_name, self.role)
    }
}

/// Body of a start request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub user_id: UserId,
}
