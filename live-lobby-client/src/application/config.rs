use crate::error::{Result, SessionError};
use live_lobby_core::{LobbyId, Participant, Role, UserId};
use std::time::Duration;

/// Identity and lifecycle options for one lobby session
///
/// Identity is always passed in explicitly by the consumer. IDs are kept raw
/// here and validated when the session is constructed.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub lobby_id: String,
    pub user_id: String,
    pub role: Role,

    /// Shown to other participants; defaults to the user ID
    pub display_name: Option<String>,

    /// Absorb the first `teardown()` call (mount/discard/remount hosts)
    pub skip_first_teardown: bool,
}

impl SessionConfig {
    pub fn new(lobby_id: impl Into<String>, user_id: impl Into<String>, role: Role) -> Self {
        Self {
            lobby_id: lobby_id.into(),
            user_id: user_id.into(),
            role,
            display_name: None,
            skip_first_teardown: false,
        }
    }

    pub fn coordinator(lobby_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(lobby_id, user_id, Role::Coordinator)
    }

    pub fn member(lobby_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(lobby_id, user_id, Role::Member)
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_skip_first_teardown(mut self, skip: bool) -> Self {
        self.skip_first_teardown = skip;
        self
    }

    /// Check the IDs and display name without touching the network
    pub fn validate(&self) -> Result<(LobbyId, UserId)> {
        let lobby_id = LobbyId::parse(self.lobby_id.as_str())?;
        let user_id = UserId::parse(self.user_id.as_str())?;

        // Same rule the store applies on join
        Participant::new(user_id.clone(), self.display_name(), self.role)?;

        Ok((lobby_id, user_id))
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Where the membership store and event channel live
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL, e.g. `http://127.0.0.1:3000`
    pub api_base_url: String,

    /// WebSocket URL of the event channel
    pub events_url: String,

    /// Bearer token sent with every REST request
    pub auth_token: Option<String>,

    /// Per-request timeout for REST calls
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".to_string(),
            events_url: "ws://127.0.0.1:3000/events".to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>, events_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            events_url: events_url.into(),
            ..Default::default()
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(SessionError::Configuration(
                "API base URL cannot be empty".to_string(),
            ));
        }
        if !(self.events_url.starts_with("ws://") || self.events_url.starts_with("wss://")) {
            return Err(SessionError::Configuration(format!(
                "Event channel URL must be ws:// or wss://, got {}",
                self.events_url
            )));
        }
        Ok(())
    }
}
