// Application layer (session, configuration, notifications)
pub mod application;

// Infrastructure layer (REST and WebSocket adapters)
pub mod infrastructure;

pub mod error;

// Re-exports for convenience
pub use application::{
    spawn_observer, ClientConfig, LobbyObserver, LobbySession, SessionConfig, SessionEvent,
    SessionEvents,
};
pub use error::{ErrorKind, Result, SessionError};
pub use infrastructure::{
    ChannelError, ChannelTransport, EventChannel, HttpMembershipStore, JoinOutcome,
    MembershipStore, StoreError, WebSocketEventChannel,
};
pub use live_lobby_core::{LobbyId, MembershipView, Participant, Role, SessionState, UserId};

/// Session wired to the REST store and WebSocket event channel
pub type RemoteLobbySession = LobbySession<HttpMembershipStore, WebSocketEventChannel>;

/// Build a [`RemoteLobbySession`] from client and session configuration
pub fn connect(
    client: &ClientConfig,
    session: SessionConfig,
) -> Result<(RemoteLobbySession, SessionEvents)> {
    client.validate()?;
    let store = HttpMembershipStore::new(client)
        .map_err(|e| SessionError::Configuration(e.to_string()))?;
    let channel = WebSocketEventChannel::from_config(client);
    LobbySession::new(session, store, channel)
}
