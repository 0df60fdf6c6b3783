use crate::infrastructure::error::ChannelError;
use async_trait::async_trait;
use live_lobby_core::LobbyId;

/// Factory for event channel connections (allows mocking in tests)
#[async_trait]
pub trait EventChannel: Send + Sync + 'static {
    type Transport: ChannelTransport;

    /// Open a fresh transport connection; each session owns its own
    async fn connect(&self) -> Result<Self::Transport, ChannelError>;
}

/// One open event channel connection
#[async_trait]
pub trait ChannelTransport: Send + 'static {
    async fn subscribe(&mut self, topic: &LobbyId) -> Result<(), ChannelError>;

    /// Next text message, `Ok(None)` once the remote side closed
    ///
    /// Must be cancel safe: the session races it against shutdown.
    async fn recv(&mut self) -> Result<Option<String>, ChannelError>;

    async fn unsubscribe(&mut self, topic: &LobbyId) -> Result<(), ChannelError>;

    async fn close(&mut self) -> Result<(), ChannelError>;
}
