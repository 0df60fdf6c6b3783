use crate::infrastructure::error::StoreError;
use async_trait::async_trait;
use live_lobby_core::{JoinRequest, LobbyId, Participant, StartRequest, UserId};

/// Result of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The participant was added
    Joined,
    /// The participant was already recorded (409); not an error
    AlreadyJoined,
}

/// Authoritative participant set per lobby (allows mocking in tests)
#[async_trait]
pub trait MembershipStore: Send + Sync + 'static {
    async fn join(&self, lobby: &LobbyId, request: &JoinRequest) -> Result<JoinOutcome, StoreError>;

    /// Current participants in store order
    async fn list(&self, lobby: &LobbyId) -> Result<Vec<Participant>, StoreError>;

    /// Remove a participant; an unknown participant is not an error
    async fn leave(&self, lobby: &LobbyId, user: &UserId) -> Result<(), StoreError>;

    async fn start(&self, lobby: &LobbyId, request: &StartRequest) -> Result<(), StoreError>;
}
