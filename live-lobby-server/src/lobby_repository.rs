use crate::error::Result;
use async_trait::async_trait;
use live_lobby_core::{LobbyId, Participant, UserId};

#[async_trait]
pub trait LobbyRepository: Send + Sync {
    /// Add a participant; returns `false` if the user ID is already present
    async fn add_participant(&self, lobby_id: &LobbyId, participant: Participant) -> Result<bool>;

    /// Remove a participant; returns `false` if it was not present
    async fn remove_participant(&self, lobby_id: &LobbyId, user_id: &UserId) -> Result<bool>;

    /// Participants in join order; empty for an unknown lobby
    async fn get_participants(&self, lobby_id: &LobbyId) -> Result<Vec<Participant>>;

    async fn get_participant(
        &self,
        lobby_id: &LobbyId,
        user_id: &UserId,
    ) -> Result<Option<Participant>>;
}
