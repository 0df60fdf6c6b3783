use crate::error::{Result, ServerError};
use crate::lobby_repository::LobbyRepository;
use async_trait::async_trait;
use live_lobby_core::{LobbyId, Participant, UserId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, instrument};

/// In-memory lobby membership; nothing survives a restart
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    lobbies: Arc<RwLock<HashMap<LobbyId, Vec<Participant>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LobbyRepository for MemoryStorage {
    #[instrument(skip(self, participant), fields(user_id = %participant.user_id()))]
    async fn add_participant(&self, lobby_id: &LobbyId, participant: Participant) -> Result<bool> {
        debug!(%lobby_id, "Adding participant");
        match self.lobbies.write() {
            Ok(mut lobbies) => {
                let members = lobbies.entry(lobby_id.clone()).or_default();
                if members.iter().any(|p| p.user_id() == participant.user_id()) {
                    debug!("Participant already present");
                    return Ok(false);
                }
                members.push(participant);
                debug!(count = members.len(), "Participant added");
                Ok(true)
            }
            Err(e) => {
                error!(?e, "Failed to add participant");
                Err(ServerError::InternalError(e.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn remove_participant(&self, lobby_id: &LobbyId, user_id: &UserId) -> Result<bool> {
        debug!("Removing participant");
        match self.lobbies.write() {
            Ok(mut lobbies) => {
                let Some(members) = lobbies.get_mut(lobby_id) else {
                    return Ok(false);
                };
                let before = members.len();
                members.retain(|p| p.user_id() != user_id);
                let removed = members.len() != before;
                if members.is_empty() {
                    lobbies.remove(lobby_id);
                }
                Ok(removed)
            }
            Err(e) => {
                error!(?e, "Failed to remove participant");
                Err(ServerError::InternalError(e.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_participants(&self, lobby_id: &LobbyId) -> Result<Vec<Participant>> {
        match self.lobbies.read() {
            Ok(lobbies) => Ok(lobbies.get(lobby_id).cloned().unwrap_or_default()),
            Err(e) => Err(ServerError::InternalError(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn get_participant(
        &self,
        lobby_id: &LobbyId,
        user_id: &UserId,
    ) -> Result<Option<Participant>> {
        match self.lobbies.read() {
            Ok(lobbies) => Ok(lobbies
                .get(lobby_id)
                .and_then(|members| members.iter().find(|p| p.user_id() == user_id))
                .cloned()),
            Err(e) => Err(ServerError::InternalError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> LobbyId {
        LobbyId::parse("L1").unwrap()
    }

    fn member(id: &str) -> Participant {
        Participant::member(UserId::parse(id).unwrap(), id).unwrap()
    }

    #[tokio::test]
    async fn test_add_participant() {
        let storage = MemoryStorage::new();

        assert!(storage.add_participant(&lobby(), member("a")).await.unwrap());
        assert_eq!(
            storage.get_participants(&lobby()).await.unwrap(),
            vec![member("a")]
        );
    }

    #[tokio::test]
    async fn test_add_duplicate_participant() {
        let storage = MemoryStorage::new();
        storage.add_participant(&lobby(), member("a")).await.unwrap();

        assert!(!storage.add_participant(&lobby(), member("a")).await.unwrap());
        assert_eq!(storage.get_participants(&lobby()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_participant() {
        let storage = MemoryStorage::new();
        let a = UserId::parse("a").unwrap();
        storage.add_participant(&lobby(), member("a")).await.unwrap();
        storage.add_participant(&lobby(), member("b")).await.unwrap();

        assert!(storage.remove_participant(&lobby(), &a).await.unwrap());
        assert!(!storage.remove_participant(&lobby(), &a).await.unwrap());
        assert_eq!(
            storage.get_participants(&lobby()).await.unwrap(),
            vec![member("b")]
        );
    }

    #[tokio::test]
    async fn test_get_participant() {
        let storage = MemoryStorage::new();
        storage.add_participant(&lobby(), member("a")).await.unwrap();

        let a = UserId::parse("a").unwrap();
        let z = UserId::parse("z").unwrap();
        assert_eq!(
            storage.get_participant(&lobby(), &a).await.unwrap(),
            Some(member("a"))
        );
        assert_eq!(storage.get_participant(&lobby(), &z).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_lobby_is_empty() {
        let storage = MemoryStorage::new();
        let other = LobbyId::parse("nope").unwrap();

        assert!(storage.get_participants(&other).await.unwrap().is_empty());
    }
}
