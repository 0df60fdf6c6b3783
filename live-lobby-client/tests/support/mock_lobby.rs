use async_trait::async_trait;
use live_lobby_client::{
    ChannelError, ChannelTransport, EventChannel, JoinOutcome, MembershipStore, StoreError,
};
use live_lobby_core::{
    JoinRequest, LobbyBroadcast, LobbyId, Participant, StartRequest, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

/// Counters for every call a session makes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calls {
    pub joins: usize,
    pub lists: usize,
    pub leaves: usize,
    pub starts: usize,
    pub connects: usize,
    pub subscribes: usize,
    pub unsubscribes: usize,
    pub closes: usize,
}

impl Calls {
    /// Total number of calls that would hit the network
    pub fn network(&self) -> usize {
        self.joins
            + self.lists
            + self.leaves
            + self.starts
            + self.connects
            + self.subscribes
            + self.unsubscribes
            + self.closes
    }
}

/// Failure toggles
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub join: bool,
    pub list: bool,
    pub leave: bool,
    pub start: bool,
    pub connect: bool,
}

/// `None` tells a transport its connection dropped
type Inbox = mpsc::UnboundedSender<Option<String>>;

#[derive(Default)]
pub struct LobbyState {
    pub members: Vec<Participant>,
    pub calls: Calls,
    /// Order of leave/unsubscribe/close calls
    pub log: Vec<&'static str>,
    pub fail: Failures,
    pub join_delay: Option<Duration>,
    /// Members are read first, then the reply is held back this long
    pub list_delay: Option<Duration>,
    pub connect_delay: Option<Duration>,
    subscribers: HashMap<usize, Inbox>,
    next_connection: usize,
}

/// In-memory membership store and event channel for one lobby
///
/// Join broadcasts a JOIN delta, leave broadcasts a snapshot, start
/// broadcasts START. Every call is counted.
#[derive(Clone, Default)]
pub struct MockLobby {
    state: Arc<Mutex<LobbyState>>,
}

impl MockLobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, LobbyState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Calls {
        self.state().calls.clone()
    }

    pub fn store(&self) -> MockStore {
        MockStore {
            lobby: self.clone(),
        }
    }

    pub fn channel(&self) -> MockChannel {
        MockChannel {
            lobby: self.clone(),
        }
    }

    /// Seed a member without broadcasting
    pub fn seed(&self, participant: Participant) {
        self.state().members.push(participant);
    }

    /// Send a raw frame to every subscriber
    pub fn push_raw(&self, raw: impl Into<String>) {
        let raw = raw.into();
        let state = self.state();
        for inbox in state.subscribers.values() {
            let _ = inbox.send(Some(raw.clone()));
        }
    }

    pub fn broadcast(&self, message: &LobbyBroadcast) {
        self.push_raw(serde_json::to_string(message).unwrap());
    }

    /// Drop every open connection
    pub fn drop_connections(&self) {
        let mut state = self.state();
        for (_, inbox) in state.subscribers.drain() {
            let _ = inbox.send(None);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    fn snapshot(&self) -> LobbyBroadcast {
        LobbyBroadcast::Snapshot {
            participants: self.state().members.clone(),
        }
    }
}

pub struct MockStore {
    lobby: MockLobby,
}

#[async_trait]
impl MembershipStore for MockStore {
    async fn join(&self, _lobby: &LobbyId, request: &JoinRequest) -> Result<JoinOutcome, StoreError> {
        let delay = {
            let mut state = self.lobby.state();
            state.calls.joins += 1;
            state.join_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let participant = {
            let mut state = self.lobby.state();
            if state.fail.join {
                return Err(StoreError::Network("join refused by mock".to_string()));
            }
            if state.members.iter().any(|p| p.user_id() == &request.user_id) {
                return Ok(JoinOutcome::AlreadyJoined);
            }
            let participant = request
                .clone()
                .into_participant()
                .map_err(|e| StoreError::Status {
                    status: 422,
                    body: e.to_string(),
                })?;
            state.members.push(participant.clone());
            participant
        };

        self.lobby.broadcast(&LobbyBroadcast::Join { participant });
        Ok(JoinOutcome::Joined)
    }

    async fn list(&self, _lobby: &LobbyId) -> Result<Vec<Participant>, StoreError> {
        let (members, delay) = {
            let mut state = self.lobby.state();
            state.calls.lists += 1;
            if state.fail.list {
                return Err(StoreError::Status {
                    status: 500,
                    body: "list failed".to_string(),
                });
            }
            (state.members.clone(), state.list_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(members)
    }

    async fn leave(&self, _lobby: &LobbyId, user: &UserId) -> Result<(), StoreError> {
        {
            let mut state = self.lobby.state();
            state.calls.leaves += 1;
            state.log.push("leave");
            if state.fail.leave {
                return Err(StoreError::Network("leave refused by mock".to_string()));
            }
            state.members.retain(|p| p.user_id() != user);
        }

        let snapshot = self.lobby.snapshot();
        self.lobby.broadcast(&snapshot);
        Ok(())
    }

    async fn start(&self, _lobby: &LobbyId, request: &StartRequest) -> Result<(), StoreError> {
        {
            let mut state = self.lobby.state();
            state.calls.starts += 1;
            if state.fail.start {
                return Err(StoreError::Forbidden("start refused by mock".to_string()));
            }
        }

        self.lobby.broadcast(&LobbyBroadcast::Start {
            started_by: request.user_id.clone(),
        });
        Ok(())
    }
}

pub struct MockChannel {
    lobby: MockLobby,
}

#[async_trait]
impl EventChannel for MockChannel {
    type Transport = MockTransport;

    async fn connect(&self) -> Result<MockTransport, ChannelError> {
        let delay = self.lobby.state().connect_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lobby.state();
        state.calls.connects += 1;
        if state.fail.connect {
            return Err(ChannelError::ConnectionFailed("connect refused by mock".to_string()));
        }

        let id = state.next_connection;
        state.next_connection += 1;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(MockTransport {
            id,
            lobby: self.lobby.clone(),
            tx,
            rx,
        })
    }
}

pub struct MockTransport {
    id: usize,
    lobby: MockLobby,
    tx: Inbox,
    rx: mpsc::UnboundedReceiver<Option<String>>,
}

#[async_trait]
impl ChannelTransport for MockTransport {
    async fn subscribe(&mut self, _topic: &LobbyId) -> Result<(), ChannelError> {
        let mut state = self.lobby.state();
        state.calls.subscribes += 1;
        state.subscribers.insert(self.id, self.tx.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        match self.rx.recv().await {
            Some(Some(raw)) => Ok(Some(raw)),
            Some(None) => Err(ChannelError::ReceiveFailed("connection dropped".to_string())),
            None => Ok(None),
        }
    }

    async fn unsubscribe(&mut self, _topic: &LobbyId) -> Result<(), ChannelError> {
        let mut state = self.lobby.state();
        state.calls.unsubscribes += 1;
        state.log.push("unsubscribe");
        state.subscribers.remove(&self.id);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        let mut state = self.lobby.state();
        state.calls.closes += 1;
        state.log.push("close");
        state.subscribers.remove(&self.id);
        Ok(())
    }
}
