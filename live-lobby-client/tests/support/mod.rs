#![allow(dead_code)]

pub mod mock_lobby;

use live_lobby_client::{LobbySession, SessionConfig, SessionEvent, SessionEvents};
use live_lobby_core::{Participant, UserId};
use mock_lobby::{MockChannel, MockLobby, MockStore};
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type MockSession = LobbySession<MockStore, MockChannel>;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

pub fn member(id: &str) -> Participant {
    Participant::member(UserId::parse(id).unwrap(), id.to_uppercase()).unwrap()
}

pub fn coordinator(id: &str) -> Participant {
    Participant::coordinator(UserId::parse(id).unwrap(), id.to_uppercase()).unwrap()
}

pub fn session(lobby: &MockLobby, config: SessionConfig) -> (MockSession, SessionEvents) {
    LobbySession::new(config, lobby.store(), lobby.channel()).unwrap()
}

/// Everything currently queued, without waiting
pub fn drain(events: &mut SessionEvents) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Wait until an event matching `predicate` arrives; returns everything seen
pub async fn wait_for(
    events: &mut SessionEvents,
    predicate: impl Fn(&SessionEvent) -> bool,
) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    let result = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(event) = events.recv().await {
            let matched = predicate(&event);
            seen.push(event);
            if matched {
                return true;
            }
        }
        false
    })
    .await;

    assert!(
        matches!(result, Ok(true)),
        "Timed out waiting for event, saw {:?}",
        seen
    );
    seen
}

/// Poll `condition` until it holds or two seconds pass
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Condition did not become true in time");
}

/// Let spawned pumps process whatever is already queued
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub fn user_ids(event: &SessionEvent) -> Option<Vec<String>> {
    match event {
        SessionEvent::MembershipChanged(view) => {
            Some(view.iter().map(|p| p.user_id().to_string()).collect())
        }
        _ => None,
    }
}

pub fn started_count(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Started))
        .count()
}

pub fn errors(events: &[SessionEvent]) -> Vec<&live_lobby_client::SessionError> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Error(err) => Some(err),
            _ => None,
        })
        .collect()
}
