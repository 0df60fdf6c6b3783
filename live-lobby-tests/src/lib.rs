use cucumber::World;
use live_lobby_client::{
    connect, ClientConfig, MembershipView, RemoteLobbySession, Role, SessionConfig, SessionError,
    SessionEvent, SessionEvents,
};
use live_lobby_server::{LobbyServer, RunningServer, ServerConfig};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

const WAIT_LIMIT: Duration = Duration::from_secs(2);

/// One mounted session plus everything it has notified so far
pub struct Mounted {
    pub session: RemoteLobbySession,
    pub events: SessionEvents,
    pub seen: Vec<SessionEvent>,
}

impl Mounted {
    /// Move queued notifications into `seen`
    pub fn collect(&mut self) -> &[SessionEvent] {
        while let Ok(event) = self.events.try_recv() {
            self.seen.push(event);
        }
        &self.seen
    }

    pub fn started_count(&mut self) -> usize {
        self.collect()
            .iter()
            .filter(|e| matches!(e, SessionEvent::Started))
            .count()
    }

    pub fn errors(&mut self) -> Vec<SessionError> {
        self.collect()
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Error(err) => Some(err.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(World, Default)]
pub struct LobbyWorld {
    /// Reference server on an ephemeral loopback port
    pub server: Option<RunningServer>,

    /// Mounted sessions by label (usually the user ID)
    pub sessions: HashMap<String, Mounted>,

    /// Views remembered for later comparison
    pub remembered: HashMap<String, MembershipView>,

    /// Last error returned by a session call
    pub last_error: Option<SessionError>,
}

impl fmt::Debug for LobbyWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LobbyWorld")
            .field("server", &self.server.as_ref().map(|s| s.addr()))
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl LobbyWorld {
    pub async fn start_server(&mut self) {
        let server = LobbyServer::bind(ServerConfig::ephemeral())
            .await
            .expect("Failed to bind lobby server")
            .spawn()
            .expect("Failed to spawn lobby server");
        self.server = Some(server);
    }

    pub fn client_config(&self) -> ClientConfig {
        let server = self.server.as_ref().expect("No lobby server running");
        ClientConfig::new(server.api_url(), server.events_url())
    }

    /// Mount a session under `label` and run its join handshake
    pub async fn mount(&mut self, label: &str, lobby: &str, user: &str, role: Role) {
        let config = SessionConfig::new(lobby, user, role);
        let (session, events) =
            connect(&self.client_config(), config).expect("Failed to build session");

        self.last_error = session.start().await.err();
        self.sessions.insert(
            label.to_string(),
            Mounted {
                session,
                events,
                seen: Vec::new(),
            },
        );
    }

    pub fn mounted(&mut self, label: &str) -> &mut Mounted {
        self.sessions
            .get_mut(label)
            .unwrap_or_else(|| panic!("Session '{}' not mounted", label))
    }

    /// Poll until `condition` holds for the session or the wait limit passes
    pub async fn eventually<F>(&mut self, label: &str, condition: F) -> bool
    where
        F: Fn(&mut Mounted) -> bool,
    {
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
        loop {
            if condition(self.mounted(label)) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
