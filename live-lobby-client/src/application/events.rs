use crate::error::{ErrorKind, SessionError};
use live_lobby_core::{MembershipView, Outcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Notifications delivered to the consumer, in mutation order
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The membership view changed; carries a copy
    MembershipChanged(MembershipView),

    /// The activity started; delivered at most once per session
    Started,

    /// A recoverable or fatal error
    Error(SessionError),
}

impl From<Outcome> for SessionEvent {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::MembershipChanged(view) => SessionEvent::MembershipChanged(view),
            Outcome::Started => SessionEvent::Started,
        }
    }
}

/// Receiving end of a session's notification queue
pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

/// Callback-style consumer of session notifications
pub trait LobbyObserver: Send + 'static {
    fn on_membership_changed(&mut self, view: &MembershipView);

    fn on_started(&mut self);

    fn on_error(&mut self, kind: ErrorKind, detail: &str);
}

/// Dispatch one event to an observer
pub fn dispatch<O: LobbyObserver + ?Sized>(observer: &mut O, event: &SessionEvent) {
    match event {
        SessionEvent::MembershipChanged(view) => observer.on_membership_changed(view),
        SessionEvent::Started => observer.on_started(),
        SessionEvent::Error(e) => observer.on_error(e.kind(), &e.detail()),
    }
}

/// Drain the queue into an observer on a background task
///
/// The task ends once every sender is gone (the session was dropped) and
/// hands the observer back.
pub fn spawn_observer<O: LobbyObserver>(mut events: SessionEvents, mut observer: O) -> JoinHandle<O> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            dispatch(&mut observer, &event);
        }
        tracing::debug!("Session event queue closed, observer finished");
        observer
    })
}
