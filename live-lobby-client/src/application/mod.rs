mod config;
mod events;
mod session;

pub use config::{ClientConfig, SessionConfig};
pub use events::{dispatch, spawn_observer, LobbyObserver, SessionEvent, SessionEvents};
pub use session::LobbySession;
