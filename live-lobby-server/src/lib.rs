//! In-memory reference implementation of the lobby membership store and
//! event channel.
//!
//! REST:
//! - `POST /lobbies/{lobbyId}/participants` joins (409 if already joined)
//! - `GET /lobbies/{lobbyId}/participants` lists in join order
//! - `DELETE /lobbies/{lobbyId}/participants/{userId}` leaves
//! - `POST /lobbies/{lobbyId}/start` starts (coordinators only)
//!
//! WebSocket at `/events`: clients send `subscribe`/`unsubscribe` frames and
//! receive a snapshot on subscribe, then JOIN deltas, snapshots after
//! leaves, and START.

pub mod config;
pub mod error;
pub mod hub;
pub mod lobby_repository;
pub mod memory_storage;
pub mod route;
pub mod server;
pub mod websocket_listener;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use hub::TopicHub;
pub use lobby_repository::LobbyRepository;
pub use memory_storage::MemoryStorage;
pub use route::{create_lobby_routes, AppState};
pub use server::{LobbyServer, RunningServer};
