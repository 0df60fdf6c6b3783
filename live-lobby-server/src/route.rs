use crate::error::{Result, ServerError};
use crate::hub::TopicHub;
use crate::lobby_repository::LobbyRepository;
use crate::websocket_listener;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use live_lobby_core::{JoinRequest, LobbyBroadcast, LobbyId, Participant, StartRequest, UserId};
use std::sync::Arc;
use tracing::info;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn LobbyRepository>,
    pub hub: TopicHub,
}

impl AppState {
    pub fn new(repository: Arc<dyn LobbyRepository>, hub: TopicHub) -> Self {
        Self { repository, hub }
    }

    pub async fn snapshot(&self, lobby_id: &LobbyId) -> Result<LobbyBroadcast> {
        Ok(LobbyBroadcast::Snapshot {
            participants: self.repository.get_participants(lobby_id).await?,
        })
    }
}

pub fn create_lobby_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/lobbies/:lobby_id/participants",
            post(join_lobby).get(list_participants),
        )
        .route(
            "/lobbies/:lobby_id/participants/:user_id",
            delete(leave_lobby),
        )
        .route("/lobbies/:lobby_id/start", post(start_activity))
        .route("/events", get(websocket_listener::handle_websocket))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn join_lobby(
    State(state): State<AppState>,
    Path(lobby_id): Path<LobbyId>,
    Json(request): Json<JoinRequest>,
) -> Result<(StatusCode, Json<Participant>)> {
    let participant = request.into_participant()?;

    if !state
        .repository
        .add_participant(&lobby_id, participant.clone())
        .await?
    {
        return Err(ServerError::Conflict(participant.user_id().to_string()));
    }

    info!(%lobby_id, user_id = %participant.user_id(), "🟢 Participant joined");
    state.hub.publish(
        &lobby_id,
        &LobbyBroadcast::Join {
            participant: participant.clone(),
        },
    )?;

    Ok((StatusCode::CREATED, Json(participant)))
}

async fn list_participants(
    State(state): State<AppState>,
    Path(lobby_id): Path<LobbyId>,
) -> Result<Json<Vec<Participant>>> {
    Ok(Json(state.repository.get_participants(&lobby_id).await?))
}

async fn leave_lobby(
    State(state): State<AppState>,
    Path((lobby_id, user_id)): Path<(LobbyId, UserId)>,
) -> Result<StatusCode> {
    if !state.repository.remove_participant(&lobby_id, &user_id).await? {
        return Err(ServerError::NotFound(user_id.to_string()));
    }

    info!(%lobby_id, %user_id, "🔴 Participant left");
    let snapshot = state.snapshot(&lobby_id).await?;
    state.hub.publish(&lobby_id, &snapshot)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn start_activity(
    State(state): State<AppState>,
    Path(lobby_id): Path<LobbyId>,
    Json(request): Json<StartRequest>,
) -> Result<StatusCode> {
    let participant = state
        .repository
        .get_participant(&lobby_id, &request.user_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(request.user_id.to_string()))?;

    if !participant.is_coordinator() {
        return Err(ServerError::Forbidden(format!(
            "{} is not a coordinator",
            request.user_id
        )));
    }

    info!(%lobby_id, started_by = %request.user_id, "🚀 Activity started");
    state.hub.publish(
        &lobby_id,
        &LobbyBroadcast::Start {
            started_by: request.user_id,
        },
    )?;

    Ok(StatusCode::OK)
}
