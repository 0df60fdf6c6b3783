use crate::error::ServerError;
use crate::route::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use live_lobby_core::{ClientFrame, LobbyId};
use std::collections::HashMap;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| listen(socket, state))
}

/// Forwarder tasks of one connection, aborted when it goes away
#[derive(Default)]
struct Subscriptions(HashMap<LobbyId, JoinHandle<()>>);

impl Drop for Subscriptions {
    fn drop(&mut self) {
        for (_, task) in self.0.drain() {
            task.abort();
        }
    }
}

async fn listen(socket: WebSocket, state: AppState) {
    let (ws_sender, ws_receiver) = socket.split();
    let (tx, rx) = mpsc::channel(64);

    let sender_task = handle_outgoing_messages(rx, ws_sender);
    let receiver_task = handle_incoming_messages(ws_receiver, tx, state.clone());

    tokio::select! {
        _ = sender_task => {
            tracing::debug!("Sender task completed");
        }
        _ = receiver_task => {
            tracing::debug!("Receiver task completed");
        }
    }

    state.hub.prune();
}

async fn handle_outgoing_messages(
    mut rx: mpsc::Receiver<Message>,
    mut ws_sender: SplitSink<WebSocket, Message>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = ws_sender.send(msg).await {
            tracing::warn!("Failed to send message: {:?}", e);
            break;
        }
    }
}

async fn handle_incoming_messages(
    mut receiver: SplitStream<WebSocket>,
    tx: mpsc::Sender<Message>,
    state: AppState,
) {
    let mut subscriptions = Subscriptions::default();

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => handle_frame(frame, &tx, &state, &mut subscriptions).await,
                Err(e) => tracing::warn!("Ignoring malformed client frame: {}", e),
            },
            Ok(Message::Close(_)) => {
                tracing::debug!("Client closed event channel");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Failed to receive message: {:?}", e);
                break;
            }
        }
    }
}

async fn handle_frame(
    frame: ClientFrame,
    tx: &mpsc::Sender<Message>,
    state: &AppState,
    subscriptions: &mut Subscriptions,
) {
    match frame {
        ClientFrame::Subscribe { topic } => {
            if subscriptions.0.contains_key(&topic) {
                tracing::debug!(%topic, "Already subscribed");
                return;
            }

            // Register before reading the snapshot so no change falls in between
            let receiver = match state.hub.subscribe(&topic) {
                Ok(receiver) => receiver,
                Err(e) => {
                    tracing::error!(%topic, "Subscribe failed: {}", e);
                    return;
                }
            };
            if !send_snapshot(tx, state, &topic).await {
                return;
            }

            tracing::info!(%topic, "📡 Subscribed");
            let task = tokio::spawn(forward(receiver, tx.clone(), state.clone(), topic.clone()));
            subscriptions.0.insert(topic, task);
        }
        ClientFrame::Unsubscribe { topic } => {
            if let Some(task) = subscriptions.0.remove(&topic) {
                task.abort();
                tracing::info!(%topic, "Unsubscribed");
            }
        }
    }
}

/// Push the current membership of `topic`; `false` if the connection is gone
async fn send_snapshot(tx: &mpsc::Sender<Message>, state: &AppState, topic: &LobbyId) -> bool {
    let text = match state
        .snapshot(topic)
        .await
        .and_then(|s| {
            serde_json::to_string(&s).map_err(|e| ServerError::InternalError(e.to_string()))
        })
    {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(%topic, "Failed to build snapshot: {}", e);
            return true;
        }
    };
    tx.send(Message::Text(text)).await.is_ok()
}

async fn forward(
    mut receiver: broadcast::Receiver<String>,
    tx: mpsc::Sender<Message>,
    state: AppState,
    topic: LobbyId,
) {
    loop {
        match receiver.recv().await {
            Ok(text) => {
                if tx.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(%topic, skipped, "Subscriber lagged, resending snapshot");
                if !send_snapshot(&tx, &state, &topic).await {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}
