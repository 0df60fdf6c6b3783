use crate::application::ClientConfig;
use crate::infrastructure::channel::{ChannelTransport, EventChannel};
use crate::infrastructure::error::ChannelError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use live_lobby_core::{ClientFrame, LobbyId};
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Event channel reached over a WebSocket
#[derive(Debug, Clone)]
pub struct WebSocketEventChannel {
    url: String,
}

impl WebSocketEventChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.events_url.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventChannel for WebSocketEventChannel {
    type Transport = WebSocketTransport;

    async fn connect(&self) -> Result<WebSocketTransport, ChannelError> {
        tracing::debug!("🔌 Connecting to {}", self.url);

        let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?;

        tracing::info!("🟢 Event channel connected");
        Ok(WebSocketTransport {
            stream,
            closed: false,
        })
    }
}

/// One open WebSocket, owned by a single session
pub struct WebSocketTransport {
    stream: WsStream,
    closed: bool,
}

impl WebSocketTransport {
    async fn send_frame(&mut self, frame: &ClientFrame) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::ChannelClosed);
        }

        let text = serde_json::to_string(frame)?;
        tracing::trace!("📤 {}", text);
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }
}

#[async_trait]
impl ChannelTransport for WebSocketTransport {
    async fn subscribe(&mut self, topic: &LobbyId) -> Result<(), ChannelError> {
        self.send_frame(&ClientFrame::Subscribe {
            topic: topic.clone(),
        })
        .await
    }

    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        if self.closed {
            return Ok(None);
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(Some(text)),
                    Err(_) => {
                        tracing::warn!("Ignoring non-UTF-8 binary frame ({} bytes)", data.len());
                        continue;
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("🔴 Event channel closed by server");
                    self.closed = true;
                    return Ok(None);
                }
                // Ping/Pong/Frame - tungstenite answers pings itself
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.closed = true;
                    return Err(e.into());
                }
            }
        }
    }

    async fn unsubscribe(&mut self, topic: &LobbyId) -> Result<(), ChannelError> {
        self.send_frame(&ClientFrame::Unsubscribe {
            topic: topic.clone(),
        })
        .await
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.stream
            .close(None)
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        tracing::info!("🔴 Event channel closed");
        Ok(())
    }
}
