use crate::config::ServerConfig;
use crate::error::Result;
use crate::hub::TopicHub;
use crate::lobby_repository::LobbyRepository;
use crate::memory_storage::MemoryStorage;
use crate::route::{create_lobby_routes, AppState};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Reference membership store and event channel on one listener
pub struct LobbyServer {
    listener: TcpListener,
    router: Router,
}

impl LobbyServer {
    /// Bind with in-memory storage
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        Self::bind_with(config, Arc::new(MemoryStorage::new())).await
    }

    pub async fn bind_with(
        config: ServerConfig,
        repository: Arc<dyn LobbyRepository>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(config.bind).await?;
        let state = AppState::new(repository, TopicHub::new(config.topic_capacity));

        tracing::info!("Lobby server listening on http://{}", listener.local_addr()?);
        Ok(Self {
            listener,
            router: create_lobby_routes(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process ends
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("Lobby server stopped");
        Ok(())
    }

    /// Serve on a background task
    pub fn spawn(self) -> Result<RunningServer> {
        let addr = self.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(self.run_until(async {
            let _ = shutdown_rx.await;
        }));

        Ok(RunningServer {
            addr,
            shutdown: shutdown_tx,
            handle,
        })
    }
}

/// Handle to a server started with [`LobbyServer::spawn`]
pub struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

impl RunningServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// REST base URL
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket URL of the event channel
    pub fn events_url(&self) -> String {
        format!("ws://{}/events", self.addr)
    }

    /// Stop accepting connections; open WebSockets get a short grace period
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let mut handle = self.handle;
        if tokio::time::timeout(Duration::from_secs(1), &mut handle)
            .await
            .is_err()
        {
            handle.abort();
        }
    }
}
