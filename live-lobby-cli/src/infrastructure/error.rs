use live_lobby_client::SessionError;
use live_lobby_server::ServerError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema generation failed: {0}")]
    SchemaGeneration(String),

    #[error("Lobby session failed: {0}")]
    Session(#[from] SessionError),

    #[error("Lobby server failed: {0}")]
    Server(#[from] ServerError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
