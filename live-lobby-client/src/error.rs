use crate::infrastructure::error::{ChannelError, StoreError};
use live_lobby_core::LobbyError;
use std::fmt;

/// What went wrong, as reported to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The join handshake failed; `start()` may be retried
    JoinFailure,
    /// The event channel could not be opened or dropped; resubscribe may succeed
    ConnectionFailure,
    /// Invalid construction or a call the role does not permit; not retriable
    ConfigurationError,
    /// A start or list request failed after joining
    RequestFailure,
}

impl ErrorKind {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::ConfigurationError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::JoinFailure => write!(f, "join-failure"),
            ErrorKind::ConnectionFailure => write!(f, "connection-failure"),
            ErrorKind::ConfigurationError => write!(f, "configuration-error"),
            ErrorKind::RequestFailure => write!(f, "request-failure"),
        }
    }
}

/// Lobby session errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Join failed: {0}")]
    JoinFailed(#[source] StoreError),

    #[error("Request failed: {0}")]
    Request(#[source] StoreError),

    #[error("Event channel error: {0}")]
    Connection(#[from] ChannelError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Configuration(_) => ErrorKind::ConfigurationError,
            SessionError::JoinFailed(_) => ErrorKind::JoinFailure,
            SessionError::Request(_) => ErrorKind::RequestFailure,
            SessionError::Connection(_) => ErrorKind::ConnectionFailure,
        }
    }

    /// Human-readable detail without the kind prefix
    pub fn detail(&self) -> String {
        match self {
            SessionError::Configuration(msg) => msg.clone(),
            SessionError::JoinFailed(e) | SessionError::Request(e) => e.to_string(),
            SessionError::Connection(e) => e.to_string(),
        }
    }
}

impl From<LobbyError> for SessionError {
    fn from(e: LobbyError) -> Self {
        SessionError::Configuration(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            SessionError::Configuration("x".into()).kind(),
            ErrorKind::ConfigurationError
        );
        assert_eq!(
            SessionError::JoinFailed(StoreError::Network("down".into())).kind(),
            ErrorKind::JoinFailure
        );
        assert_eq!(
            SessionError::from(ChannelError::ChannelClosed).kind(),
            ErrorKind::ConnectionFailure
        );
        assert_eq!(
            SessionError::from(LobbyError::EmptyLobbyId).kind(),
            ErrorKind::ConfigurationError
        );
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(!ErrorKind::ConfigurationError.is_recoverable());
        assert!(ErrorKind::JoinFailure.is_recoverable());
        assert!(ErrorKind::ConnectionFailure.is_recoverable());
        assert!(ErrorKind::RequestFailure.is_recoverable());
    }

    #[test]
    fn test_detail_omits_prefix() {
        let err = SessionError::Request(StoreError::Forbidden("not coordinator".into()));
        assert_eq!(err.detail(), "Not allowed: not coordinator");
        assert_eq!(err.kind().to_string(), "request-failure");
    }
}
