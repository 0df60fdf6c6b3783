use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one lobby client session
///
/// `Idle → Joining → Joined → Started` or `Idle → Joining → Joined → Left`.
/// `Started` and `Left` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Joining,
    Joined,
    Started,
    Left,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Started | SessionState::Left)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Joining => write!(f, "Joining"),
            SessionState::Joined => write!(f, "Joined"),
            SessionState::Started => write!(f, "Started"),
            SessionState::Left => write!(f, "Left"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Joining.is_terminal());
        assert!(!SessionState::Joined.is_terminal());
        assert!(SessionState::Started.is_terminal());
        assert!(SessionState::Left.is_terminal());
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }
}
