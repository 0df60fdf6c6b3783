pub mod application;
pub mod domain;

pub use application::{
    ChannelMessage, ClientFrame, JoinRequest, LobbyBroadcast, Outcome, Reconciler, StartRequest,
};
pub use domain::{LobbyError, LobbyId, MembershipView, Participant, Role, SessionState, UserId};
