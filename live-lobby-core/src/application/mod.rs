mod message;
mod reconciler;
mod requests;

pub use message::{ChannelMessage, ClientFrame, LobbyBroadcast};
pub use reconciler::{Outcome, Reconciler};
pub use requests::{JoinRequest, StartRequest};
