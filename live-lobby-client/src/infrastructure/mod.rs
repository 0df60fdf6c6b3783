pub mod channel;
pub mod error;
pub mod http_store;
pub mod store;
pub mod websocket;

pub use channel::{ChannelTransport, EventChannel};
pub use error::{ChannelError, StoreError};
pub use http_store::HttpMembershipStore;
pub use store::{JoinOutcome, MembershipStore};
pub use websocket::{WebSocketEventChannel, WebSocketTransport};
