pub mod ids;
pub mod membership;
pub mod participant;
pub mod state;

pub use ids::{LobbyError, LobbyId, UserId};
pub use membership::MembershipView;
pub use participant::{Participant, Role};
pub use state::SessionState;
