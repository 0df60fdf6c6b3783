use crate::domain::{Participant, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Client-side membership of one lobby, in arrival order
///
/// Holds at most one entry per user ID. Order is stable for display but
/// carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MembershipView {
    participants: Vec<Participant>,
}

impl MembershipView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view from a full snapshot; later duplicates of a user ID are dropped
    pub fn from_snapshot(snapshot: impl IntoIterator<Item = Participant>) -> Self {
        let mut view = Self::new();
        for participant in snapshot {
            if !view.insert(participant) {
                tracing::debug!("Snapshot contained a duplicate participant, keeping the first");
            }
        }
        view
    }

    /// Add a participant unless its user ID is already present
    ///
    /// Returns `true` if the view changed.
    pub fn insert(&mut self, participant: Participant) -> bool {
        if self.contains(participant.user_id()) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| p.user_id() == user_id)
    }

    pub fn get(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id() == user_id)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn user_ids(&self) -> Vec<&UserId> {
        self.participants.iter().map(|p| p.user_id()).collect()
    }

    /// First coordinator in arrival order, if any
    pub fn coordinator(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_coordinator())
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

impl<'a> IntoIterator for &'a MembershipView {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.participants.iter()
    }
}
