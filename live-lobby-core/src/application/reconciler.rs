use crate::application::ChannelMessage;
use crate::domain::{MembershipView, Participant, SessionState};

/// Something the consumer must be told about
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The view changed; carries a copy of the new view
    MembershipChanged(MembershipView),

    /// The session reached `Started` for the first time
    Started,
}

/// Single mutation point for one session's membership view and state
///
/// Both the join handshake and the event subscription feed into this type;
/// callers serialize access (the client wraps it in a mutex). Deltas that
/// arrive before the handshake snapshot are buffered and replayed on top of
/// it, so the final view does not depend on which channel answered first.
/// A snapshot pushed over the channel while joining is newer than the one
/// the handshake fetched, so the handshake snapshot then only completes the
/// join and leaves the view alone.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    view: MembershipView,
    state: SessionState,
    /// Deltas seen since the join began, replayed over the handshake snapshot
    buffered: Vec<Participant>,
    buffering: bool,
    /// The channel delivered a snapshot since the join began
    pushed_while_joining: bool,
    /// START arrived before the handshake completed
    start_pending: bool,
    published: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &MembershipView {
        &self.view
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Enter `Joining`
    ///
    /// Returns `false` if the session is already terminal. Calling this again
    /// while joining or joined is allowed (a retried or repeated handshake).
    pub fn begin_join(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if self.state == SessionState::Idle {
            self.state = SessionState::Joining;
        }
        self.buffering = true;
        self.pushed_while_joining = false;
        true
    }

    /// Install the snapshot fetched by the join handshake
    pub fn install_snapshot(&mut self, snapshot: Vec<Participant>) -> Vec<Outcome> {
        if self.state.is_terminal() {
            tracing::debug!(state = %self.state, "Ignoring handshake snapshot in terminal state");
            return Vec::new();
        }

        let next = if self.pushed_while_joining {
            tracing::debug!("Channel snapshot is newer, keeping the current view");
            self.buffered.clear();
            self.view.clone()
        } else {
            let mut next = MembershipView::from_snapshot(snapshot);
            for participant in self.buffered.drain(..) {
                next.insert(participant);
            }
            next
        };
        self.buffering = false;
        self.pushed_while_joining = false;

        let mut outcomes = Vec::new();
        self.replace_view(next, &mut outcomes);

        if self.state != SessionState::Joined {
            tracing::debug!(from = %self.state, "Handshake complete, session joined");
            self.state = SessionState::Joined;
        }

        if self.start_pending {
            self.start_pending = false;
            self.enter_started(&mut outcomes);
        }

        outcomes
    }

    /// Apply one classified event channel message
    pub fn apply_message(&mut self, message: ChannelMessage) -> Vec<Outcome> {
        let mut outcomes = Vec::new();

        if self.state == SessionState::Left {
            tracing::debug!(kind = message.kind(), "Ignoring message after leave");
            return outcomes;
        }

        match message {
            ChannelMessage::Snapshot(participants) => {
                // Supersedes both the buffer and the pending handshake snapshot
                if self.buffering {
                    self.pushed_while_joining = true;
                }
                self.buffered.clear();
                self.replace_view(MembershipView::from_snapshot(participants), &mut outcomes);
            }

            ChannelMessage::Join(participant) => {
                if self.buffering {
                    self.buffered.push(participant.clone());
                }
                if self.view.insert(participant) {
                    self.publish(&mut outcomes);
                } else {
                    tracing::trace!("Duplicate join ignored");
                }
            }

            ChannelMessage::Start => match self.state {
                SessionState::Joined => self.enter_started(&mut outcomes),
                SessionState::Idle | SessionState::Joining => {
                    tracing::debug!("START before handshake completed, deferring");
                    self.start_pending = true;
                }
                SessionState::Started | SessionState::Left => {
                    tracing::trace!("Repeated START ignored");
                }
            },

            ChannelMessage::Unrecognized(reason) => {
                tracing::warn!(%reason, "Ignoring unrecognized channel message");
            }
        }

        outcomes
    }

    /// Record teardown; `Started` stays terminal
    pub fn mark_left(&mut self) {
        if self.state != SessionState::Started {
            self.state = SessionState::Left;
        }
        self.buffering = false;
        self.pushed_while_joining = false;
        self.buffered.clear();
        self.start_pending = false;
    }

    fn replace_view(&mut self, next: MembershipView, outcomes: &mut Vec<Outcome>) {
        if next != self.view || !self.published {
            self.view = next;
            self.publish(outcomes);
        }
    }

    fn publish(&mut self, outcomes: &mut Vec<Outcome>) {
        self.published = true;
        outcomes.push(Outcome::MembershipChanged(self.view.clone()));
    }

    fn enter_started(&mut self, outcomes: &mut Vec<Outcome>) {
        if self.state == SessionState::Started {
            return;
        }
        self.state = SessionState::Started;
        outcomes.push(Outcome::Started);
    }
}
