use crate::domain::{LobbyId, Participant, UserId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys that may carry the message discriminator
const DISCRIMINATOR_KEYS: [&str; 2] = ["type", "event"];

/// An inbound event channel message, classified by shape
///
/// Classification is structural: a `"join"` discriminator with one
/// participant means a delta, a `"start"` discriminator means the control
/// event, and otherwise a list field means a full snapshot. Nothing else is
/// trusted.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// Complete participant list; replaces the view wholesale
    Snapshot(Vec<Participant>),

    /// A single participant was added
    Join(Participant),

    /// The coordinator started the activity
    Start,

    /// Anything else; the reason is kept for logging
    Unrecognized(String),
}

impl ChannelMessage {
    /// Classify a raw text frame
    pub fn classify(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::classify_value(value),
            Err(e) => ChannelMessage::Unrecognized(format!("not JSON: {}", e)),
        }
    }

    /// Classify an already-parsed JSON value
    pub fn classify_value(value: Value) -> Self {
        let Value::Object(fields) = value else {
            return ChannelMessage::Unrecognized("not a JSON object".to_string());
        };

        let kind = discriminator(&fields);

        // An explicit join or start wins over incidental list fields
        match kind.as_deref() {
            Some("join") => {
                return match join_payload(&fields) {
                    Some(participant) => ChannelMessage::Join(participant),
                    None => ChannelMessage::Unrecognized(
                        "join event without a participant payload".to_string(),
                    ),
                }
            }
            Some("start") => return ChannelMessage::Start,
            _ => {}
        }

        if let Some((key, list)) = fields.iter().find(|(_, v)| v.is_array()) {
            return match serde_json::from_value::<Vec<Participant>>(list.clone()) {
                Ok(participants) => ChannelMessage::Snapshot(participants),
                Err(e) => ChannelMessage::Unrecognized(format!(
                    "list field `{}` is not a participant list: {}",
                    key, e
                )),
            };
        }

        match kind {
            Some(other) => ChannelMessage::Unrecognized(format!("unknown event `{}`", other)),
            None => ChannelMessage::Unrecognized("no list field and no discriminator".to_string()),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ChannelMessage::Snapshot(_) => "snapshot",
            ChannelMessage::Join(_) => "join",
            ChannelMessage::Start => "start",
            ChannelMessage::Unrecognized(_) => "unrecognized",
        }
    }
}

fn discriminator(fields: &Map<String, Value>) -> Option<String> {
    DISCRIMINATOR_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::to_ascii_lowercase)
}

/// Find the single participant of a join event
///
/// Accepts the participant nested in any object field, or flattened into
/// the message itself.
fn join_payload(fields: &Map<String, Value>) -> Option<Participant> {
    let nested = fields
        .values()
        .filter(|v| v.is_object())
        .find_map(|v| serde_json::from_value::<Participant>(v.clone()).ok());

    nested.or_else(|| {
        let mut flattened = fields.clone();
        for key in DISCRIMINATOR_KEYS {
            flattened.remove(key);
        }
        serde_json::from_value::<Participant>(Value::Object(flattened)).ok()
    })
}

/// Frames a client sends on the event channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Start receiving events for a lobby topic
    Subscribe { topic: LobbyId },

    /// Stop receiving events for a lobby topic
    Unsubscribe { topic: LobbyId },
}

/// Messages published on a lobby topic
///
/// These are the shapes the reference store emits; clients classify
/// inbound messages with [`ChannelMessage::classify`] instead of relying
/// on this schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LobbyBroadcast {
    /// Full, authoritative membership
    Snapshot { participants: Vec<Participant> },

    /// One participant joined
    Join { participant: Participant },

    /// The coordinator started the activity
    #[serde(rename_all = "camelCase")]
    Start { started_by: UserId },
}
