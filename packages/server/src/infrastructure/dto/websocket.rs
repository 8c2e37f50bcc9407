//! WebSocket envelope DTOs.
//!
//! Every frame the relay sends is one of these JSON objects. Keys are
//! camelCase and the `type` field discriminates the envelope kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Participant, Timestamp};

/// Envelope discriminator (`type` field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "message")]
    Chat,
    #[serde(rename = "error")]
    Error,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Chat => "message",
            Self::Error => "error",
        }
    }
}

/// Membership events announced by the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    UserJoined,
    UserLeft,
    UserTimeout,
    Welcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEnvelope {
    pub r#type: MessageType,
    pub event: SystemEvent,
    pub user_id: String,
    pub username: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SystemEnvelope {
    pub fn new(event: SystemEvent, participant: &Participant, at: Timestamp) -> Self {
        Self {
            r#type: MessageType::System,
            event,
            user_id: participant.id.as_str().to_string(),
            username: participant.display_name.as_str().to_string(),
            timestamp: at.to_rfc3339(),
            active_users: None,
            message: None,
        }
    }

    /// `user_joined` announcement for everyone but the newcomer
    pub fn joined(participant: &Participant, active_users: usize, at: Timestamp) -> Self {
        Self::new(SystemEvent::UserJoined, participant, at).with_active_users(active_users)
    }

    /// `user_left` announcement carrying the post-removal count
    pub fn left(participant: &Participant, active_users: usize, at: Timestamp) -> Self {
        Self::new(SystemEvent::UserLeft, participant, at).with_active_users(active_users)
    }

    /// `user_timeout` announcement after a liveness eviction
    pub fn timeout(participant: &Participant, active_users: usize, at: Timestamp) -> Self {
        Self::new(SystemEvent::UserTimeout, participant, at)
            .with_active_users(active_users)
            .with_message("Disconnected due to inactivity")
    }

    /// Private greeting telling a newcomer its assigned identity
    pub fn welcome(participant: &Participant, at: Timestamp) -> Self {
        let text = format!("Welcome to the chat! Your ID: {}", participant.id);
        Self::new(SystemEvent::Welcome, participant, at).with_message(text)
    }

    pub fn with_active_users(mut self, active_users: usize) -> Self {
        self.active_users = Some(active_users);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Relayed participant message.
///
/// Kept as the sender's JSON object so that every field, whatever its JSON
/// type, survives the relay. Keys written by the relay itself are `type`,
/// `content`, `userId`, `username` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChatEnvelope(Map<String, Value>);

impl ChatEnvelope {
    /// Wrap an inbound object as-is
    pub fn passthrough(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Stamp `participant`'s identity and `at` onto an inbound object.
    ///
    /// Client-supplied `userId` / `username` / `timestamp` are overwritten;
    /// `type` defaults to `"message"` when absent.
    pub fn stamped(mut fields: Map<String, Value>, participant: &Participant, at: Timestamp) -> Self {
        fields
            .entry("type")
            .or_insert_with(|| Value::String(MessageType::Chat.as_str().to_string()));
        fields.insert(
            "userId".to_string(),
            Value::String(participant.id.as_str().to_string()),
        );
        fields.insert(
            "username".to_string(),
            Value::String(participant.display_name.as_str().to_string()),
        );
        fields.insert("timestamp".to_string(), Value::String(at.to_rfc3339()));
        Self(fields)
    }

    /// A chat message whose `content` is the raw text
    pub fn text(content: &str, participant: &Participant, at: Timestamp) -> Self {
        let mut fields = Map::new();
        fields.insert("content".to_string(), Value::String(content.to_string()));
        Self::stamped(fields, participant, at)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub r#type: MessageType,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            message: message.into(),
        }
    }
}

/// Any outbound envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    System(SystemEnvelope),
    Chat(ChatEnvelope),
    Error(ErrorEnvelope),
}

impl Envelope {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<SystemEnvelope> for Envelope {
    fn from(envelope: SystemEnvelope) -> Self {
        Self::System(envelope)
    }
}

impl From<ChatEnvelope> for Envelope {
    fn from(envelope: ChatEnvelope) -> Self {
        Self::Chat(envelope)
    }
}

impl From<ErrorEnvelope> for Envelope {
    fn from(envelope: ErrorEnvelope) -> Self {
        Self::Error(envelope)
    }
}
