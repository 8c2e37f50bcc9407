//! Inbound payload normalization.
//!
//! Turns whatever a participant sent into a relayable [`ChatEnvelope`]:
//!
//! 1. A JSON object that already carries a `userId` is relayed unmodified.
//! 2. A JSON object without `userId` is stamped with the sender's identity,
//!    display name and a fresh timestamp. All other fields are preserved,
//!    whatever their JSON type.
//! 3. Anything else (plain text, or JSON that is not an object) becomes the
//!    `content` of a new chat envelope.
//!
//! `userId` counts as present when it is truthy in the JavaScript sense: any
//! value except `null`, `false`, `0`, `NaN` and `""`.
//!
//! Unparsable input is never an error.
//!
//! The pass-through in (1) means identity is presence metadata only: a client
//! can claim any `userId`, so it must not be used for authorization.

use serde_json::Value;

use crate::domain::{Participant, Timestamp};

use super::websocket::ChatEnvelope;

/// Normalize a raw inbound payload sent by `sender` at `now`
pub fn normalize_inbound(raw: &str, sender: &Participant, now: Timestamp) -> ChatEnvelope {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => {
            if fields.get("userId").is_some_and(is_truthy) {
                ChatEnvelope::passthrough(fields)
            } else {
                ChatEnvelope::stamped(fields, sender, now)
            }
        }
        Ok(_) => {
            tracing::debug!("Payload from '{}' is not a JSON object, wrapping as text", sender.id);
            ChatEnvelope::text(raw, sender, now)
        }
        Err(e) => {
            tracing::debug!("Payload from '{}' is not JSON ({}), wrapping as text", sender.id, e);
            ChatEnvelope::text(raw, sender, now)
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
