//! Value objects for the relay domain.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agora_shared::time::timestamp_to_rfc3339;

use super::error::ValueObjectError;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, hashable handle of a transport connection.
///
/// Handles are allocated from a process-wide counter and never reused, so they
/// can key the registry without relying on the transport's internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw handle value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Allocate the next process-unique handle
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Opaque identity of a participant (e.g. `user_1700000000000_3f2a9c1d`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub const MAX_LEN: usize = 128;

    /// Create a ParticipantId from a raw string
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty (after trimming) or too long.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::ParticipantIdEmpty);
        }
        if value.len() > Self::MAX_LEN {
            return Err(ValueObjectError::ParticipantIdTooLong(value.len()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates collision-resistant participant identities.
pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    /// Combine the connection time with a random component.
    ///
    /// The millisecond prefix keeps identities roughly sortable; the random
    /// suffix keeps them unique when many connections arrive in the same
    /// millisecond.
    pub fn generate(now_millis: i64) -> ParticipantId {
        let random = Uuid::new_v4().simple().to_string();
        ParticipantId(format!("user_{}_{}", now_millis, &random[..12]))
    }
}

/// Human-readable name shown to other participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Sequential default name, e.g. "User 3"
    pub fn numbered(sequence: u64) -> Self {
        Self(format!("User {}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in UTC milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Wire representation (RFC 3339, UTC, millisecond precision)
    pub fn to_rfc3339(&self) -> String {
        timestamp_to_rfc3339(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_next_is_unique() {
        // テスト項目: ConnectionId::next が毎回異なるハンドルを払い出す
        // given (前提条件):
        let first = ConnectionId::next();

        // when (操作):
        let second = ConnectionId::next();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(second.value() > first.value());
    }

    #[test]
    fn test_participant_id_rejects_empty() {
        // テスト項目: 空白のみの ParticipantId は作成できない
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = ParticipantId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::ParticipantIdEmpty));
    }

    #[test]
    fn test_participant_id_rejects_too_long() {
        // テスト項目: 上限を超える長さの ParticipantId は作成できない
        // given (前提条件):
        let value = "x".repeat(ParticipantId::MAX_LEN + 1);

        // when (操作):
        let result = ParticipantId::try_from(value);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::ParticipantIdTooLong(ParticipantId::MAX_LEN + 1))
        );
    }

    #[test]
    fn test_participant_id_factory_generates_distinct_ids_in_same_millisecond() {
        // テスト項目: 同一ミリ秒内に生成しても ID が衝突しない
        // given (前提条件):
        let now = 1_700_000_000_000;

        // when (操作):
        let ids: std::collections::HashSet<ParticipantId> =
            (0..1_000).map(|_| ParticipantIdFactory::generate(now)).collect();

        // then (期待する結果):
        assert_eq!(ids.len(), 1_000);
        assert!(
            ids.iter()
                .all(|id| id.as_str().starts_with("user_1700000000000_"))
        );
    }

    #[test]
    fn test_display_name_numbered() {
        // テスト項目: 連番の表示名が "User N" 形式になる
        // given (前提条件):

        // when (操作):
        let name = DisplayName::numbered(7);

        // then (期待する結果):
        assert_eq!(name.as_str(), "User 7");
    }

    #[test]
    fn test_timestamp_to_rfc3339() {
        // テスト項目: Timestamp がワイヤ形式の文字列に変換される
        // given (前提条件):
        let timestamp = Timestamp::new(1672531200000);

        // when (操作):
        let wire = timestamp.to_rfc3339();

        // then (期待する結果):
        assert_eq!(wire, "2023-01-01T00:00:00.000Z");
    }
}
