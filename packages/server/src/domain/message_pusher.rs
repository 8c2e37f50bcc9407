//! Broadcast fan-out trait definition.

use async_trait::async_trait;

use super::ConnectionId;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients the payload was handed to
    pub delivered: usize,
    /// Recipients whose send failed
    pub failed: usize,
    /// Recipients skipped because their connection was not open
    pub skipped: usize,
}

/// Message fan-out to registered connections
///
/// Delivery is best-effort: a failing recipient is logged and skipped, never
/// retried and never removed from the registry.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Deliver `content` to every open registered connection except `exclude`
    async fn broadcast(&self, content: &str, exclude: Option<ConnectionId>) -> BroadcastReport;
}
