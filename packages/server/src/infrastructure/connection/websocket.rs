//! WebSocket を使った Connection 実装
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装はソケットの書き込みタスクへ繋がる `UnboundedSender` だけを持ち、
//! フレームをキューに積むだけなので送信がブロックすることはありません。
//! - UI 層: WebSocket 接続の受付、書き込みタスクの実行
//! - Infrastructure 層: 書き込みタスクへのフレームの受け渡し

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::domain::{Connection, ConnectionId, TransportError};

/// A frame queued for the socket writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Ping,
    Close { code: u16, reason: String },
    /// Drop the socket without a closing handshake
    Terminate,
}

/// Channel feeding the socket writer task
pub type OutboundChannel = mpsc::UnboundedSender<OutboundFrame>;

/// A WebSocket connection as seen by the relay
pub struct WebSocketConnection {
    id: ConnectionId,
    sender: OutboundChannel,
    open: AtomicBool,
}

impl WebSocketConnection {
    pub fn new(id: ConnectionId, sender: OutboundChannel) -> Self {
        Self {
            id,
            sender,
            open: AtomicBool::new(true),
        }
    }

    /// Mark the connection as closed once the socket has gone away
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn enqueue(&self, frame: OutboundFrame) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed(self.id.to_string()));
        }
        self.sender
            .send(frame)
            .map_err(|e| TransportError::SendFailed {
                connection: self.id.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Connection for WebSocketConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.sender.is_closed()
    }

    fn send(&self, payload: &str) -> Result<(), TransportError> {
        self.enqueue(OutboundFrame::Text(payload.to_string()))
    }

    fn ping(&self) -> Result<(), TransportError> {
        self.enqueue(OutboundFrame::Ping)
    }

    fn close(&self, code: u16, reason: &str) -> Result<(), TransportError> {
        let result = self.enqueue(OutboundFrame::Close {
            code,
            reason: reason.to_string(),
        });
        self.mark_closed();
        result
    }

    fn terminate(&self) {
        self.mark_closed();
        // The writer may already be gone; nothing left to tear down then.
        let _ = self.sender.send(OutboundFrame::Terminate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_connection() -> (WebSocketConnection, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (WebSocketConnection::new(ConnectionId::next(), tx), rx)
    }

    #[tokio::test]
    async fn test_send_and_ping_queue_frames() {
        // テスト項目: send / ping がフレームを書き込みタスクのキューに積む
        // given (前提条件):
        let (connection, mut rx) = create_test_connection();

        // when (操作):
        connection.send("hello").unwrap();
        connection.ping().unwrap();

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some(OutboundFrame::Text("hello".to_string())));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Ping));
        assert!(connection.is_open());
    }

    #[tokio::test]
    async fn test_close_queues_close_frame_and_rejects_further_sends() {
        // テスト項目: close 後はクローズフレームが積まれ、以降の送信は失敗する
        // given (前提条件):
        let (connection, mut rx) = create_test_connection();

        // when (操作):
        connection.close(4000, "bye").unwrap();
        let result = connection.send("late");

        // then (期待する結果):
        assert_eq!(
            rx.recv().await,
            Some(OutboundFrame::Close {
                code: 4000,
                reason: "bye".to_string()
            })
        );
        assert!(!connection.is_open());
        assert!(matches!(result, Err(TransportError::Closed(_))));
    }

    #[tokio::test]
    async fn test_terminate_marks_closed() {
        // テスト項目: terminate で接続が閉じられ、Terminate フレームが積まれる
        // given (前提条件):
        let (connection, mut rx) = create_test_connection();

        // when (操作):
        connection.terminate();

        // then (期待する結果):
        assert!(!connection.is_open());
        assert_eq!(rx.recv().await, Some(OutboundFrame::Terminate));
    }

    #[test]
    fn test_send_fails_when_writer_is_gone() {
        // テスト項目: 書き込みタスクが終了している場合、送信はエラーになる
        // given (前提条件):
        let (connection, rx) = create_test_connection();
        drop(rx);

        // when (操作):
        let result = connection.send("hello");

        // then (期待する結果):
        assert!(!connection.is_open());
        assert!(result.is_err());
    }
}
