//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `registry`: Registry のスナップショットを使ったファンアウト実装

pub mod registry;

pub use registry::RegistryMessagePusher;
