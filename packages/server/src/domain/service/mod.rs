//! Domain Service
//!
//! - `connection_registry`: 接続の受け入れ・削除・古い接続の掃除
//! - `message_log`: 上限付きメッセージログ（上限到達後は最古の 1 件を上書き）

mod connection_registry;
mod message_log;

pub use connection_registry::{ConnectionRegistry, SweepReport};
pub use message_log::MessageLog;
