//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: このプロセスが WebSocket を保持している場合の実装
//! - `http`: 外部のゲートウェイがソケットを保持している場合の実装
//!   （`POST <endpoint>/@connections/<id>`）

pub mod http;
pub mod websocket;

pub use http::HttpMessagePusher;
pub use websocket::WebSocketMessagePusher;
