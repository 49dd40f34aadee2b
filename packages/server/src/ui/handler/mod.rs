//! Request handlers.

mod http;
mod websocket;

pub use http::{
    get_messages, health_check, trigger_cleanup, trigger_connect, trigger_disconnect,
    trigger_send,
};
pub use websocket::websocket_handler;
