//! UI layer: trigger surface, HTTP and WebSocket front doors.

mod handler;
mod server;
mod signal;
pub mod state;
pub mod trigger;

pub use server::Server;
pub use trigger::{TriggerResponse, Triggers};
