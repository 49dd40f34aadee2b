//! Data Transfer Objects (DTOs) for the chat server.
//!
//! DTOs are organized by boundary:
//! - `table`: rows of the connections / messages tables
//! - `websocket`: payloads exchanged with connected clients
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod table;
pub mod websocket;
