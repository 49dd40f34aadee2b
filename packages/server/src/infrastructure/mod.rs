//! Infrastructure layer.
//!
//! Adapters behind the domain traits:
//! - `table_store`: key-value tables holding connections and messages
//! - `repository`: domain repositories over a table store
//! - `message_pusher`: push channels to connected clients
//! - `object_store`: public media uploads
//! - `dto`: wire and storage representations

pub mod dto;
pub mod message_pusher;
pub mod object_store;
pub mod repository;
pub mod table_store;
