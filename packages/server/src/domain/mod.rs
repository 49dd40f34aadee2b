//! Domain layer for the broadcast chat server.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.
//! External collaborators (tables, object store, push channel) are reached
//! only through the traits defined here.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod object_store;
pub mod repository;
pub mod service;
pub mod value_object;

pub use entity::{Connection, Message};
pub use error::{
    MessagePushError, ObjectStoreError, RegistryError, RepositoryError, ValueObjectError,
};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use object_store::ObjectStore;
pub use repository::{ConnectionRepository, MessageRepository};
pub use service::{ConnectionRegistry, MessageLog, SweepReport};
pub use value_object::{Color, ConnectionId, MessageId, Timestamp};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use object_store::MockObjectStore;
