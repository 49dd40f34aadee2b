//! Conversion logic between DTOs and domain entities.

use serde::{Serialize, de::DeserializeOwned, ser::Error as _};
use serde_json::Value;

use crate::{
    domain::{
        Color, Connection, ConnectionId, Message, MessageId, Timestamp, ValueObjectError,
    },
    infrastructure::{
        dto::{
            table::{ConnectionRecord, MessageRecord},
            websocket::PublishPayload,
        },
        table_store::Item,
    },
};

// ========================================
// Table row ⇄ DTO
// ========================================

/// Serialize a record into a table row
pub fn to_item<T: Serialize>(record: &T) -> Result<Item, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(item) => Ok(item),
        other => Err(serde_json::Error::custom(format!(
            "record serialized to a non-object value: {other}"
        ))),
    }
}

/// Deserialize a table row into a record
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(item))
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<ConnectionRecord> for Connection {
    type Error = ValueObjectError;

    fn try_from(record: ConnectionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ConnectionId::new(record.connection_id)?,
            created_at: Timestamp::new(record.created),
            color: Color::from_stored(record.color),
        })
    }
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: MessageId::new(record.id),
            data: record.data,
            created_at: Timestamp::new(record.created),
            color: Color::from_stored(record.color),
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Connection> for ConnectionRecord {
    fn from(model: Connection) -> Self {
        Self {
            connection_id: model.id.into_string(),
            created: model.created_at.value(),
            color: model.color.into_string(),
        }
    }
}

impl From<Message> for MessageRecord {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.value(),
            data: model.data,
            created: model.created_at.value(),
            color: model.color.into_string(),
        }
    }
}

impl From<&Message> for PublishPayload {
    fn from(model: &Message) -> Self {
        Self {
            data: model.data.clone(),
            color: model.color.as_str().to_string(),
        }
    }
}
