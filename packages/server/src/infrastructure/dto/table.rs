//! Table row DTOs.
//!
//! Attribute names match the persisted schema:
//!
//! | Table | Key | Fields |
//! |---|---|---|
//! | connections | `connectionId` (string) | `created` (int), `color` (string) |
//! | messages | `id` (int) | `data` (string), `created` (int), `color` (string) |

use serde::{Deserialize, Serialize};

/// Key attribute of the connections table
pub const CONNECTION_KEY: &str = "connectionId";
/// Key attribute of the messages table
pub const MESSAGE_KEY: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(rename = "connectionId")]
    pub connection_id: String,
    pub created: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub data: String,
    pub created: i64,
    pub color: String,
}
