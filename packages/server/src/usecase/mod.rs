//! UseCase layer.
//!
//! Each use case coordinates domain services and ports for one trigger:
//! connect, disconnect, send, cleanup, plus the history read.

mod cleanup_connections;
mod connect_participant;
mod disconnect_participant;
mod error;
mod get_message_history;
mod ingest_media;
mod send_message;

pub use cleanup_connections::{CleanupConnectionsUseCase, DEFAULT_STALE_AFTER_SECS};
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    CleanupError, ConnectError, DisconnectError, HistoryError, MediaError, SendMessageError,
    ValidationError,
};
pub use get_message_history::{
    GetMessageHistoryUseCase, HistoryContent, HistoryEntry, MessageHistory,
};
pub use ingest_media::IngestMediaUseCase;
pub use send_message::{BroadcastOutcome, DeliveryReport, SendMessageUseCase, escape_html};
