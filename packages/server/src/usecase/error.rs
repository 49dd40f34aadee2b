//! UseCase layer error types.

use thiserror::Error;

use crate::domain::{ObjectStoreError, RegistryError, RepositoryError};

/// Errors that can occur when admitting a participant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("too many connections (limit: {0})")]
    CapacityExceeded(usize),

    #[error("failed to register connection: {0}")]
    Upstream(String),
}

impl From<RegistryError> for ConnectError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::CapacityExceeded { limit } => Self::CapacityExceeded(limit),
            RegistryError::Repository(e) => Self::Upstream(e.to_string()),
        }
    }
}

/// Errors that can occur when removing a participant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("failed to remove connection: {0}")]
    Upstream(String),
}

impl From<RepositoryError> for DisconnectError {
    fn from(e: RepositoryError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Client input that cannot be processed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed message body: {0}")]
    MalformedBody(String),

    #[error("image payload is not valid base64: {0}")]
    UndecodablePayload(String),

    #[error("unsupported image extension: '{0}'")]
    InvalidExtension(String),
}

/// Errors that can occur when storing an uploaded image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to store image: {0}")]
    Upstream(String),
}

impl From<ObjectStoreError> for MediaError {
    fn from(e: ObjectStoreError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Errors that can occur when handling a sent message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to handle message: {0}")]
    Upstream(String),
}

impl From<MediaError> for SendMessageError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Validation(e) => Self::Validation(e),
            MediaError::Upstream(reason) => Self::Upstream(reason),
        }
    }
}

impl From<RepositoryError> for SendMessageError {
    fn from(e: RepositoryError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Errors that can occur when sweeping stale connections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanupError {
    #[error("failed to sweep connections: {0}")]
    Upstream(String),
}

impl From<RepositoryError> for CleanupError {
    fn from(e: RepositoryError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Errors that can occur when reading the message history
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("failed to read messages: {0}")]
    Upstream(String),
}

impl From<RepositoryError> for HistoryError {
    fn from(e: RepositoryError) -> Self {
        Self::Upstream(e.to_string())
    }
}
