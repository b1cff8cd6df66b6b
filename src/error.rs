use crate::message::Message;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TqsError {
    #[error("Queue <{queue}> does not exist")]
    QueueNotFound { queue: String },

    #[error("Queue <{queue}> already exists")]
    QueueAlreadyExists { queue: String },

    #[error("Queue <{queue}> has no messages available")]
    QueueEmpty { queue: String },

    #[error("Queue <{queue}> returned HTTP status <{status}>")]
    QueueHttp { queue: String, status: u16 },

    #[error("Lease <{lease}> does not exist or expired")]
    LeaseNotFound { lease: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout error after {0}ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The message was leased but its body is not the expected JSON.
    /// The lease is still held and can be released through `message`.
    #[error("Failed to decode body of lease <{}>: {source}", .message.lease_uuid)]
    BodyDecode {
        message: Box<Message>,
        source: serde_json::Error,
    },
}

impl TqsError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TqsError::Connection(_) | TqsError::Timeout(_))
    }

    /// HTTP status behind this error, if it came from a response status.
    pub fn status(&self) -> Option<u16> {
        match self {
            TqsError::QueueNotFound { .. } | TqsError::LeaseNotFound { .. } => Some(404),
            TqsError::QueueAlreadyExists { .. } => Some(409),
            TqsError::QueueHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TqsError>;
