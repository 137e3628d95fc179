//! Error types for the message bus

use thiserror::Error;

/// Errors that can occur within the message bus
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageBusError {
    /// One or more channel subscribers were gone; the others still got the event
    #[error("Failed to send message: {reason}")]
    SendFailed { reason: String },
}

/// Result type for message bus operations
pub type MessageBusResult<T> = Result<T, MessageBusError>;
