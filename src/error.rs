//! Error types for the bot console

use thiserror::Error;

/// Main error type for the bot console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Pull call could not complete (network, timeout, undecodable body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Pull call completed but the server answered with a failure body
    #[error("Server rejected request (status {status}): {}", detail.as_deref().unwrap_or("no detail"))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error body, if present
        detail: Option<String>,
    },

    /// Push channel closed or errored
    #[error("Channel error: {0}")]
    Channel(String),

    /// JSON decode error
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// Push message parse error with optional raw data
    #[error("Message parse error: {message}")]
    MessageParse {
        /// Error message
        message: String,
        /// Raw message data that failed to parse
        data: Option<serde_json::Value>,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl ConsoleError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a server rejection
    #[must_use]
    pub fn rejected(status: u16, detail: Option<String>) -> Self {
        Self::Rejected { status, detail }
    }

    /// Create a channel error
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a message parse error
    pub fn message_parse(msg: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self::MessageParse {
            message: msg.into(),
            data,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Server-provided `detail` message, if this is a rejection that carried one
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
