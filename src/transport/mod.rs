//! Transport layer for communicating with the remote agent
//!
//! This module provides the two transport abstractions the console is built
//! on, plus their network implementations:
//!
//! - [`PullTransport`]: request/response calls against the agent's API
//! - [`ChannelConnector`] / [`DuplexChannel`]: the persistent push channel
//!
//! Everything above this layer is generic over these traits, so tests can
//! drive the console with in-memory doubles.

#[cfg(feature = "http")]
pub mod http;
pub mod websocket;

use std::fmt;
use std::future::Future;

use crate::error::Result;

/// HTTP method of a pull call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read
    Get,
    /// Create or trigger
    Post,
    /// Remove
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// Request/response caller
///
/// Paths are relative to the API prefix, e.g. `/bot/status`.
pub trait PullTransport: Send + Sync + 'static {
    /// Perform one call and return the decoded JSON body
    ///
    /// An empty success body decodes to `Value::Null`.
    ///
    /// # Errors
    /// Returns `ConsoleError::Transport` if the call could not complete and
    /// `ConsoleError::Rejected` if the server answered with a non-2xx status
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send;
}

/// One open push channel
pub trait DuplexChannel: Send + 'static {
    /// Send a text frame (fire-and-forget from the caller's point of view)
    ///
    /// # Errors
    /// Returns error if the frame could not be written
    fn send(&mut self, text: String) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next inbound text frame
    ///
    /// Returns `None` once the channel has closed. Must be cancel-safe.
    fn recv(&mut self) -> impl Future<Output = Option<Result<String>>> + Send;

    /// Close the channel
    ///
    /// # Errors
    /// Returns error if the close handshake fails
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// Factory for push channels to one fixed endpoint
pub trait ChannelConnector: Send + Sync + 'static {
    /// Channel type produced by this connector
    type Channel: DuplexChannel;

    /// Open a new channel
    ///
    /// # Errors
    /// Returns error if the endpoint cannot be reached
    fn open(&self) -> impl Future<Output = Result<Self::Channel>> + Send;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use websocket::{WebSocketChannel, WebSocketConnector};
