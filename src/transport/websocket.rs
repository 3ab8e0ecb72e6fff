//! WebSocket push channel backed by tokio-tungstenite

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{ConsoleError, Result};

use super::{ChannelConnector, DuplexChannel};

/// Opens WebSocket channels to a fixed URL
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    /// Create a connector for `url` (`ws://` or `wss://`)
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Endpoint this connector dials
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChannelConnector for WebSocketConnector {
    type Channel = WebSocketChannel;

    async fn open(&self) -> Result<WebSocketChannel> {
        if self.url.starts_with("wss://") {
            install_crypto_provider();
        }
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ConsoleError::channel(format!("Failed to connect to {}: {e}", self.url)))?;
        Ok(WebSocketChannel { stream })
    }
}

/// Make ring the process-wide rustls provider unless one is already set
fn install_crypto_provider() {
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        // Another caller may install first
        let _ = rustls::crypto::ring::default_provider().install_default();
    }
}

/// One open WebSocket connection
pub struct WebSocketChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl DuplexChannel for WebSocketChannel {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| ConsoleError::channel(format!("Failed to send frame: {e}")))
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => {
                    return Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                        ConsoleError::channel(format!("Binary frame is not UTF-8: {e}"))
                    }));
                }
                Ok(Message::Close(_)) => return None,
                // Ping/pong are answered by tungstenite itself
                Ok(_) => {}
                Err(e) => return Some(Err(ConsoleError::channel(format!("Read failed: {e}")))),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| ConsoleError::channel(format!("Failed to close channel: {e}")))
    }
}
