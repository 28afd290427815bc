/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the connection failed (DNS, TCP, or the WebSocket upgrade).
    #[error("connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed, or the peer sent something that isn't text.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
