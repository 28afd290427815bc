//! Error types for the protocol layer.
//!
//! Each crate in Hapticforge defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in serialization, not in
//! networking or device bookkeeping.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning messages into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning text into messages).
    ///
    /// Common causes: malformed JSON, a frame that isn't an array,
    /// or a known message with missing or mistyped fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A message in the batch carries a tag this crate doesn't know.
    ///
    /// Newer servers send messages (sensor readings, battery levels)
    /// that this client has no use for. Only that element is lost; the
    /// rest of the batch still decodes.
    #[error("unknown message `{0}`")]
    UnknownMessage(String),
}
