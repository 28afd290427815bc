//! Codec trait and implementations for serializing/deserializing batches.
//!
//! A "codec" (coder/decoder) converts between message batches and the
//! text that travels in a WebSocket frame. The session layer doesn't
//! care HOW messages are serialized; it only needs something that
//! implements [`Codec`].
//!
//! The device-control protocol is JSON-only, so [`JsonCodec`] is the
//! one implementation. The trait stays as the seam tests and alternative
//! front-ends plug into.

use crate::{Message, ProtocolError};

/// One decoded frame: every element of the array, in order, decoded on
/// its own so a bad element doesn't take its neighbours down with it.
pub type DecodedBatch = Vec<Result<Message, ProtocolError>>;

/// Converts batches of [`Message`]s to text and back.
///
/// `Send + Sync + 'static` because the codec lives inside the session
/// actor task, which Tokio may move between threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a batch of messages into one frame of text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode(&self, batch: &[Message]) -> Result<String, ProtocolError>;

    /// Deserializes one frame of text into a batch of messages.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame as a whole is
    /// malformed or isn't an array. Problems with single elements are
    /// reported per element inside the [`DecodedBatch`].
    fn decode(&self, frame: &str) -> Result<DecodedBatch, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use hapticforge_protocol::{Codec, JsonCodec, Message, RequestId};
///
/// let codec = JsonCodec;
///
/// let text = codec
///     .encode(&[Message::StartScanning { id: RequestId(3) }])
///     .unwrap();
/// assert_eq!(text, r#"[{"StartScanning":{"Id":3}}]"#);
///
/// let decoded = codec
///     .decode(r#"[{"Ok":{"Id":3}},{"SensorReading":{"Id":0}}]"#)
///     .unwrap();
/// assert!(matches!(decoded[0], Ok(Message::Ok { id: RequestId(3) })));
/// assert!(decoded[1].is_err());
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode(&self, batch: &[Message]) -> Result<String, ProtocolError> {
        serde_json::to_string(batch).map_err(ProtocolError::Encode)
    }

    fn decode(&self, frame: &str) -> Result<DecodedBatch, ProtocolError> {
        let elements: Vec<serde_json::Value> =
            serde_json::from_str(frame).map_err(ProtocolError::Decode)?;
        Ok(elements.into_iter().map(decode_message).collect())
    }
}

/// Decodes one array element. A single-key object whose key isn't a
/// known message name is reported as `UnknownMessage`.
#[cfg(feature = "json")]
fn decode_message(value: serde_json::Value) -> Result<Message, ProtocolError> {
    let tag = value
        .as_object()
        .filter(|obj| obj.len() == 1)
        .and_then(|obj| obj.keys().next().cloned());

    serde_json::from_value(value).map_err(|e| match tag {
        Some(tag) if !Message::KINDS.contains(&tag.as_str()) => {
            ProtocolError::UnknownMessage(tag)
        }
        _ => ProtocolError::Decode(e),
    })
}
