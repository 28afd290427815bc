//! Wire protocol for Hapticforge.
//!
//! This crate defines the messages exchanged with a Buttplug-family
//! device-control server:
//!
//! - **Types** ([`Message`], [`DeviceInfo`], [`FeatureSpeed`], etc.):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how batches of
//!   messages are converted to/from text.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and the
//! session translator (device state). It doesn't know about connections
//! or devices. It only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (text) → Protocol (Vec<Message>) → Session (devices, queue)
//! ```
//!
//! Every frame on the wire is a JSON *array* of messages, even when it
//! only carries one. The codec works on whole batches.

mod codec;
mod error;
mod types;

pub use codec::{Codec, DecodedBatch};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    DeviceIndex, DeviceInfo, FeatureSpeed, Message, MessageAttributes,
    RequestId, VIBRATE_CMD,
};

/// The protocol message version this client speaks.
///
/// Sent in `RequestServerInfo`. Version 2 is the protocol revision that
/// introduced `VibrateCmd` with per-feature speeds.
pub const MESSAGE_VERSION: u32 = 2;
