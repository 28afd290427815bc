//! Core protocol types for the device-control wire format.
//!
//! Every structure here travels "on the wire": it is serialized to JSON,
//! sent over the WebSocket, and deserialized by the server (or the other
//! way around).
//!
//! The protocol's JSON conventions:
//!
//! - A frame is an array of messages.
//! - Each message is an object with exactly one key, the message name,
//!   whose value holds the fields: `{"Ok": {"Id": 7}}`. This is serde's
//!   default "externally tagged" enum representation.
//! - Field names are PascalCase (`DeviceIndex`, `MessageVersion`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The capability key a device advertises when it can vibrate.
pub const VIBRATE_CMD: &str = "VibrateCmd";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Correlation id carried by every message.
///
/// The client picks ids for its requests (starting at 1); the server
/// echoes the id back in the matching `Ok`/`ServerInfo`/`DeviceList`/
/// `Error`. Unsolicited server events (`DeviceAdded`, `DeviceRemoved`,
/// `ScanningFinished`) carry id 0.
///
/// `#[serde(transparent)]` serializes `RequestId(7)` as plain `7`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(pub u32);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Index of a device, assigned by the server.
///
/// Unique among connected devices. The server may hand the same index
/// back to a device that reconnects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceIndex(pub u32);

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Device description
// ---------------------------------------------------------------------------

/// Attributes of one message type a device accepts.
///
/// For `VibrateCmd` the interesting part is `FeatureCount`: how many
/// independently addressable motors the device has. Message types
/// without attributes (e.g. `StopDeviceCmd`) arrive as `{}`, so both
/// fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_count: Option<Vec<u32>>,
}

/// One entry of a `DeviceList` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceInfo {
    pub device_index: DeviceIndex,
    pub device_name: String,
    /// Message name → attributes. A device can only be sent the
    /// messages listed here.
    #[serde(default)]
    pub device_messages: BTreeMap<String, MessageAttributes>,
}

impl DeviceInfo {
    /// Number of vibration features, or `None` if the device can't vibrate.
    pub fn vibrate_feature_count(&self) -> Option<u32> {
        self.device_messages
            .get(VIBRATE_CMD)
            .and_then(|attrs| attrs.feature_count)
    }

    /// Fans `speed` out across every vibration feature of this device.
    ///
    /// Returns `None` if the device has no vibration capability.
    pub fn vibrate_speeds(&self, speed: f64) -> Option<Vec<FeatureSpeed>> {
        let count = self.vibrate_feature_count()?;
        Some(
            (0..count)
                .map(|index| FeatureSpeed { index, speed })
                .collect(),
        )
    }
}

/// The requested speed for one vibration feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureSpeed {
    pub index: u32,
    /// Intensity in `0.0..=1.0`.
    pub speed: f64,
}

// ---------------------------------------------------------------------------
// Message: the closed set of protocol messages
// ---------------------------------------------------------------------------

/// A single protocol message, in either direction.
///
/// One enum covers both directions: the client only *sends* the request
/// variants, but decoding into the same type means an unexpected echo
/// from the server still parses and can be logged instead of failing
/// the whole batch.
///
/// `#[serde(rename_all_fields = "PascalCase")]` renames the fields of
/// every struct variant, so `device_index` goes on the wire as
/// `DeviceIndex`. Unknown extra fields (newer servers add some) are
/// ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all_fields = "PascalCase")]
pub enum Message {
    // -- Handshake --

    /// Client → Server: first message on a new connection.
    RequestServerInfo {
        id: RequestId,
        message_version: u32,
        client_name: String,
    },

    /// Server → Client: reply to `RequestServerInfo`.
    ServerInfo {
        id: RequestId,
        message_version: u32,
        /// Milliseconds the server waits for a ping before stopping
        /// devices. 0 disables the ping requirement.
        #[serde(default)]
        max_ping_time: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        server_name: Option<String>,
    },

    // -- Enumeration --

    /// Client → Server: "which devices are connected?"
    RequestDeviceList { id: RequestId },

    /// Server → Client: snapshot of all connected devices.
    DeviceList {
        id: RequestId,
        devices: Vec<DeviceInfo>,
    },

    /// Server → Client: a device connected. Only the index is used;
    /// capabilities are fetched with a fresh `RequestDeviceList`.
    DeviceAdded {
        id: RequestId,
        device_index: DeviceIndex,
    },

    /// Server → Client: a device disconnected.
    DeviceRemoved {
        id: RequestId,
        device_index: DeviceIndex,
    },

    // -- Scanning --

    /// Client → Server: start looking for devices.
    StartScanning { id: RequestId },

    /// Client → Server: stop looking for devices.
    StopScanning { id: RequestId },

    /// Server → Client: scanning stopped on its own.
    ScanningFinished { id: RequestId },

    // -- Device commands --

    /// Client → Server: stop every connected device.
    StopAllDevices { id: RequestId },

    /// Client → Server: set per-feature vibration speeds.
    VibrateCmd {
        id: RequestId,
        device_index: DeviceIndex,
        speeds: Vec<FeatureSpeed>,
    },

    // -- Status --

    /// Server → Client: the request with this id succeeded.
    Ok { id: RequestId },

    /// Server → Client: the request with this id failed.
    Error {
        id: RequestId,
        error_message: String,
        #[serde(default)]
        error_code: u32,
    },
}

impl Message {
    /// Every wire name this crate can decode, as returned by [`kind`](Self::kind).
    pub const KINDS: &'static [&'static str] = &[
        "RequestServerInfo",
        "ServerInfo",
        "RequestDeviceList",
        "DeviceList",
        "DeviceAdded",
        "DeviceRemoved",
        "StartScanning",
        "StopScanning",
        "ScanningFinished",
        "StopAllDevices",
        "VibrateCmd",
        "Ok",
        "Error",
    ];

    /// The correlation id carried by this message.
    pub fn id(&self) -> RequestId {
        match self {
            Self::RequestServerInfo { id, .. }
            | Self::ServerInfo { id, .. }
            | Self::RequestDeviceList { id }
            | Self::DeviceList { id, .. }
            | Self::DeviceAdded { id, .. }
            | Self::DeviceRemoved { id, .. }
            | Self::StartScanning { id }
            | Self::StopScanning { id }
            | Self::ScanningFinished { id }
            | Self::StopAllDevices { id }
            | Self::VibrateCmd { id, .. }
            | Self::Ok { id }
            | Self::Error { id, .. } => *id,
        }
    }

    /// The wire name of this message, e.g. `"StartScanning"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestServerInfo { .. } => "RequestServerInfo",
            Self::ServerInfo { .. } => "ServerInfo",
            Self::RequestDeviceList { .. } => "RequestDeviceList",
            Self::DeviceList { .. } => "DeviceList",
            Self::DeviceAdded { .. } => "DeviceAdded",
            Self::DeviceRemoved { .. } => "DeviceRemoved",
            Self::StartScanning { .. } => "StartScanning",
            Self::StopScanning { .. } => "StopScanning",
            Self::ScanningFinished { .. } => "ScanningFinished",
            Self::StopAllDevices { .. } => "StopAllDevices",
            Self::VibrateCmd { .. } => "VibrateCmd",
            Self::Ok { .. } => "Ok",
            Self::Error { .. } => "Error",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
