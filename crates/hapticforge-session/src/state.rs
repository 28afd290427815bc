//! The translator's bookkeeping: device registry, command backlog,
//! scan state and in-flight requests.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use hapticforge_protocol::{DeviceIndex, DeviceInfo, RequestId};
use hapticforge_resolver::Resolution;

use crate::CachedCommand;

// ---------------------------------------------------------------------------
// ScanState
// ---------------------------------------------------------------------------

/// Where the session is in its scan cycle.
///
/// ```text
///   Idle ──(trigger)──→ Scanning ──(window elapsed)──→ Stopping
///    ↑                                                    │
///    └──────────────(StopScanning acknowledged)───────────┘
/// ```
///
/// Both `Scanning` and `Stopping` count as an active scan: a trigger in
/// either state is a no-op. The request id tags the cycle so a stale
/// timer can't stop a newer scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// `StartScanning` was sent with this id; the window is open.
    Scanning { request: RequestId },
    /// `StopScanning` was sent with this id; waiting for its ack.
    Stopping { request: RequestId },
}

impl ScanState {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Scanning { .. } => write!(f, "Scanning"),
            Self::Stopping { .. } => write!(f, "Stopping"),
        }
    }
}

// ---------------------------------------------------------------------------
// PendingRequest
// ---------------------------------------------------------------------------

/// An outbound request waiting for the server's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    /// Wire name of the request, for logs.
    pub kind: &'static str,
}

// ---------------------------------------------------------------------------
// DeviceRegistry
// ---------------------------------------------------------------------------

/// Devices the server has reported, keyed by index.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceIndex, DeviceInfo>,
}

impl DeviceRegistry {
    /// Inserts or replaces the entry for `device.device_index`.
    pub fn insert(&mut self, device: DeviceInfo) {
        self.devices.insert(device.device_index, device);
    }

    pub fn remove(&mut self, index: DeviceIndex) -> Option<DeviceInfo> {
        self.devices.remove(&index)
    }

    /// Finds the device an address points at.
    ///
    /// Index addresses are a direct lookup. Name and first-match
    /// addresses take the lowest-indexed device that matches.
    pub fn find(&self, target: &Resolution) -> Option<&DeviceInfo> {
        match target {
            Resolution::Index(index) => self.devices.get(index),
            _ => self
                .devices
                .values()
                .find(|d| target.matches(d.device_index, &d.device_name)),
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting for their device, in the order they were issued.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: VecDeque<CachedCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: CachedCommand) {
        self.commands.push_back(command);
    }

    /// Removes and returns every command addressed to this device,
    /// keeping their relative order. The rest stay queued.
    pub fn take_matching(
        &mut self,
        index: DeviceIndex,
        name: &str,
    ) -> Vec<CachedCommand> {
        let (ready, waiting): (Vec<_>, Vec<_>) = self
            .commands
            .drain(..)
            .partition(|cmd| cmd.target.matches(index, name));
        self.commands = waiting.into();
        ready
    }

    /// Drops the whole backlog, returning how many commands it held.
    pub fn clear(&mut self) -> usize {
        let dropped = self.commands.len();
        self.commands.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RequestIds
// ---------------------------------------------------------------------------

/// Hands out request ids 1, 2, 3, ... and never repeats one.
///
/// Id 0 is what the server puts on unsolicited events, so it is never
/// handed out. Once `u32::MAX` has been used the allocator is spent.
#[derive(Debug, Clone)]
pub struct RequestIds {
    next: Option<u32>,
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl RequestIds {
    pub fn starting_at(first: u32) -> Self {
        Self { next: Some(first) }
    }

    /// The next id, or `None` once every id has been used.
    pub fn allocate(&mut self) -> Option<RequestId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(RequestId(id))
    }

    pub fn peek(&self) -> Option<RequestId> {
        self.next.map(RequestId)
    }
}

// ---------------------------------------------------------------------------
// SessionInfo
// ---------------------------------------------------------------------------

/// A snapshot of the translator's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub scan: ScanState,
    /// Number of registered devices.
    pub devices: usize,
    /// Number of commands waiting for a device.
    pub queued: usize,
    /// Number of requests waiting for an answer.
    pub pending: usize,
    /// The id the next request will get, `None` once ids have run out.
    pub next_id: Option<RequestId>,
}
