//! The session translator for Hapticforge.
//!
//! This crate turns short text commands into device-control requests
//! and keeps track of what the server has told us:
//!
//! 1. **Commands**: parsing `VIBRATE 3 0.5`-style lines ([`Command`])
//! 2. **Devices**: which devices are connected ([`DeviceRegistry`])
//! 3. **Backlog**: commands waiting for a device that hasn't shown up
//!    yet ([`CommandQueue`]), flushed when it does
//! 4. **Scanning**: asking the server to look for devices, for a
//!    bounded window, again and again while the backlog is non-empty
//!    ([`ScanState`])
//! 5. **Correlation**: every request gets a fresh id and stays pending
//!    until the server answers it
//!
//! All of this lives in one actor task; [`SessionHandle`] talks to it.
//!
//! # How it fits in the stack
//!
//! ```text
//! CLI / client loop (above)  ← feeds command lines and inbound frames
//!     ↕
//! Session Layer (this crate) ← devices, backlog, scans, waveforms
//!     ↕
//! Protocol Layer (below)     ← Message types, JsonCodec
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hapticforge_resolver::DeviceResolver;
//! use hapticforge_session::{SessionConfig, spawn_session};
//!
//! # async fn demo() -> Result<(), hapticforge_session::SessionError> {
//! let (handle, mut outbound, _task) =
//!     spawn_session(DeviceResolver::default(), SessionConfig::default());
//!
//! handle.handshake().await?;
//! handle.command("VIBRATE 0 0.5").await?;
//!
//! while let Some(frame) = outbound.recv().await {
//!     // hand `frame` to the transport
//!     # let _ = frame;
//! }
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod error;
mod state;
mod translator;

pub use command::{Action, CachedCommand, Command};
pub use config::SessionConfig;
pub use error::{CommandError, SessionError};
pub use state::{
    CommandQueue, DeviceRegistry, PendingRequest, RequestIds, ScanState,
    SessionInfo,
};
pub use translator::{
    OutboundReceiver, SessionHandle, spawn_session, spawn_session_with_codec,
};
