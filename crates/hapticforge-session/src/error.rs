//! Error types for the session layer.

use hapticforge_protocol::{DeviceIndex, ProtocolError, RequestId};
use hapticforge_resolver::ResolveError;
use hapticforge_waveform::ParsePowerLevelError;

/// Errors from parsing a command line.
///
/// These are recoverable: the line is reported and dropped, nothing
/// else changes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The first token isn't a known keyword. Keywords are uppercase.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// The keyword was given the wrong number of arguments.
    #[error("{keyword} expects {expected} argument(s), found {found}")]
    WrongArity {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },

    /// `VIBRATE` power isn't a number in `0.0..=1.0`.
    #[error("invalid power `{0}`, expected a number between 0.0 and 1.0")]
    InvalidPower(String),

    #[error(transparent)]
    InvalidLevel(#[from] ParsePowerLevelError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors that end a session.
///
/// Malformed commands and undecodable frames never show up here; they
/// are logged and skipped. Everything below means the session's view of
/// the world can no longer be trusted, so the translator stops.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server acknowledged a request id we never sent (or already
    /// saw acknowledged).
    #[error("{kind} for {id} matches no pending request")]
    UnknownRequest { id: RequestId, kind: &'static str },

    /// A vibration was addressed to a device that can't vibrate.
    #[error("device {device} ({name}) has no vibration capability")]
    MissingCapability { device: DeviceIndex, name: String },

    /// Every request id has been used; a new one would collide with a
    /// request the server may still answer.
    #[error("request ids exhausted")]
    IdsExhausted,

    /// Nobody is reading outbound frames any more.
    #[error("outbound channel closed")]
    OutboundClosed,

    /// The translator task has stopped.
    #[error("session is unavailable")]
    Unavailable,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
