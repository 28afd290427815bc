//! Unified error type for Hapticforge.

use hapticforge_session::SessionError;
use hapticforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HapticError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A session-level error (unknown request, missing capability,
    /// a request that couldn't be encoded).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The session task panicked or was cancelled.
    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The client configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use hapticforge_protocol::RequestId;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let haptic_err: HapticError = err.into();
        assert!(matches!(haptic_err, HapticError::Transport(_)));
        assert!(haptic_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::UnknownRequest {
            id: RequestId(9),
            kind: "Ok",
        };
        let haptic_err: HapticError = err.into();
        assert!(matches!(haptic_err, HapticError::Session(_)));
        assert!(haptic_err.to_string().contains("req-9"));
    }
}
