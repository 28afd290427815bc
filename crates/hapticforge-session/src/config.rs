//! Session configuration.

use std::time::Duration;

use hapticforge_protocol::MESSAGE_VERSION;
use hapticforge_waveform::WaveformConfig;
use tracing::warn;

/// Configuration for a translator session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sent to the server in `RequestServerInfo`.
    pub client_name: String,

    /// Protocol message version announced during the handshake.
    pub message_version: u32,

    /// How long one scan window stays open before `StopScanning` is sent.
    ///
    /// Default: 30 seconds.
    pub scan_duration: Duration,

    /// Capacity of the command channel in front of the translator.
    /// Senders wait when it fills up.
    pub channel_size: usize,

    /// Pulse and heartbeat timing.
    pub waveform: WaveformConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_name: "hapticforge".to_string(),
            message_version: MESSAGE_VERSION,
            scan_duration: Duration::from_secs(30),
            channel_size: 256,
            waveform: WaveformConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Replaces unusable values with defaults.
    ///
    /// A zero scan window would stop every scan the moment it starts,
    /// and a zero channel size is rejected by tokio.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.scan_duration.is_zero() {
            warn!("scan_duration is zero, using default");
            self.scan_duration = defaults.scan_duration;
        }
        if self.channel_size == 0 {
            warn!("channel_size is zero, using default");
            self.channel_size = defaults.channel_size;
        }
        if self.client_name.trim().is_empty() {
            warn!("client_name is empty, using default");
            self.client_name = defaults.client_name;
        }
        self.waveform = self.waveform.validated();
        self
    }
}
