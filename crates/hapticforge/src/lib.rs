//! # Hapticforge
//!
//! Drive haptic devices on a Buttplug-family server with short text
//! commands.
//!
//! Hapticforge connects to the server over WebSocket, keeps track of
//! connected devices, queues commands for devices that haven't shown up
//! yet (scanning until they do), and plays pulse and heartbeat
//! waveforms.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hapticforge::prelude::*;
//!
//! # async fn demo() -> Result<(), HapticError> {
//! let client = HapticClient::builder().build().await?;
//! client.session().command("VIBRATE @1 0.5").await?;
//! client.run().await
//! # }
//! ```

mod client;
mod error;
mod handler;

pub use client::{ClientConfig, DEFAULT_URL, HapticClient, HapticClientBuilder};
pub use error::HapticError;

pub use hapticforge_protocol as protocol;
pub use hapticforge_resolver as resolver;
pub use hapticforge_session as session;
pub use hapticforge_transport as transport;
pub use hapticforge_waveform as waveform;

pub mod prelude {
    pub use crate::{ClientConfig, HapticClient, HapticClientBuilder, HapticError};
    pub use hapticforge_resolver::{DeviceResolver, DeviceRule, Resolution};
    pub use hapticforge_session::{SessionConfig, SessionHandle};
    pub use hapticforge_waveform::{PowerLevel, WaveformConfig};
}
