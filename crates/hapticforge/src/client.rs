//! `HapticClient` builder and run loop.
//!
//! This is the entry point for driving a device server. It ties
//! together all the layers: transport → protocol → session.

use hapticforge_resolver::{DeviceResolver, DeviceRule, parse_alias_file};
use hapticforge_session::{
    OutboundReceiver, SessionConfig, SessionError, SessionHandle, spawn_session,
};
use hapticforge_transport::{Connection, WebSocketConnection};
use tokio::task::JoinHandle;

use crate::HapticError;
use crate::handler::pump;

/// Where Intiface-style servers listen by default.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:12345";

/// Everything needed to start a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server URL, `ws://` or `wss://`.
    pub url: String,
    /// Alias rules, in priority order for tie-breaks.
    pub rules: Vec<DeviceRule>,
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            rules: Vec::new(),
            session: SessionConfig::default(),
        }
    }
}

/// Builder for configuring and connecting a client.
///
/// # Example
///
/// ```rust,no_run
/// use hapticforge::prelude::*;
///
/// # async fn demo() -> Result<(), HapticError> {
/// let client = HapticClient::builder()
///     .url("ws://127.0.0.1:12345")
///     .rules_from_str("alias * @1\n")
///     .build()
///     .await?;
///
/// let session = client.session();
/// session.command("PULSE 0 HIGH").await?;
/// client.run().await
/// # }
/// ```
#[derive(Debug, Default)]
pub struct HapticClientBuilder {
    config: ClientConfig,
}

impl HapticClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    /// Sets the alias rules.
    pub fn rules(mut self, rules: Vec<DeviceRule>) -> Self {
        self.config.rules = rules;
        self
    }

    /// Parses alias rules from the text of an alias file. Malformed
    /// lines are logged and skipped.
    pub fn rules_from_str(mut self, text: &str) -> Self {
        self.config.rules = parse_alias_file(text).rules;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Connects to the server, starts the session and queues the
    /// handshake.
    ///
    /// Handshake requests go out once [`HapticClient::run`] starts, ahead
    /// of any command issued through [`HapticClient::session`].
    pub async fn build(self) -> Result<HapticClient, HapticError> {
        let ClientConfig {
            url,
            rules,
            session,
        } = self.config;

        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(HapticError::Config(format!(
                "url must start with ws:// or wss://, got `{url}`"
            )));
        }

        let conn = WebSocketConnection::connect(&url).await?;

        tracing::debug!(rules = rules.len(), "loaded alias rules");
        let (handle, outbound, task) =
            spawn_session(DeviceResolver::new(rules), session);
        handle.handshake().await?;

        Ok(HapticClient {
            conn,
            handle,
            outbound,
            task,
        })
    }
}

/// A connected client.
///
/// Call [`run()`](Self::run) to start moving frames.
pub struct HapticClient {
    conn: WebSocketConnection,
    handle: SessionHandle,
    outbound: OutboundReceiver,
    task: JoinHandle<Result<(), SessionError>>,
}

impl HapticClient {
    /// Creates a new builder.
    pub fn builder() -> HapticClientBuilder {
        HapticClientBuilder::new()
    }

    /// A handle for sending commands to the session.
    ///
    /// Call [`SessionHandle::shutdown`] on it to stop all devices and
    /// end [`run()`](Self::run).
    pub fn session(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Runs the client until the session stops.
    ///
    /// The session stops after a shutdown request, when the server
    /// closes the connection, or on a fatal session error (returned
    /// here).
    pub async fn run(mut self) -> Result<(), HapticError> {
        let conn_id = self.conn.id();
        tracing::info!(%conn_id, "client running");

        let pumped = pump(&self.conn, &self.handle, &mut self.outbound).await;
        drop(self.outbound);

        if let Err(e) = self.conn.close().await {
            tracing::debug!(%conn_id, error = %e, "close failed");
        }

        let session = self.task.await?;
        tracing::info!(%conn_id, "client stopped");
        pumped?;
        session.map_err(HapticError::from)
    }
}
