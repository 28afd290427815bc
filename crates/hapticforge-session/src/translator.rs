//! The translator actor: a single Tokio task that owns all session state.
//!
//! Command lines, inbound frames and the scan timer all reach the actor
//! through channels and are handled one at a time, so the registry,
//! backlog, scan state and request ids never see concurrent mutation.
//!
//! Waveforms play inline: while a pulse or heartbeat runs, the actor
//! sleeps between steps and nothing else is processed. Commands and
//! frames that arrive meanwhile wait in the channel. A waveform can't
//! be cut short; STOP takes effect once it finishes.

use std::collections::BTreeMap;

use hapticforge_protocol::{
    Codec, DeviceInfo, JsonCodec, Message, ProtocolError, RequestId,
};
use hapticforge_resolver::DeviceResolver;
use hapticforge_waveform::Waveform;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::{
    Action, CachedCommand, Command, CommandQueue, DeviceRegistry,
    PendingRequest, RequestIds, ScanState, SessionConfig, SessionError,
    SessionInfo,
};

/// Receiving end of the outbound stream: one encoded batch per item,
/// in send order.
pub type OutboundReceiver = mpsc::UnboundedReceiver<String>;

/// Commands sent to the translator through its channel.
pub(crate) enum SessionCommand {
    /// A raw command line from the user.
    Line(String),
    /// A raw inbound frame from the server.
    Inbound(String),
    /// Start the connection handshake.
    Handshake,
    /// Request a state snapshot.
    GetInfo { reply: oneshot::Sender<SessionInfo> },
    /// Tear down and stop.
    Shutdown,
}

/// Handle to a running translator. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Queues a command line. Malformed lines are logged by the
    /// translator and otherwise ignored.
    pub async fn command(&self, line: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::Line(line.into())).await
    }

    /// Queues an inbound frame (a JSON array of messages).
    pub async fn inbound(&self, frame: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::Inbound(frame.into())).await
    }

    /// Sends `RequestServerInfo`, requests the device list and starts a
    /// scan.
    pub async fn handshake(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Handshake).await
    }

    /// Returns a snapshot of the translator's state.
    ///
    /// The snapshot is taken after everything queued before this call
    /// has been handled.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Tells the translator to stop all devices and shut down.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}

/// What woke the actor up.
enum Wakeup {
    Command(Option<SessionCommand>),
    ScanElapsed(RequestId),
}

/// The internal translator state. Runs inside a Tokio task.
struct Translator<C: Codec> {
    resolver: DeviceResolver,
    config: SessionConfig,
    codec: C,
    receiver: mpsc::Receiver<SessionCommand>,
    outbound: mpsc::UnboundedSender<String>,
    /// The scan timer reports here with the `StartScanning` id it was
    /// armed for.
    timer_tx: mpsc::UnboundedSender<RequestId>,
    timer_rx: mpsc::UnboundedReceiver<RequestId>,
    scan_timer: Option<JoinHandle<()>>,
    scan: ScanState,
    devices: DeviceRegistry,
    queue: CommandQueue,
    pending: BTreeMap<RequestId, PendingRequest>,
    ids: RequestIds,
}

impl<C: Codec> Translator<C> {
    /// Runs the actor loop until shutdown, a closed command channel, or
    /// a fatal error.
    async fn run(mut self) -> Result<(), SessionError> {
        info!(client = %self.config.client_name, "session started");

        let result = loop {
            let wakeup = tokio::select! {
                cmd = self.receiver.recv() => Wakeup::Command(cmd),
                Some(started) = self.timer_rx.recv() => Wakeup::ScanElapsed(started),
            };

            let step = match wakeup {
                Wakeup::Command(Some(SessionCommand::Shutdown)) | Wakeup::Command(None) => {
                    break self.teardown();
                }
                Wakeup::Command(Some(cmd)) => self.dispatch(cmd).await,
                Wakeup::ScanElapsed(started) => self.on_scan_elapsed(started),
            };
            if let Err(e) = step {
                break Err(e);
            }
        };

        if let Some(timer) = self.scan_timer.take() {
            timer.abort();
        }
        match &result {
            Ok(()) => info!("session stopped"),
            Err(e) => error!(error = %e, "session failed"),
        }
        result
    }

    async fn dispatch(&mut self, cmd: SessionCommand) -> Result<(), SessionError> {
        match cmd {
            SessionCommand::Line(line) => self.handle_line(&line).await,
            SessionCommand::Inbound(frame) => self.handle_frame(&frame).await,
            SessionCommand::Handshake => self.handshake(),
            SessionCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
                Ok(())
            }
            // Handled by the run loop.
            SessionCommand::Shutdown => Ok(()),
        }
    }

    // -- Commands ---------------------------------------------------------

    async fn handle_line(&mut self, line: &str) -> Result<(), SessionError> {
        let command = match Command::parse(line, &self.resolver) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(line, error = %e, "ignoring malformed command");
                return Ok(());
            }
        };

        match command {
            Command::Stop => self.stop_all(),
            Command::Device(cmd) => self.run_addressed(cmd).await,
        }
    }

    fn stop_all(&mut self) -> Result<(), SessionError> {
        self.send(|id| Message::StopAllDevices { id })?;
        let dropped = self.queue.clear();
        info!(dropped, "stopped all devices");
        Ok(())
    }

    async fn run_addressed(&mut self, cmd: CachedCommand) -> Result<(), SessionError> {
        if let Some(device) = self.devices.find(&cmd.target).cloned() {
            return self.execute(&device, cmd.action).await;
        }

        info!(
            address = %cmd.target,
            action = %cmd.action,
            "device not connected, queueing command"
        );
        self.queue.push(cmd);
        self.trigger_scan()
    }

    async fn execute(&mut self, device: &DeviceInfo, action: Action) -> Result<(), SessionError> {
        debug!(device = %device.device_index, %action, "executing command");
        match action {
            Action::Connect => {
                info!(
                    device = %device.device_index,
                    name = %device.device_name,
                    "device connected"
                );
                Ok(())
            }
            Action::Vibrate(speed) => self.vibrate(device, speed),
            Action::Pulse(level) => {
                let wave = Waveform::pulse(level, 0.0, &self.config.waveform);
                wave.play(|intensity| self.vibrate(device, intensity)).await
            }
            Action::Heartbeat(level) => {
                let wave = Waveform::heartbeat(level, &self.config.waveform);
                wave.play(|intensity| self.vibrate(device, intensity)).await
            }
        }
    }

    fn vibrate(&mut self, device: &DeviceInfo, speed: f64) -> Result<(), SessionError> {
        let speeds = device
            .vibrate_speeds(speed)
            .ok_or_else(|| SessionError::MissingCapability {
                device: device.device_index,
                name: device.device_name.clone(),
            })?;
        let device_index = device.device_index;
        self.send(move |id| Message::VibrateCmd {
            id,
            device_index,
            speeds,
        })?;
        Ok(())
    }

    // -- Handshake and scanning -------------------------------------------

    fn handshake(&mut self) -> Result<(), SessionError> {
        let client_name = self.config.client_name.clone();
        let message_version = self.config.message_version;
        info!(%client_name, message_version, "starting handshake");

        self.send(move |id| Message::RequestServerInfo {
            id,
            message_version,
            client_name,
        })?;
        self.request_device_list()?;
        self.trigger_scan()
    }

    fn request_device_list(&mut self) -> Result<(), SessionError> {
        self.send(|id| Message::RequestDeviceList { id })?;
        Ok(())
    }

    /// Starts a scan window unless one is already active.
    fn trigger_scan(&mut self) -> Result<(), SessionError> {
        if self.scan.is_active() {
            debug!(scan = %self.scan, "scan already active");
            return Ok(());
        }

        let request = self.send(|id| Message::StartScanning { id })?;
        self.scan = ScanState::Scanning { request };

        let duration = self.config.scan_duration;
        let timer_tx = self.timer_tx.clone();
        self.scan_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = timer_tx.send(request);
        }));

        info!(secs = duration.as_secs_f64(), "scanning for devices");
        Ok(())
    }

    fn on_scan_elapsed(&mut self, started: RequestId) -> Result<(), SessionError> {
        if self.scan != (ScanState::Scanning { request: started }) {
            trace!(%started, scan = %self.scan, "stale scan timer");
            return Ok(());
        }

        self.scan_timer = None;
        let request = self.send(|id| Message::StopScanning { id })?;
        self.scan = ScanState::Stopping { request };
        info!("scan window elapsed, stopping scan");
        Ok(())
    }

    // -- Inbound ------------------------------------------------------------

    async fn handle_frame(&mut self, frame: &str) -> Result<(), SessionError> {
        let batch = match self.codec.decode(frame) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "skipping undecodable frame");
                return Ok(());
            }
        };

        for decoded in batch {
            match decoded {
                Ok(message) => self.handle_message(message).await?,
                Err(ProtocolError::UnknownMessage(kind)) => {
                    debug!(%kind, "unhandled message");
                }
                Err(e) => warn!(error = %e, "skipping undecodable message"),
            }
        }
        Ok(())
    }

    async fn handle_message(&mut self, message: Message) -> Result<(), SessionError> {
        trace!(kind = message.kind(), id = %message.id(), "inbound message");
        match message {
            Message::DeviceRemoved { device_index, .. } => {
                match self.devices.remove(device_index) {
                    Some(device) => info!(
                        device = %device_index,
                        name = %device.device_name,
                        "device disconnected"
                    ),
                    None => debug!(device = %device_index, "unknown device removed"),
                }
                Ok(())
            }
            Message::DeviceAdded { device_index, .. } => {
                debug!(device = %device_index, "device added, requesting device list");
                self.request_device_list()
            }
            Message::DeviceList { id, devices } => {
                if self.pending.contains_key(&id) {
                    self.discharge(id, "DeviceList")?;
                }
                for device in devices {
                    self.register(device).await?;
                }
                Ok(())
            }
            Message::ServerInfo {
                id,
                message_version,
                server_name,
                ..
            } => {
                info!(
                    server = server_name.as_deref().unwrap_or("unnamed"),
                    message_version,
                    "handshake complete"
                );
                self.discharge(id, "ServerInfo")
            }
            Message::Ok { id } => self.discharge(id, "Ok"),
            Message::Error {
                id,
                error_message,
                error_code,
            } => {
                warn!(%id, code = error_code, reason = %error_message, "server reported an error");
                if self.pending.contains_key(&id) {
                    self.discharge(id, "Error")?;
                }
                Ok(())
            }
            other => {
                debug!(kind = other.kind(), "unhandled message");
                Ok(())
            }
        }
    }

    async fn register(&mut self, device: DeviceInfo) -> Result<(), SessionError> {
        let index = device.device_index;
        info!(device = %index, name = %device.device_name, "device registered");
        self.devices.insert(device.clone());

        let ready = self.queue.take_matching(index, &device.device_name);
        if !ready.is_empty() {
            info!(device = %index, count = ready.len(), "issuing cached commands");
        }
        for cmd in ready {
            self.execute(&device, cmd.action).await?;
        }
        Ok(())
    }

    /// Removes the pending request answered by `id`.
    fn discharge(&mut self, id: RequestId, kind: &'static str) -> Result<(), SessionError> {
        let request = self
            .pending
            .remove(&id)
            .ok_or(SessionError::UnknownRequest { id, kind })?;
        trace!(%id, request = request.kind, answer = kind, "request discharged");

        if self.scan == (ScanState::Stopping { request: id }) {
            self.scan = ScanState::Idle;
            info!("scan stopped");
            if !self.queue.is_empty() {
                info!(queued = self.queue.len(), "devices still missing, scanning again");
                self.trigger_scan()?;
            }
        }
        Ok(())
    }

    // -- Outbound -----------------------------------------------------------

    /// Assigns the next id, records the request as pending and puts it
    /// on the outbound stream as a one-message batch.
    fn send(
        &mut self,
        build: impl FnOnce(RequestId) -> Message,
    ) -> Result<RequestId, SessionError> {
        let id = self.ids.allocate().ok_or(SessionError::IdsExhausted)?;

        let message = build(id);
        let kind = message.kind();
        let frame = self.codec.encode(std::slice::from_ref(&message))?;

        self.pending.insert(id, PendingRequest { id, kind });
        debug!(%id, kind, "sending request");
        self.outbound
            .send(frame)
            .map_err(|_| SessionError::OutboundClosed)?;
        Ok(id)
    }

    // -- Lifecycle ----------------------------------------------------------

    fn teardown(&mut self) -> Result<(), SessionError> {
        if let Some(timer) = self.scan_timer.take() {
            timer.abort();
        }
        let dropped = self.queue.clear();
        info!(dropped, "session shutting down, stopping all devices");
        self.send(|id| Message::StopAllDevices { id })?;
        Ok(())
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            scan: self.scan,
            devices: self.devices.len(),
            queued: self.queue.len(),
            pending: self.pending.len(),
            next_id: self.ids.peek(),
        }
    }
}

/// Spawns a translator speaking JSON.
///
/// Returns the handle, the outbound stream, and the task. The task ends
/// with `Ok` after [`SessionHandle::shutdown`] (or once every handle is
/// dropped), and with the error on anything fatal.
pub fn spawn_session(
    resolver: DeviceResolver,
    config: SessionConfig,
) -> (
    SessionHandle,
    OutboundReceiver,
    JoinHandle<Result<(), SessionError>>,
) {
    spawn_session_with_codec(resolver, config, JsonCodec)
}

/// Spawns a translator with a custom codec.
pub fn spawn_session_with_codec<C: Codec>(
    resolver: DeviceResolver,
    config: SessionConfig,
    codec: C,
) -> (
    SessionHandle,
    OutboundReceiver,
    JoinHandle<Result<(), SessionError>>,
) {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.channel_size);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (timer_tx, timer_rx) = mpsc::unbounded_channel();

    let translator = Translator {
        resolver,
        config,
        codec,
        receiver: rx,
        outbound: outbound_tx,
        timer_tx,
        timer_rx,
        scan_timer: None,
        scan: ScanState::Idle,
        devices: DeviceRegistry::default(),
        queue: CommandQueue::default(),
        pending: BTreeMap::new(),
        ids: RequestIds::default(),
    };

    let task = tokio::spawn(translator.run());

    (SessionHandle { sender: tx }, outbound_rx, task)
}
