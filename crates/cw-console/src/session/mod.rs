//! Console session: one Guacamole client per window
//!
//! [`ConsoleSession`] owns the tunnel for a single console window. Input is
//! queued fire-and-forget to a background I/O task; everything that comes
//! back is applied to the session's own state in [`ConsoleSession::next_event`]
//! and surfaced as [`SessionEvent`]s. Transport and protocol failures never
//! escape as `Err`: they are stored as display text in `last_error` and
//! emitted as [`SessionEvent::Error`].

mod io;
mod token;
mod tunnel;

pub use token::{AuthSource, TokenClient};
pub use tunnel::{
    connect_data, status_for_close_code, ChannelConnector, GatewayEnd, TunnelConnector,
    TunnelSink, TunnelStream, TunnelTransport, WebSocketConnector, GUACAMOLE_SUBPROTOCOL,
    UPSTREAM_NOT_FOUND,
};

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cw_core::config::TunnelConfig;
use cw_core::{
    ConnectionError, ConnectionId, ConnectionUrl, ConsoleSpec, DisplayMetrics, SessionError,
};
use cw_protocol::{Instruction, Opcode, ProtocolError, StatusCode, StreamAllocator, StreamIndex};

use io::{TunnelMessage, TunnelRequest};

/// X11 keysyms sent for Ctrl-Alt-Del: Control_L, Alt_L, Delete
pub const CTRL_ALT_DEL_KEYSYMS: [u32; 3] = [65507, 65513, 65535];

/// Keysym the on-screen keyboard uses for its Ctrl-Alt-Del key
pub const VIRTUAL_CTRL_ALT_DEL: u32 = 99999;

/// Only plain-text clipboard streams are bridged
pub const CLIPBOARD_MIMETYPE: &str = "text/plain";

/// Raw bytes per outbound `blob`
const CLIPBOARD_CHUNK_SIZE: usize = 4096;

/// Guacamole client state, numbered as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle = 0,
    Connecting = 1,
    Waiting = 2,
    Connected = 3,
    Disconnecting = 4,
    Disconnected = 5,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "IDLE"),
            SessionState::Connecting => write!(f, "CONNECTING"),
            SessionState::Waiting => write!(f, "WAITING"),
            SessionState::Connected => write!(f, "CONNECTED"),
            SessionState::Disconnecting => write!(f, "DISCONNECTING"),
            SessionState::Disconnected => write!(f, "DISCONNECTED"),
        }
    }
}

/// Something the owning window needs to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    /// Size of the remote display (layer 0)
    DisplaySize(DisplayMetrics),
    /// Text copied on the remote desktop
    Clipboard(String),
    /// Connection failed; display text for the retry chrome
    Error(String),
}

/// Channels to the running I/O task
struct TunnelLink {
    outbound: mpsc::UnboundedSender<Instruction>,
    inbound: mpsc::UnboundedReceiver<TunnelMessage>,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

/// The protocol client of one console window
pub struct ConsoleSession {
    connection_id: ConnectionId,
    connection_type: String,
    url: ConnectionUrl,
    config: TunnelConfig,
    connector: Arc<dyn TunnelConnector>,
    tokens: TokenClient,
    state: SessionState,
    last_error: Option<String>,
    auth_token: Option<String>,
    display: Option<DisplayMetrics>,
    link: Option<TunnelLink>,
    streams: StreamAllocator,
    clipboard_in: HashMap<StreamIndex, Vec<u8>>,
    pending: VecDeque<SessionEvent>,
}

impl ConsoleSession {
    /// Create an idle session for `spec`
    pub fn new(spec: &ConsoleSpec, config: TunnelConfig, connector: Arc<dyn TunnelConnector>) -> Self {
        let tokens = TokenClient::new(&config);
        Self {
            connection_id: spec.connection_id.clone(),
            connection_type: spec.connection_type.clone(),
            url: spec.connection_url.clone(),
            config,
            connector,
            tokens,
            state: SessionState::Idle,
            last_error: None,
            auth_token: None,
            display: None,
            link: None,
            streams: StreamAllocator::new(),
            clipboard_in: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Whether a tunnel (or an attempt to open one) exists
    pub fn has_tunnel(&self) -> bool {
        self.link.is_some()
    }

    /// Display text of the last failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Token of the last successful token resolution
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Remote display size, once the gateway has reported it
    pub fn display(&self) -> Option<DisplayMetrics> {
        self.display
    }

    /// Open the tunnel with a pre-issued token
    pub fn connect(&mut self, token: &str) -> Result<(), SessionError> {
        self.connect_with(AuthSource::Token(token.to_string()))
    }

    /// Open the tunnel, resolving a token from `auth` first.
    ///
    /// Rejected while a tunnel already exists so a repeated setup cannot
    /// open a second one.
    pub fn connect_with(&mut self, auth: AuthSource) -> Result<(), SessionError> {
        if self.link.is_some() {
            tracing::warn!("Ignoring duplicate connect for {}", self.connection_id);
            return Err(SessionError::AlreadyConnected(self.connection_id.to_string()));
        }

        self.last_error = None;
        self.display = None;
        self.clipboard_in.clear();
        self.set_state(SessionState::Connecting);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let request = TunnelRequest {
            connector: Arc::clone(&self.connector),
            tokens: self.tokens.clone(),
            url: self.url.clone(),
            auth,
            connection_id: self.connection_id.clone(),
            connection_type: self.connection_type.clone(),
            config: self.config.clone(),
        };
        let task = tokio::spawn(io::run(request, outbound_rx, inbound_tx, cancel.clone()));

        self.link = Some(TunnelLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
            cancel,
            _task: task,
        });
        Ok(())
    }

    /// Close the tunnel. Safe to call any number of times.
    pub fn disconnect(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };

        tracing::info!("Disconnecting console {}", self.connection_id);
        self.set_state(SessionState::Disconnecting);
        let _ = link.outbound.send(Instruction::disconnect());
        link.cancel.cancel();
        self.clipboard_in.clear();
        self.set_state(SessionState::Disconnected);
    }

    /// Pointer state in remote framebuffer coordinates
    pub fn send_pointer(&self, button_mask: u8, x: i32, y: i32) {
        self.send_input(Instruction::mouse(x, y, button_mask));
    }

    /// Key press or release; the on-screen keyboard's Ctrl-Alt-Del key
    /// expands to the three real keys
    pub fn send_key(&self, pressed: bool, keysym: u32) {
        if keysym == VIRTUAL_CTRL_ALT_DEL {
            for keysym in CTRL_ALT_DEL_KEYSYMS {
                self.send_input(Instruction::key(keysym, pressed));
            }
        } else {
            self.send_input(Instruction::key(keysym, pressed));
        }
    }

    /// Press then release Ctrl-Alt-Del
    pub fn send_ctrl_alt_del(&self) {
        self.send_key(true, VIRTUAL_CTRL_ALT_DEL);
        self.send_key(false, VIRTUAL_CTRL_ALT_DEL);
    }

    /// Ask the gateway to resize the remote display
    pub fn resize(&self, width: u32, height: u32) {
        tracing::debug!("Requesting remote size {}x{}", width, height);
        self.send_input(Instruction::size(width, height));
    }

    /// Copy text to the remote clipboard as a `text/plain` stream
    pub fn send_clipboard_text(&mut self, text: &str) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected(self.connection_id.to_string()));
        }

        let stream = self.streams.allocate();
        self.send(Instruction::clipboard(stream, CLIPBOARD_MIMETYPE))?;
        for chunk in text.as_bytes().chunks(CLIPBOARD_CHUNK_SIZE) {
            self.send(Instruction::blob(stream, chunk))?;
        }
        self.send(Instruction::end(stream))
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once there is no tunnel and nothing left to report.
    /// Cancel-safe, so it can sit in a `select!`.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            let message = match self.link.as_mut() {
                Some(link) => link.inbound.recv().await,
                None => return None,
            };

            match message {
                Some(message) => self.handle_message(message),
                None => {
                    // I/O task ended without a verdict; treat as a clean close.
                    self.link = None;
                    self.set_state(SessionState::Disconnected);
                }
            }
        }
    }

    fn handle_message(&mut self, message: TunnelMessage) {
        match message {
            TunnelMessage::Token(token) => self.auth_token = Some(token),
            TunnelMessage::Opened => self.set_state(SessionState::Waiting),
            TunnelMessage::Instruction(instruction) => {
                if let Err(e) = self.apply(&instruction) {
                    self.fail(ConnectionError::Protocol(e).to_string());
                }
            }
            TunnelMessage::Closed => {
                self.link = None;
                self.set_state(SessionState::Disconnected);
            }
            TunnelMessage::Failed(e) => self.fail(e.to_string()),
        }
    }

    fn apply(&mut self, instruction: &Instruction) -> Result<(), ProtocolError> {
        match instruction.kind() {
            Opcode::Sync => {
                if self.state == SessionState::Waiting {
                    self.set_state(SessionState::Connected);
                }
            }
            Opcode::Size => {
                let layer = instruction.arg_i64(0)?;
                if layer == 0 {
                    let metrics = DisplayMetrics::new(
                        dimension(instruction, 1)?,
                        dimension(instruction, 2)?,
                    );
                    tracing::debug!("Remote display is {}x{}", metrics.width, metrics.height);
                    self.display = Some(metrics);
                    self.pending.push_back(SessionEvent::DisplaySize(metrics));
                }
            }
            Opcode::Error => {
                let message = instruction.arg(0)?.to_string();
                let code = instruction.arg(1).ok().and_then(StatusCode::parse);
                tracing::warn!(
                    code = code.map(|c| c.to_string()).unwrap_or_default(),
                    "Gateway error for {}: {}",
                    self.connection_id,
                    message
                );
                self.fail(message);
            }
            Opcode::Clipboard => {
                let stream = stream_arg(instruction)?;
                if instruction.arg(1)? == CLIPBOARD_MIMETYPE {
                    self.clipboard_in.insert(stream, Vec::new());
                    self.send_quiet(Instruction::ack(stream, "OK", StatusCode::SUCCESS.as_u16()));
                } else {
                    self.send_quiet(Instruction::ack(
                        stream,
                        "Unsupported clipboard type",
                        StatusCode::UNSUPPORTED.as_u16(),
                    ));
                }
            }
            Opcode::Blob => {
                let stream = stream_arg(instruction)?;
                if let Some(buffer) = self.clipboard_in.get_mut(&stream) {
                    buffer.extend(instruction.blob_data()?);
                    self.send_quiet(Instruction::ack(stream, "OK", StatusCode::SUCCESS.as_u16()));
                }
            }
            Opcode::End => {
                let stream = stream_arg(instruction)?;
                if let Some(buffer) = self.clipboard_in.remove(&stream) {
                    let text = String::from_utf8_lossy(&buffer).into_owned();
                    tracing::debug!("Received {} bytes of remote clipboard", buffer.len());
                    self.pending.push_back(SessionEvent::Clipboard(text));
                }
            }
            Opcode::Ack => {
                let code = instruction.arg(2).ok().and_then(StatusCode::parse);
                if let Some(code) = code.filter(|c| !c.is_success()) {
                    tracing::warn!(
                        "Gateway rejected stream {}: {} ({})",
                        instruction.arg(0)?,
                        instruction.arg(1)?,
                        code
                    );
                }
            }
            Opcode::Disconnect => {
                tracing::info!("Gateway ended console {}", self.connection_id);
                if let Some(link) = self.link.take() {
                    link.cancel.cancel();
                }
                self.set_state(SessionState::Disconnected);
            }
            Opcode::Ready => {
                tracing::debug!("Gateway ready for {}", self.connection_id);
            }
            _ => {
                tracing::trace!(opcode = instruction.opcode(), "Ignoring instruction");
            }
        }
        Ok(())
    }

    fn fail(&mut self, message: String) {
        if let Some(link) = self.link.take() {
            link.cancel.cancel();
        }
        self.clipboard_in.clear();
        self.last_error = Some(message.clone());
        self.pending.push_back(SessionEvent::Error(message));
        self.set_state(SessionState::Disconnected);
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            tracing::info!("Console {} state: {} -> {}", self.connection_id, self.state, state);
            self.state = state;
            self.pending.push_back(SessionEvent::StateChanged(state));
        }
    }

    fn send(&self, instruction: Instruction) -> Result<(), SessionError> {
        let link = self
            .link
            .as_ref()
            .ok_or_else(|| SessionError::NotConnected(self.connection_id.to_string()))?;
        link.outbound
            .send(instruction)
            .map_err(|_| SessionError::Closed(self.connection_id.to_string()))
    }

    /// Protocol replies; dropped silently once the tunnel is gone
    fn send_quiet(&self, instruction: Instruction) {
        let _ = self.send(instruction);
    }

    /// User input only goes out on a connected session
    fn send_input(&self, instruction: Instruction) {
        if !self.is_connected() {
            tracing::trace!(opcode = instruction.opcode(), "Dropping input while not connected");
            return;
        }
        self.send_quiet(instruction);
    }
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            link.cancel.cancel();
        }
    }
}

impl fmt::Debug for ConsoleSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSession")
            .field("connection_id", &self.connection_id)
            .field("url", &self.url)
            .field("state", &self.state)
            .field("last_error", &self.last_error)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

fn stream_arg(instruction: &Instruction) -> Result<StreamIndex, ProtocolError> {
    let raw = instruction.arg(0)?;
    StreamIndex::parse(raw).ok_or_else(|| ProtocolError::Malformed {
        opcode: instruction.opcode().to_string(),
        reason: format!("invalid stream index {:?}", raw),
    })
}

fn dimension(instruction: &Instruction, index: usize) -> Result<u32, ProtocolError> {
    let value = instruction.arg_i64(index)?;
    u32::try_from(value).map_err(|_| ProtocolError::Malformed {
        opcode: instruction.opcode().to_string(),
        reason: format!("negative dimension {}", value),
    })
}
