//! Console window controller
//!
//! A [`WindowController`] is the single owner of one window: its geometry,
//! its [`ConsoleSession`] and its [`ConnectionStateMachine`]. Timers never
//! touch that state directly; they post a [`Command`] into the controller's
//! own channel, which [`WindowController::next_event`] applies in order.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use cw_core::config::ConsoleConfig;
use cw_core::traits::{TelemetryEvent, TelemetrySink};
use cw_core::transform::{compute_scale, drag_offset};
use cw_core::{
    ConnectionId, ConsoleSpec, DisplayMetrics, LayoutStore, Point, PointerTransform, Rect,
    SessionError, Size, StoredLayout, WindowGeometry,
};

use super::{sizing, Notification, ZOrder};
use crate::docking::DockingCoordinator;
use crate::registry::{WindowHandle, WindowRegistry};
use crate::retry::{ConnectionState, ConnectionStateMachine, ReconnectFn, Severity, StatusView};
use crate::session::{AuthSource, ConsoleSession, SessionEvent, SessionState, TunnelConnector};

/// Services shared by every window
#[derive(Clone)]
pub struct WindowContext {
    pub config: ConsoleConfig,
    pub registry: Arc<WindowRegistry>,
    pub docking: Arc<DockingCoordinator>,
    pub layouts: Arc<dyn LayoutStore>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub connector: Arc<dyn TunnelConnector>,
    pub z_order: Arc<ZOrder>,
}

impl fmt::Debug for WindowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowContext")
            .field("registry", &self.registry)
            .field("docking", &self.docking)
            .finish_non_exhaustive()
    }
}

/// Something a renderer needs to redraw for
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// Connection chrome changed; see [`WindowController::status`]
    Connection(ConnectionState),
    /// Remote display size reported by the gateway
    Display(DisplayMetrics),
    /// Position, size or scale changed
    Geometry(WindowGeometry),
    /// Text copied on the remote desktop
    RemoteClipboard(String),
    /// Window closed; reported once
    Closed,
}

/// Work posted back to the controller by its timers and callbacks
#[derive(Debug)]
enum Command {
    Reconnect,
    Center,
    ResizeSettled,
    AssertSize,
}

/// One floating console window
pub struct WindowController {
    spec: ConsoleSpec,
    win_number: u32,
    ctx: WindowContext,

    session: ConsoleSession,
    session_live: bool,
    retry: ConnectionStateMachine,
    attempts: u32,
    auth_token: Option<String>,

    geometry: WindowGeometry,
    viewport: Size,
    /// Where the window was first placed; pointer offsets are relative to it
    initial_position: Point,
    /// Size to return to when un-maximizing
    last_resize_size: Size,
    display: Option<DisplayMetrics>,
    display_ready: bool,
    scale: Option<f64>,
    drag_start: Option<Point>,

    active: Arc<AtomicBool>,
    z_index: u32,

    closed: bool,
    close_reported: bool,
    layout_stored: bool,

    commands: mpsc::UnboundedSender<Command>,
    command_rx: mpsc::UnboundedReceiver<Command>,
    debounce: Option<JoinHandle<()>>,
    assertion: Option<JoinHandle<()>>,
}

impl WindowController {
    /// Create a window for `spec` and register it.
    ///
    /// Geometry comes from the stored layout when there is one; otherwise
    /// the window is sized from `viewport` and centered. The session is not
    /// connected until [`connect`](Self::connect).
    pub fn new(spec: ConsoleSpec, win_number: u32, viewport: Size, ctx: WindowContext) -> Self {
        let id = spec.connection_id.to_string();
        let stored = ctx.layouts.get(&id);
        let window_config = &ctx.config.window;

        let (position, size) = match stored {
            Some(layout) => (ctx.docking.viewport_to_screen(layout.position()), layout.size()),
            None => {
                let size = sizing::initial_size(viewport, window_config);
                (sizing::centered(viewport, size), size)
            }
        };
        let ratio = size
            .aspect_ratio()
            .unwrap_or_else(|| window_config.default_aspect_ratio());

        let mut geometry = WindowGeometry::new(position, size, ratio);
        if spec.is_tab {
            // Tabs are always maximized
            let maximized = sizing::maximized_size(
                viewport,
                ratio,
                spec.resize_method.is_aspect_locked(),
                window_config,
            );
            geometry.size = maximized;
            geometry.position = sizing::maximized_position(viewport, maximized);
            geometry.is_maximized = true;
        }

        let initial_position = geometry.position;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let reconnect_tx = commands.clone();
        let reconnect: ReconnectFn = Arc::new(move || {
            let _ = reconnect_tx.send(Command::Reconnect);
        });
        let retry = ConnectionStateMachine::new(ctx.config.retry.clone(), reconnect);

        let session = ConsoleSession::new(&spec, ctx.config.tunnel.clone(), Arc::clone(&ctx.connector));

        let active = Arc::new(AtomicBool::new(false));
        let handle = {
            let (on, off) = (Arc::clone(&active), Arc::clone(&active));
            let center_tx = commands.clone();
            WindowHandle::new(
                Arc::new(move || on.store(true, Ordering::SeqCst)),
                Arc::new(move || off.store(false, Ordering::SeqCst)),
                Arc::new(move || {
                    let _ = center_tx.send(Command::Center);
                }),
            )
        };
        ctx.registry.open(&id, handle);
        ctx.docking.set_position(&id, initial_position);
        ctx.docking.reset_zoom_base(&id, geometry.size);

        let z_index = ctx.z_order.next();
        tracing::info!(
            "Opened console window {} for {} ({})",
            win_number,
            spec.connection_id,
            spec.title
        );

        Self {
            spec,
            win_number,
            ctx,
            session,
            session_live: false,
            retry,
            attempts: 1,
            auth_token: None,
            geometry,
            viewport,
            initial_position,
            last_resize_size: size,
            display: None,
            display_ready: false,
            scale: None,
            drag_start: None,
            active,
            z_index,
            closed: false,
            close_reported: false,
            layout_stored: false,
            commands,
            command_rx,
            debounce: None,
            assertion: None,
        }
    }

    /// Log in and open the tunnel, then take input focus
    pub fn connect(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed(self.id().to_string()));
        }

        let auth = self.auth_source();
        self.session.connect_with(auth)?;
        self.session_live = true;
        self.retry.update(false, "", self.attempts);
        self.ctx.registry.set_active(self.id().as_str(), true);
        Ok(())
    }

    pub fn id(&self) -> &ConnectionId {
        &self.spec.connection_id
    }

    pub fn spec(&self) -> &ConsoleSpec {
        &self.spec
    }

    pub fn win_number(&self) -> u32 {
        self.win_number
    }

    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    /// Remote-to-local scale; `None` until the display size is known
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    pub fn display(&self) -> Option<DisplayMetrics> {
        self.display
    }

    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    /// Whether this window currently receives mouse and keyboard input
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.retry.state()
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Connection chrome to draw over the display
    pub fn status(&self) -> StatusView {
        self.retry.render()
    }

    /// Seconds until the next automatic reconnect
    pub fn seconds_until_retry(&self) -> u32 {
        self.retry.seconds_remaining()
    }

    /// Whether the paste action is offered
    pub fn supports_paste(&self) -> bool {
        self.spec.supports_clipboard_paste()
    }

    fn is_aspect_locked(&self) -> bool {
        self.spec.resize_method.is_aspect_locked()
    }

    fn auth_source(&self) -> AuthSource {
        if let Some(token) = self.auth_token.as_ref().or(self.spec.token.as_ref()) {
            AuthSource::Token(token.clone())
        } else if let Some(credentials) = &self.spec.credentials {
            AuthSource::Credentials(credentials.clone())
        } else if let Some(sso) = &self.spec.sso_token {
            AuthSource::Bearer(sso.clone())
        } else {
            AuthSource::Anonymous
        }
    }

    /// Bring the window to the front and give it input focus
    pub fn mouse_down(&mut self) {
        self.z_index = self.ctx.z_order.next();
        self.ctx.registry.set_active(self.id().as_str(), false);
    }

    /// Forward a pointer event given in screen space.
    ///
    /// Dropped unless this window is active and the display size is known.
    pub fn pointer(&self, screen: Point, button_mask: u8) -> bool {
        if self.closed || !self.is_active() {
            return false;
        }
        let Some(transform) = self.pointer_transform() else {
            return false;
        };
        let (x, y) = transform.to_remote_pixels(screen);
        self.session.send_pointer(button_mask, x, y);
        true
    }

    /// Transform for pointer events at the current position and scale
    pub fn pointer_transform(&self) -> Option<PointerTransform> {
        let offset = drag_offset(self.initial_position, self.geometry.position);
        PointerTransform::new(self.initial_position, offset, self.scale?)
    }

    /// Forward a key event; dropped unless this window is active
    pub fn key(&self, pressed: bool, keysym: u32) -> bool {
        if self.closed || !self.is_active() {
            return false;
        }
        self.session.send_key(pressed, keysym);
        true
    }

    pub fn ctrl_alt_del(&self) {
        if !self.closed {
            self.session.send_ctrl_alt_del();
        }
    }

    /// Pointer pressed on the title bar
    pub fn drag_start(&mut self, screen: Point) {
        // Maximized windows stay put
        if self.geometry.is_maximized || self.closed {
            return;
        }
        self.drag_start = Some(screen);
    }

    /// Pointer released after a title bar drag
    pub fn drag_stop(&mut self, screen: Point) -> &WindowGeometry {
        let Some(start) = self.drag_start.take() else {
            return &self.geometry;
        };

        let mut position = self.geometry.position - (start - screen);
        if self.ctx.docking.is_enabled() {
            self.ctx.docking.set_position(self.id().as_str(), position);
        } else {
            position = sizing::clamp_drag(
                position,
                self.geometry.size,
                self.viewport,
                &self.ctx.config.window,
            );
        }

        self.geometry.position = position;
        &self.geometry
    }

    /// Resize handle dragged to `size`
    pub fn resize(&mut self, size: Size) -> &WindowGeometry {
        if self.spec.is_tab || self.closed {
            return &self.geometry;
        }

        let size = if self.is_aspect_locked() {
            sizing::locked_resize(size, self.geometry.aspect_ratio, &self.ctx.config.window)
        } else {
            size
        };

        self.update_size(size, true);
        self.ctx.docking.reset_zoom_base(self.id().as_str(), size);
        self.geometry.is_maximized = false;
        &self.geometry
    }

    /// Resize handle released. Free windows ask the remote display to match.
    pub fn resize_stop(&mut self) {
        if self.is_aspect_locked() || self.closed {
            return;
        }

        let size = self.geometry.size;
        self.session.resize(size.width.round() as u32, size.height.round() as u32);
        self.display = Some(DisplayMetrics::new(
            size.width.round() as u32,
            size.height.round() as u32,
        ));
        if let Some(ratio) = size.aspect_ratio() {
            self.geometry.aspect_ratio = ratio;
        }
    }

    pub fn toggle_maximize(&mut self) -> &WindowGeometry {
        if self.geometry.is_maximized {
            self.restore()
        } else {
            self.maximize()
        }
    }

    /// Fill the viewport, remembering the current geometry for restore
    pub fn maximize(&mut self) -> &WindowGeometry {
        if self.geometry.is_maximized || self.closed {
            return &self.geometry;
        }

        let current = self.geometry.rect();
        let stored_position = self.ctx.docking.screen_to_viewport(current.position());
        self.ctx.layouts.set(
            self.id().as_str(),
            StoredLayout::new(Rect::new(stored_position, current.size()), true),
        );
        self.geometry.last_non_maximized = Some(current);
        self.geometry.is_maximized = true;

        let size = sizing::maximized_size(
            self.viewport,
            self.geometry.aspect_ratio,
            self.is_aspect_locked(),
            &self.ctx.config.window,
        );
        if !self.is_aspect_locked() {
            self.session.resize(size.width.round() as u32, size.height.round() as u32);
        }

        self.update_size(size, false);
        self.geometry.position = sizing::maximized_position(self.viewport, size);
        tracing::debug!("Window {} maximized", self.win_number);
        &self.geometry
    }

    /// Return to the geometry saved by [`maximize`](Self::maximize)
    pub fn restore(&mut self) -> &WindowGeometry {
        if !self.geometry.is_maximized || self.closed {
            return &self.geometry;
        }

        self.geometry.is_maximized = false;
        let size = self.last_resize_size;
        self.update_size(size, false);
        if !self.is_aspect_locked() {
            self.session.resize(size.width.round() as u32, size.height.round() as u32);
        }

        let previous = self.geometry.last_non_maximized.take();
        let position = match self.ctx.layouts.get(self.id().as_str()) {
            Some(layout) => self.ctx.docking.viewport_to_screen(layout.position()),
            None => previous.map_or(self.geometry.position, |r| r.position()),
        };
        self.geometry.position = position;
        tracing::debug!("Window {} restored", self.win_number);
        &self.geometry
    }

    /// The host viewport changed size.
    ///
    /// A maximized window is re-fitted immediately; once resizing has
    /// settled, a free window also asks the remote display to match.
    pub fn viewport_resized(&mut self, viewport: Size) -> &WindowGeometry {
        self.viewport = viewport;
        if self.closed {
            return &self.geometry;
        }

        if self.geometry.is_maximized {
            let size = sizing::maximized_size(
                viewport,
                self.geometry.aspect_ratio,
                self.is_aspect_locked(),
                &self.ctx.config.window,
            );
            self.geometry.size = size;
            if let Some(display) = self.display.filter(DisplayMetrics::is_known) {
                self.scale = Some(size.width / display.width as f64).filter(|s| *s > 0.0);
            }
            self.geometry.position = sizing::maximized_position(viewport, size);
        }

        if let Some(timer) = self.debounce.take() {
            timer.abort();
        }
        let tx = self.commands.clone();
        let delay = self.ctx.config.resize.debounce;
        self.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::ResizeSettled);
        }));

        &self.geometry
    }

    /// Center in the viewport, keeping the size
    pub fn center(&mut self) -> &WindowGeometry {
        let position = sizing::centered(self.viewport, self.geometry.size);
        self.ctx.docking.set_position(self.id().as_str(), position);
        self.geometry.position = position;
        &self.geometry
    }

    /// A canvas pan or zoom gesture is starting
    pub fn canvas_move_start(&mut self) {
        self.ctx.docking.begin_move(self.id().as_str());
    }

    /// The canvas moved; follow it if docked
    pub fn canvas_moved(&mut self) -> &WindowGeometry {
        if let Some(placement) = self.ctx.docking.canvas_moved(self.id().as_str()) {
            if let Some(size) = placement.size {
                self.update_size(size, true);
            }
            self.geometry.position = placement.position;
        }
        &self.geometry
    }

    /// Paste local clipboard text into the remote clipboard
    pub async fn paste(&mut self, text: &str) -> Notification {
        if text.is_empty() {
            return Notification::new(Severity::Warning, "Local clipboard is empty.");
        }

        if let Err(e) = self.ctx.telemetry.send(&TelemetryEvent::CopyPasteChange).await {
            tracing::warn!("Failed to report clipboard paste: {}", e);
        }

        match self.session.send_clipboard_text(text) {
            Ok(()) => Notification::new(Severity::Success, "Local clipboard copied to remote clipboard"),
            Err(e) => {
                tracing::warn!("Clipboard paste into {} failed: {}", self.spec.connection_id, e);
                Notification::new(
                    Severity::Error,
                    "Local clipboard could NOT be copied to remote clipboard",
                )
            }
        }
    }

    /// Skip the countdown and reconnect now
    pub fn retry_now(&mut self) {
        if !self.closed {
            self.retry.retry_now();
        }
    }

    /// Close the window.
    ///
    /// Runs once: later calls return `false` and do nothing. The layout is
    /// written unless the window is maximized.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;

        self.retry.cancel();
        for timer in [self.debounce.take(), self.assertion.take()].into_iter().flatten() {
            timer.abort();
        }
        self.drag_start = None;
        self.active.store(false, Ordering::SeqCst);

        self.session.disconnect();
        self.session_live = false;

        if !self.geometry.is_maximized && !self.layout_stored {
            self.layout_stored = true;
            let position = self.ctx.docking.screen_to_viewport(self.geometry.position);
            self.ctx.layouts.set(
                self.id().as_str(),
                StoredLayout::new(Rect::new(position, self.geometry.size), false),
            );
        }

        let id = self.id().to_string();
        self.ctx.registry.close(&id);
        self.ctx.docking.unbind(&id);
        tracing::info!("Closed console window {} for {}", self.win_number, id);
        true
    }

    /// Wait for the next thing the renderer should react to.
    ///
    /// Drives the session and the window's timers; must be polled for
    /// reconnects and debounced resizes to happen. Returns `None` after
    /// [`WindowEvent::Closed`] has been reported.
    pub async fn next_event(&mut self) -> Option<WindowEvent> {
        loop {
            if self.closed {
                if self.close_reported {
                    return None;
                }
                self.close_reported = true;
                return Some(WindowEvent::Closed);
            }

            tokio::select! {
                event = self.session.next_event(), if self.session_live => match event {
                    Some(event) => {
                        if let Some(out) = self.on_session_event(event) {
                            return Some(out);
                        }
                    }
                    None => self.session_live = false,
                },
                Some(command) = self.command_rx.recv() => {
                    if let Some(out) = self.on_command(command) {
                        return Some(out);
                    }
                }
            }
        }
    }

    fn on_session_event(&mut self, event: SessionEvent) -> Option<WindowEvent> {
        if let Some(token) = self.session.auth_token() {
            self.auth_token = Some(token.to_string());
        }

        match event {
            SessionEvent::StateChanged(SessionState::Connected) => {
                Some(WindowEvent::Connection(self.retry.update(true, "", self.attempts)))
            }
            SessionEvent::StateChanged(SessionState::Disconnected) => {
                // Failures were already reported through `Error`
                if self.session.last_error().is_some() {
                    return None;
                }
                tracing::info!("Gateway closed console {}", self.spec.connection_id);
                Some(WindowEvent::Connection(self.retry.update(
                    false,
                    "Connection closed by server",
                    self.attempts,
                )))
            }
            SessionEvent::StateChanged(state) => {
                tracing::debug!("Console {} session {}", self.spec.connection_id, state);
                None
            }
            SessionEvent::DisplaySize(metrics) => {
                self.on_display_size(metrics);
                Some(WindowEvent::Display(metrics))
            }
            SessionEvent::Clipboard(text) => Some(WindowEvent::RemoteClipboard(text)),
            SessionEvent::Error(message) => {
                Some(WindowEvent::Connection(self.retry.update(false, &message, self.attempts)))
            }
        }
    }

    fn on_command(&mut self, command: Command) -> Option<WindowEvent> {
        match command {
            Command::Reconnect => {
                self.reconnect();
                Some(WindowEvent::Connection(self.retry.state()))
            }
            Command::Center => Some(WindowEvent::Geometry(self.center().clone())),
            Command::ResizeSettled => {
                self.debounce = None;
                if self.geometry.is_maximized && !self.is_aspect_locked() {
                    let width = self.viewport.width;
                    let height = self.viewport.height - self.ctx.config.window.app_bar_height;
                    self.session.resize(width.round() as u32, height.round() as u32);
                    self.scale = Some(1.0);
                    return Some(WindowEvent::Geometry(self.geometry.clone()));
                }
                None
            }
            Command::AssertSize => {
                if self.remote_size_matches() {
                    tracing::debug!("Remote display of window {} has the requested size", self.win_number);
                    if let Some(timer) = self.assertion.take() {
                        timer.abort();
                    }
                    return None;
                }
                let viewport = self.viewport;
                Some(WindowEvent::Geometry(self.viewport_resized(viewport).clone()))
            }
        }
    }

    /// Tear down the session and open a fresh one with the cached token
    fn reconnect(&mut self) {
        if self.closed {
            return;
        }

        self.attempts += 1;
        tracing::info!(
            "Reconnecting console {} (attempt {})",
            self.spec.connection_id,
            self.attempts
        );

        self.session.disconnect();
        self.session = ConsoleSession::new(
            &self.spec,
            self.ctx.config.tunnel.clone(),
            Arc::clone(&self.ctx.connector),
        );
        self.display_ready = false;
        self.session_live = false;

        let auth = self.auth_source();
        match self.session.connect_with(auth) {
            Ok(()) => self.session_live = true,
            Err(e) => tracing::warn!("Reconnect of {} failed: {}", self.spec.connection_id, e),
        }
        self.retry.update(false, "", self.attempts);
    }

    /// First display size after connecting sizes the window to match; later
    /// ones only rescale it against the new framebuffer
    fn on_display_size(&mut self, metrics: DisplayMetrics) {
        if !metrics.is_known() {
            return;
        }
        self.display = Some(metrics);
        if self.display_ready {
            let locked = self.is_aspect_locked();
            if !locked {
                if let Some(ratio) = metrics.as_size().aspect_ratio() {
                    self.geometry.aspect_ratio = ratio;
                }
            }
            if let Some(scale) = compute_scale(self.geometry.size, metrics, locked) {
                self.scale = Some(scale);
            }
            return;
        }
        self.display_ready = true;

        let remote = metrics.as_size();
        if let Some(ratio) = remote.aspect_ratio() {
            self.geometry.aspect_ratio = ratio;
        }

        let stored = self.ctx.layouts.get(self.id().as_str());
        let size = match stored {
            Some(layout) => layout.size(),
            None => {
                let width = sizing::initial_size(self.viewport, &self.ctx.config.window).width;
                Size::new(width, width / self.geometry.aspect_ratio)
            }
        };

        if self.geometry.is_maximized {
            // Tab windows fill the viewport; keep the size for restore only
            self.last_resize_size = size;
        } else {
            self.geometry.size = size;
            self.last_resize_size = size;
        }
        self.ctx.docking.reset_zoom_base(self.id().as_str(), size);
        self.scale = Some(self.geometry.size.width / remote.width).filter(|s| *s > 0.0);

        if self.geometry.is_maximized {
            let viewport = self.viewport;
            self.viewport_resized(viewport);
        }
        if self.spec.is_tab {
            self.start_size_assertion();
        }

        if stored.is_some_and(|l| l.is_maximized) && !self.geometry.is_maximized {
            self.maximize();
        }
    }

    /// Re-send the tab size until the remote display reports it
    fn start_size_assertion(&mut self) {
        if let Some(timer) = self.assertion.take() {
            timer.abort();
        }
        let tx = self.commands.clone();
        let attempts = self.ctx.config.resize.assert_attempts;
        let interval = self.ctx.config.resize.assert_interval;
        self.assertion = Some(tokio::spawn(async move {
            for _ in 0..attempts {
                tokio::time::sleep(interval).await;
                if tx.send(Command::AssertSize).is_err() {
                    break;
                }
            }
        }));
    }

    /// Gateways sometimes report a width one pixel short of the request
    fn remote_size_matches(&self) -> bool {
        let Some(display) = self.display else {
            return false;
        };
        let width = self.viewport.width.round() as i64;
        let height = (self.viewport.height - self.ctx.config.window.app_bar_height).round() as i64;
        let actual = display.width as i64;
        (actual == width || actual == width - 1) && display.height as i64 == height
    }

    fn update_size(&mut self, size: Size, remember: bool) {
        if let Some(display) = self.display {
            if let Some(scale) = compute_scale(size, display, self.is_aspect_locked()) {
                self.scale = Some(scale);
            }
        }
        self.geometry.size = size;
        if remember {
            self.last_resize_size = size;
        }
    }
}

impl Drop for WindowController {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for WindowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowController")
            .field("win_number", &self.win_number)
            .field("connection_id", &self.spec.connection_id)
            .field("geometry", &self.geometry)
            .field("scale", &self.scale)
            .field("attempts", &self.attempts)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
