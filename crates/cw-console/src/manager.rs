//! Console manager
//!
//! Entry point for a host application: opens console windows on request,
//! de-duplicating by connection id, and owns everything the windows
//! share (registry, docking, layout store, telemetry, stacking order).

use std::collections::BTreeMap;
use std::sync::Arc;

use cw_core::config::ConsoleConfig;
use cw_core::traits::{CanvasProjection, NoopTelemetry, TelemetryEvent, TelemetrySink};
use cw_core::{
    ConsoleSpec, ConsoleStatus, Credentials, LayoutStore, MemoryLayoutStore, Point, SessionError,
    Size, StoredLayout,
};

use crate::docking::DockingCoordinator;
use crate::registry::WindowRegistry;
use crate::session::TunnelConnector;
use crate::window::{WindowContext, WindowController, WindowEvent, ZOrder};

/// Owns every console window of one host application
pub struct ConsoleManager {
    ctx: WindowContext,
    credentials: Option<Credentials>,
    sso_token: Option<String>,
    viewport: Size,
    windows: BTreeMap<u32, WindowController>,
    next_win_number: u32,
}

impl ConsoleManager {
    /// Manager with an in-memory layout store, no telemetry and no canvas
    pub fn new(config: ConsoleConfig, connector: Arc<dyn TunnelConnector>, viewport: Size) -> Self {
        Self {
            ctx: WindowContext {
                config,
                registry: Arc::new(WindowRegistry::new()),
                docking: Arc::new(DockingCoordinator::new()),
                layouts: Arc::new(MemoryLayoutStore::new()),
                telemetry: Arc::new(NoopTelemetry),
                connector,
                z_order: Arc::new(ZOrder::new()),
            },
            credentials: None,
            sso_token: None,
            viewport,
            windows: BTreeMap::new(),
            next_win_number: 0,
        }
    }

    pub fn with_layouts(mut self, layouts: Arc<dyn LayoutStore>) -> Self {
        self.ctx.layouts = layouts;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.ctx.telemetry = telemetry;
        self
    }

    /// Gateway credentials used by windows opened without their own auth
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// SSO token used when neither the window nor the manager has credentials
    pub fn with_sso_token(mut self, token: impl Into<String>) -> Self {
        self.sso_token = Some(token.into());
        self
    }

    pub fn registry(&self) -> &Arc<WindowRegistry> {
        &self.ctx.registry
    }

    pub fn docking(&self) -> &Arc<DockingCoordinator> {
        &self.ctx.docking
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.ctx.config
    }

    /// Open a console window.
    ///
    /// If a window for the same connection is already open it is centered
    /// instead and `None` is returned. Otherwise the new window's number.
    pub async fn add_console_window(&mut self, mut spec: ConsoleSpec) -> Result<Option<u32>, SessionError> {
        let id = spec.connection_id.to_string();
        if self.ctx.registry.is_open(&id) {
            tracing::debug!("Console {} already open, centering it", id);
            self.ctx.registry.center(&id);
            return Ok(None);
        }

        let event = TelemetryEvent::ConsoleOpen {
            connection_id: spec.connection_id.clone(),
            connection_type: spec.connection_type.clone(),
            title: spec.title.clone(),
        };
        if let Err(e) = self.ctx.telemetry.send(&event).await {
            tracing::warn!("Failed to report console open: {}", e);
        }

        if spec.token.is_none() && spec.credentials.is_none() {
            spec.credentials = self.credentials.clone();
            if spec.sso_token.is_none() {
                spec.sso_token = self.sso_token.clone();
            }
        }

        let win_number = self.next_win_number;
        let mut window = WindowController::new(spec, win_number, self.viewport, self.ctx.clone());
        window.connect()?;

        self.windows.insert(win_number, window);
        self.next_win_number += 1;
        Ok(Some(win_number))
    }

    /// Close and forget window `win_number`
    pub fn remove_console_window(&mut self, win_number: u32) -> bool {
        match self.windows.remove(&win_number) {
            Some(mut window) => {
                window.close();
                true
            }
            None => false,
        }
    }

    /// Whether a console with this status can be opened
    pub fn is_console_ready(status: Option<ConsoleStatus>) -> bool {
        ConsoleStatus::is_ready(status)
    }

    pub fn window(&self, win_number: u32) -> Option<&WindowController> {
        self.windows.get(&win_number)
    }

    pub fn window_mut(&mut self, win_number: u32) -> Option<&mut WindowController> {
        self.windows.get_mut(&win_number)
    }

    /// Window showing connection `id`
    pub fn find_window(&self, id: &str) -> Option<&WindowController> {
        self.windows.values().find(|w| w.id().as_str() == id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &WindowController> {
        self.windows.values()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Highest stacking index handed out so far
    pub fn current_z_index(&self) -> u32 {
        self.ctx.z_order.current()
    }

    /// Attach the canvas windows dock to (or detach it with `None`)
    pub fn set_canvas(&self, projection: Option<Arc<dyn CanvasProjection>>) {
        self.ctx.docking.set_projection(projection);
    }

    pub fn set_docking_enabled(&self, enabled: bool) {
        self.ctx.docking.set_enabled(enabled);
    }

    pub fn is_docking_enabled(&self) -> bool {
        self.ctx.docking.is_enabled()
    }

    pub fn screen_to_viewport(&self, point: Point) -> Point {
        self.ctx.docking.screen_to_viewport(point)
    }

    pub fn viewport_to_screen(&self, point: Point) -> Point {
        self.ctx.docking.viewport_to_screen(point)
    }

    pub fn stored_window_settings(&self, id: &str) -> Option<StoredLayout> {
        self.ctx.layouts.get(id)
    }

    pub fn set_stored_window_settings(&self, id: &str, layout: StoredLayout) {
        self.ctx.layouts.set(id, layout);
    }

    /// The host viewport changed size
    pub fn viewport_resized(&mut self, viewport: Size) {
        self.viewport = viewport;
        for window in self.windows.values_mut() {
            window.viewport_resized(viewport);
        }
    }

    /// A canvas gesture is starting
    pub fn canvas_move_start(&mut self) {
        for window in self.windows.values_mut() {
            window.canvas_move_start();
        }
    }

    /// The canvas panned or zoomed
    pub fn canvas_moved(&mut self) {
        for window in self.windows.values_mut() {
            window.canvas_moved();
        }
    }

    /// Next event from any window, tagged with its window number.
    ///
    /// Closed windows are dropped after their `Closed` event. Returns
    /// `None` once no windows are left.
    pub async fn next_event(&mut self) -> Option<(u32, WindowEvent)> {
        loop {
            if self.windows.is_empty() {
                return None;
            }

            let (win_number, event) = {
                let pending = self.windows.iter_mut().map(|(n, window)| {
                    let n = *n;
                    Box::pin(async move { (n, window.next_event().await) })
                });
                let (ready, _, _) = futures::future::select_all(pending).await;
                ready
            };

            match event {
                Some(WindowEvent::Closed) => {
                    self.windows.remove(&win_number);
                    return Some((win_number, WindowEvent::Closed));
                }
                Some(event) => return Some((win_number, event)),
                None => {
                    self.windows.remove(&win_number);
                }
            }
        }
    }

    /// Close every window
    pub fn close_all(&mut self) {
        for (_, mut window) in std::mem::take(&mut self.windows) {
            window.close();
        }
    }
}

impl Drop for ConsoleManager {
    fn drop(&mut self) {
        self.close_all();
    }
}

impl std::fmt::Debug for ConsoleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleManager")
            .field("windows", &self.windows.keys().collect::<Vec<_>>())
            .field("next_win_number", &self.next_win_number)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ChannelConnector;
    use cw_core::ConnectionUrl;

    fn spec(id: &str) -> ConsoleSpec {
        ConsoleSpec::new(
            id,
            "c",
            ConnectionUrl::parse("https://gw.example.com:8443/console").unwrap(),
            format!("Console {}", id),
        )
    }

    #[tokio::test]
    async fn test_window_numbers_increase() {
        let (connector, _incoming) = ChannelConnector::new();
        let mut manager = ConsoleManager::new(
            ConsoleConfig::default(),
            Arc::new(connector),
            Size::new(1200.0, 800.0),
        );

        assert_eq!(manager.add_console_window(spec("a")).await.unwrap(), Some(0));
        assert_eq!(manager.add_console_window(spec("b")).await.unwrap(), Some(1));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.find_window("b").unwrap().win_number(), 1);
    }

    #[tokio::test]
    async fn test_remove_window() {
        let (connector, _incoming) = ChannelConnector::new();
        let mut manager = ConsoleManager::new(
            ConsoleConfig::default(),
            Arc::new(connector),
            Size::new(1200.0, 800.0),
        );
        manager.add_console_window(spec("a")).await.unwrap();

        assert!(manager.remove_console_window(0));
        assert!(!manager.remove_console_window(0));
        assert!(!manager.registry().is_open("a"));
        assert!(manager.stored_window_settings("a").is_some());
    }

    #[test]
    fn test_console_ready() {
        assert!(ConsoleManager::is_console_ready(Some(ConsoleStatus::Ready)));
        assert!(!ConsoleManager::is_console_ready(Some(ConsoleStatus::Creating)));
        assert!(!ConsoleManager::is_console_ready(None));
    }
}
