//! Docking windows to a pannable, zoomable canvas
//!
//! A docked window remembers where it sits in canvas viewport space. When
//! the canvas pans or zooms, its screen position (and size, for zoom) is
//! derived again from that viewport position.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cw_core::traits::CanvasProjection;
use cw_core::{Point, Size};

/// Where one docked window lives on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockBinding {
    /// Top-left corner in canvas viewport space
    pub viewport_position: Point,
    /// Zoom when the current canvas move began; `None` until one begins
    base_zoom: Option<f64>,
    last_zoom: Option<f64>,
    /// Window size at `base_zoom`
    size_at_base_zoom: Size,
}

impl DockBinding {
    fn new(viewport_position: Point) -> Self {
        Self {
            viewport_position,
            base_zoom: None,
            last_zoom: None,
            size_at_base_zoom: Size::default(),
        }
    }

    /// Size the window should have at `zoom`, if zoom scaling is set up
    pub fn size_at(&self, zoom: f64) -> Option<Size> {
        let base = self.base_zoom?;
        if self.size_at_base_zoom.width <= 0.0 || self.size_at_base_zoom.height <= 0.0 {
            return None;
        }
        let factor = zoom / base;
        (factor.is_finite() && factor > 0.0).then(|| {
            Size::new(
                self.size_at_base_zoom.width * factor,
                self.size_at_base_zoom.height * factor,
            )
        })
    }
}

/// New placement of a docked window after a canvas move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockedPlacement {
    /// Screen position
    pub position: Point,
    /// New size when the zoom changed
    pub size: Option<Size>,
}

/// Converts between screen and canvas space and tracks docked windows.
///
/// Without a canvas, or while disabled, both conversions are the identity
/// and no bindings are kept.
#[derive(Default)]
pub struct DockingCoordinator {
    projection: RwLock<Option<Arc<dyn CanvasProjection>>>,
    enabled: AtomicBool,
    bindings: Mutex<HashMap<String, DockBinding>>,
}

impl DockingCoordinator {
    /// Coordinator with no canvas
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator docking to `projection`, enabled
    pub fn with_projection(projection: Arc<dyn CanvasProjection>) -> Self {
        let docking = Self::new();
        docking.set_projection(Some(projection));
        docking.set_enabled(true);
        docking
    }

    /// Attach or detach the canvas
    pub fn set_projection(&self, projection: Option<Arc<dyn CanvasProjection>>) {
        *self.projection.write() = projection;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.bindings.lock().clear();
        }
        tracing::debug!("Docking {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Whether windows are currently docked to a canvas
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst) && self.projection.read().is_some()
    }

    fn active_projection(&self) -> Option<Arc<dyn CanvasProjection>> {
        if !self.enabled.load(Ordering::SeqCst) {
            return None;
        }
        self.projection.read().clone()
    }

    pub fn screen_to_viewport(&self, point: Point) -> Point {
        match self.active_projection() {
            Some(projection) => projection.screen_to_viewport(point),
            None => point,
        }
    }

    pub fn viewport_to_screen(&self, point: Point) -> Point {
        match self.active_projection() {
            Some(projection) => projection.viewport_to_screen(point),
            None => point,
        }
    }

    /// Current canvas zoom (1.0 without a canvas)
    pub fn zoom(&self) -> f64 {
        self.active_projection().map_or(1.0, |p| p.zoom())
    }

    /// Record the screen position of window `id` in viewport space
    pub fn set_position(&self, id: &str, screen: Point) {
        if !self.is_enabled() {
            return;
        }
        let viewport = self.screen_to_viewport(screen);
        self.bindings
            .lock()
            .entry(id.to_string())
            .and_modify(|b| b.viewport_position = viewport)
            .or_insert_with(|| DockBinding::new(viewport));
    }

    /// Binding of window `id`, if docked
    pub fn binding(&self, id: &str) -> Option<DockBinding> {
        self.bindings.lock().get(id).copied()
    }

    /// The window was resized by other means than zooming; future zooms
    /// scale from `size`.
    pub fn reset_zoom_base(&self, id: &str, size: Size) {
        if let Some(binding) = self.bindings.lock().get_mut(id) {
            binding.size_at_base_zoom = size;
            binding.base_zoom = None;
        }
    }

    /// A canvas pan or zoom gesture is starting
    pub fn begin_move(&self, id: &str) {
        let zoom = self.zoom();
        if let Some(binding) = self.bindings.lock().get_mut(id) {
            if binding.base_zoom.is_none() {
                binding.base_zoom = Some(zoom);
                binding.last_zoom = Some(zoom);
            }
        }
    }

    /// The canvas moved; where should window `id` be now?
    pub fn canvas_moved(&self, id: &str) -> Option<DockedPlacement> {
        let projection = self.active_projection()?;
        let zoom = projection.zoom();

        let mut bindings = self.bindings.lock();
        let binding = bindings.get_mut(id)?;

        let size = if binding.last_zoom != Some(zoom) {
            binding.last_zoom = Some(zoom);
            binding.size_at(zoom)
        } else {
            None
        };

        Some(DockedPlacement {
            position: projection.viewport_to_screen(binding.viewport_position),
            size,
        })
    }

    /// Forget window `id`
    pub fn unbind(&self, id: &str) {
        self.bindings.lock().remove(id);
    }
}

impl fmt::Debug for DockingCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockingCoordinator")
            .field("enabled", &self.is_enabled())
            .field("bindings", &self.bindings.lock().len())
            .finish()
    }
}
