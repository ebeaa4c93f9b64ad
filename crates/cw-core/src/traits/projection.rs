//! Canvas projection traits

use parking_lot::RwLock;

use crate::geometry::Point;

/// A pannable, zoomable canvas that windows can be docked to.
///
/// Both conversions are pure: they depend only on the canvas's current pan
/// and zoom and never move anything.
pub trait CanvasProjection: Send + Sync {
    /// Screen point to canvas viewport point
    fn screen_to_viewport(&self, point: Point) -> Point;

    /// Canvas viewport point to screen point
    fn viewport_to_screen(&self, point: Point) -> Point;

    /// Current zoom factor (1.0 = unzoomed)
    fn zoom(&self) -> f64;
}

/// Affine pan/zoom canvas: `screen = viewport * zoom + pan`
#[derive(Debug)]
pub struct PanZoom {
    state: RwLock<(Point, f64)>,
}

impl PanZoom {
    pub fn new(pan: Point, zoom: f64) -> Self {
        Self {
            state: RwLock::new((pan, zoom)),
        }
    }

    /// Move the canvas
    pub fn set_transform(&self, pan: Point, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            *self.state.write() = (pan, zoom);
        } else {
            tracing::warn!("Ignoring canvas zoom {}", zoom);
        }
    }

    pub fn pan(&self) -> Point {
        self.state.read().0
    }
}

impl Default for PanZoom {
    fn default() -> Self {
        Self::new(Point::ORIGIN, 1.0)
    }
}

impl CanvasProjection for PanZoom {
    fn screen_to_viewport(&self, point: Point) -> Point {
        let (pan, zoom) = *self.state.read();
        let shifted = point - pan;
        Point::new(shifted.x / zoom, shifted.y / zoom)
    }

    fn viewport_to_screen(&self, point: Point) -> Point {
        let (pan, zoom) = *self.state.read();
        Point::new(point.x * zoom, point.y * zoom) + pan
    }

    fn zoom(&self) -> f64 {
        self.state.read().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_canvas() {
        let canvas = PanZoom::default();
        let p = Point::new(42.0, 17.0);
        assert_eq!(canvas.screen_to_viewport(p), p);
        assert_eq!(canvas.viewport_to_screen(p), p);
    }

    #[test]
    fn test_pan_and_zoom() {
        let canvas = PanZoom::new(Point::new(100.0, 50.0), 2.0);
        assert_eq!(
            canvas.viewport_to_screen(Point::new(10.0, 10.0)),
            Point::new(120.0, 70.0)
        );
        assert_eq!(
            canvas.screen_to_viewport(Point::new(120.0, 70.0)),
            Point::new(10.0, 10.0)
        );
    }

    #[test]
    fn test_rejects_non_positive_zoom() {
        let canvas = PanZoom::default();
        canvas.set_transform(Point::new(5.0, 5.0), 0.0);
        assert_eq!(canvas.zoom(), 1.0);
        assert_eq!(canvas.pan(), Point::ORIGIN);
    }
}
