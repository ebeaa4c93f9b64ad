//! Coordinate transforms between screen, window and remote framebuffer space
//!
//! Everything here is pure. The window controller rebuilds a
//! [`PointerTransform`] whenever the origin, drag offset or scale changes
//! and runs pointer events through it.

use crate::geometry::{DisplayMetrics, Point, Size};

/// Scale from remote framebuffer pixels to local window pixels.
///
/// Aspect-locked windows scale by width only; free windows fit the whole
/// display inside the window. Returns `None` until the display metrics are
/// known or when the result would not be a positive, finite number.
pub fn compute_scale(local: Size, remote: DisplayMetrics, aspect_locked: bool) -> Option<f64> {
    if !remote.is_known() {
        return None;
    }

    let remote = remote.as_size();
    let scale = if aspect_locked {
        local.width / remote.width
    } else {
        (local.width / remote.width).min(local.height / remote.height)
    };

    (scale.is_finite() && scale > 0.0).then_some(scale)
}

/// Displacement of a window from where it was first placed on screen.
///
/// Docked windows move when the canvas pans; pointer corrections use this
/// offset so they stay valid without re-capturing the origin.
pub fn drag_offset(initial: Point, current: Point) -> Point {
    current - initial
}

/// Maps pointer events from screen space into remote framebuffer space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTransform {
    origin: Point,
    offset: Point,
    scale: f64,
}

impl PointerTransform {
    /// `origin` is the window's initial screen position and `offset` the
    /// accumulated displacement since then. `None` for a non-positive scale.
    pub fn new(origin: Point, offset: Point, scale: f64) -> Option<Self> {
        (scale.is_finite() && scale > 0.0).then_some(Self {
            origin,
            offset,
            scale,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Screen point to remote framebuffer point.
    ///
    /// The offset is in local pixels, so it is removed before dividing.
    pub fn to_remote(&self, screen: Point) -> Point {
        let local = screen - self.origin - self.offset;
        Point::new(local.x / self.scale, local.y / self.scale)
    }

    /// Remote framebuffer point back to screen space
    pub fn to_screen(&self, remote: Point) -> Point {
        Point::new(remote.x * self.scale, remote.y * self.scale) + self.origin + self.offset
    }

    /// Remote point rounded to whole pixels for the wire
    pub fn to_remote_pixels(&self, screen: Point) -> (i32, i32) {
        let remote = self.to_remote(screen);
        (remote.x.round() as i32, remote.y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_locked_scale_uses_width() {
        let scale = compute_scale(Size::new(400.0, 300.0), DisplayMetrics::new(800, 600), true);
        assert_eq!(scale, Some(0.5));
    }

    #[test]
    fn test_unlocked_scale_fits_display() {
        let scale =
            compute_scale(Size::new(500.0, 200.0), DisplayMetrics::new(800, 600), false).unwrap();
        assert!(approx(scale, 200.0 / 600.0));
    }

    #[test]
    fn test_scale_needs_known_metrics() {
        assert_eq!(compute_scale(Size::new(400.0, 300.0), DisplayMetrics::new(0, 0), true), None);
        assert_eq!(compute_scale(Size::new(0.0, 300.0), DisplayMetrics::new(800, 600), true), None);
    }

    #[test]
    fn test_pointer_to_remote() {
        let transform = PointerTransform::new(Point::new(50.0, 50.0), Point::ORIGIN, 0.5).unwrap();
        assert_eq!(transform.to_remote(Point::new(150.0, 150.0)), Point::new(200.0, 200.0));
        assert_eq!(transform.to_remote_pixels(Point::new(150.0, 150.0)), (200, 200));
    }

    #[test]
    fn test_offset_applied_before_scale() {
        // Window dragged 20px right and 10px down since it was placed
        let offset = drag_offset(Point::new(50.0, 50.0), Point::new(70.0, 60.0));
        assert_eq!(offset, Point::new(20.0, 10.0));

        let transform = PointerTransform::new(Point::new(50.0, 50.0), offset, 0.5).unwrap();
        assert_eq!(transform.to_remote(Point::new(170.0, 160.0)), Point::new(200.0, 200.0));
    }

    #[test]
    fn test_round_trip_to_screen() {
        let transform =
            PointerTransform::new(Point::new(12.0, 34.0), Point::new(-5.0, 8.0), 0.75).unwrap();
        let screen = Point::new(300.0, 220.0);
        let back = transform.to_screen(transform.to_remote(screen));
        assert!(approx(back.x, screen.x) && approx(back.y, screen.y));
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(PointerTransform::new(Point::ORIGIN, Point::ORIGIN, 0.0).is_none());
        assert!(PointerTransform::new(Point::ORIGIN, Point::ORIGIN, -1.0).is_none());
        assert!(PointerTransform::new(Point::ORIGIN, Point::ORIGIN, f64::NAN).is_none());
    }
}
