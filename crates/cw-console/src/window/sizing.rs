//! Window sizing rules
//!
//! Pure functions over screen-space geometry; the controller decides when
//! to apply them.

use cw_core::config::WindowConfig;
use cw_core::{Point, Size};

/// Width of a freshly opened window: half the viewport, kept within
/// `[min_width, default_width]`. Height follows the default 4:3 shape.
pub fn initial_size(viewport: Size, config: &WindowConfig) -> Size {
    let width = (viewport.width / 2.0)
        .min(config.default_width)
        .max(config.min_width);
    Size::new(width, width / config.default_aspect_ratio())
}

/// Top-left corner that centers `size` in `viewport`
pub fn centered(viewport: Size, size: Size) -> Point {
    Point::new(
        viewport.width / 2.0 - size.width / 2.0,
        viewport.height / 2.0 - size.height / 2.0,
    )
}

/// Keep enough of an undocked window on screen to grab it again
pub fn clamp_drag(position: Point, size: Size, viewport: Size, config: &WindowConfig) -> Point {
    let buffer = config.drag_buffer;
    let mut clamped = position;

    if clamped.x < -size.width + buffer {
        clamped.x = -size.width + buffer;
    } else if clamped.x > viewport.width {
        clamped.x = viewport.width - buffer;
    }

    if clamped.y < 0.0 {
        clamped.y = 0.0;
    } else if clamped.y > viewport.height {
        clamped.y = viewport.height - buffer;
    }

    clamped
}

/// Enforce the minimum size of an aspect-locked window.
///
/// Crossing a floor recomputes the other side from `ratio`, so the
/// result may end up larger than the floor in the other dimension.
pub fn locked_resize(size: Size, ratio: f64, config: &WindowConfig) -> Size {
    let mut size = size;
    if size.width <= config.min_width {
        size.width = config.min_width;
        size.height = size.width / ratio;
    }
    if size.height <= config.min_height {
        size.height = config.min_height;
        size.width = size.height * ratio;
    }
    size
}

/// Size of a maximized window.
///
/// Free windows take the whole viewport below the title bar; locked ones
/// take the full width unless that makes them taller than the viewport.
pub fn maximized_size(viewport: Size, ratio: f64, aspect_locked: bool, config: &WindowConfig) -> Size {
    let available_height = viewport.height - config.app_bar_height;

    if !aspect_locked {
        return Size::new(viewport.width, available_height);
    }

    let width = viewport.width;
    let height = width / ratio;
    if height > viewport.height {
        Size::new(available_height * ratio, available_height)
    } else {
        Size::new(width, height)
    }
}

/// Maximized windows sit centered at the top of the viewport
pub fn maximized_position(viewport: Size, size: Size) -> Point {
    Point::new(viewport.width / 2.0 - size.width / 2.0, 0.0)
}
