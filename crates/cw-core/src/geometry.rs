//! Screen-space geometry

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point, in whichever space the caller is working in
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width / height; `None` for a degenerate size
    pub fn aspect_ratio(&self) -> Option<f64> {
        let ratio = self.width / self.height;
        (ratio.is_finite() && ratio > 0.0).then_some(ratio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Geometry of one console window in screen space.
///
/// Only the window controller mutates this; everything else reads copies.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowGeometry {
    /// Top-left corner of the window
    pub position: Point,
    /// Size of the display area
    pub size: Size,
    /// Width / height used by aspect-locked resizing and maximize
    pub aspect_ratio: f64,
    pub is_maximized: bool,
    /// Geometry saved when the window was last maximized
    pub last_non_maximized: Option<Rect>,
}

impl WindowGeometry {
    pub fn new(position: Point, size: Size, aspect_ratio: f64) -> Self {
        Self {
            position,
            size,
            aspect_ratio,
            is_maximized: false,
            last_non_maximized: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }
}

/// Size of the remote framebuffer in remote pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
}

impl DisplayMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized display carries no usable metrics
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn as_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}
