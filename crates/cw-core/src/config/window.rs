//! Window chrome and resize configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_millis;

/// Window sizing limits, in screen pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Largest initial width; also the width of the default 4:3 shape
    pub default_width: f64,
    /// Height of the default 4:3 shape
    pub default_height: f64,
    /// Smallest width an aspect-locked window may be resized to
    pub min_width: f64,
    /// Smallest height an aspect-locked window may be resized to
    pub min_height: f64,
    /// Title bar height, subtracted from the viewport when maximizing
    pub app_bar_height: f64,
    /// Pixels of a window that must stay reachable after a drag
    pub drag_buffer: f64,
    /// Below this width the title bar is hidden
    pub min_width_app_bar_visible: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_width: 800.0,
            default_height: 600.0,
            min_width: 300.0,
            min_height: 200.0,
            app_bar_height: 28.0,
            drag_buffer: 30.0,
            min_width_app_bar_visible: 200.0,
        }
    }
}

impl WindowConfig {
    /// Width / height of the default window shape
    pub fn default_aspect_ratio(&self) -> f64 {
        self.default_width / self.default_height
    }
}

/// Timers around remote display resizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Quiet period after the last viewport resize before re-asserting size
    #[serde(with = "duration_millis")]
    pub debounce: Duration,

    /// How many times a size request is re-sent after connect
    pub assert_attempts: u32,

    /// Delay between size re-assertions
    #[serde(with = "duration_millis")]
    pub assert_interval: Duration,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            assert_attempts: 5,
            assert_interval: Duration::from_secs(1),
        }
    }
}
