//! Floating console windows

mod controller;
pub mod sizing;

pub use controller::{WindowContext, WindowController, WindowEvent};

use std::sync::atomic::{AtomicU32, Ordering};

use crate::retry::Severity;

/// Stacking order shared by all windows.
///
/// Each call to [`next`](ZOrder::next) hands out an index above every one
/// handed out before, putting that window on top.
#[derive(Debug)]
pub struct ZOrder {
    current: AtomicU32,
}

impl ZOrder {
    /// Starting point, above the host application's own layers
    pub const BASE: u32 = 9999;

    pub fn new() -> Self {
        Self {
            current: AtomicU32::new(Self::BASE),
        }
    }

    pub fn next(&self) -> u32 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }
}

impl Default for ZOrder {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient message for the user, shown as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_order_increases() {
        let z = ZOrder::new();
        assert_eq!(z.next(), 10000);
        assert_eq!(z.next(), 10001);
        assert_eq!(z.current(), 10001);
    }
}
