//! Registry of open console windows
//!
//! Tracks which windows are open and which single window currently
//! receives mouse and keyboard input. Shared between windows as an
//! `Arc<WindowRegistry>`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback registered by a window
pub type WindowCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks through which the registry drives a window
#[derive(Clone)]
pub struct WindowHandle {
    /// Start forwarding mouse and keyboard input
    pub activate: WindowCallback,
    /// Stop forwarding input
    pub deactivate: WindowCallback,
    /// Move the window to the middle of the viewport
    pub center: WindowCallback,
}

impl WindowHandle {
    pub fn new(activate: WindowCallback, deactivate: WindowCallback, center: WindowCallback) -> Self {
        Self {
            activate,
            deactivate,
            center,
        }
    }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowHandle").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct RegistryInner {
    windows: HashMap<String, WindowHandle>,
    active: Option<String>,
}

/// Open windows and the single active one.
///
/// Callbacks never run while the table is locked, so a callback may call
/// back into the registry (for example close its own window while being
/// activated).
#[derive(Default)]
pub struct WindowRegistry {
    inner: Mutex<RegistryInner>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a window.
    ///
    /// A window already registered under `id` is deactivated and replaced.
    pub fn open(&self, id: &str, handle: WindowHandle) {
        let replaced = {
            let mut inner = self.inner.lock();
            let replaced = inner.windows.insert(id.to_string(), handle);
            if replaced.is_some() && inner.active.as_deref() == Some(id) {
                inner.active = None;
            }
            replaced
        };

        if let Some(old) = replaced {
            tracing::debug!("Window {} registered twice, replacing", id);
            (old.deactivate)();
        } else {
            tracing::debug!("Window {} registered", id);
        }
    }

    /// Deactivate and remove a window. Returns whether it was registered.
    pub fn close(&self, id: &str) -> bool {
        let removed = {
            let mut inner = self.inner.lock();
            if inner.active.as_deref() == Some(id) {
                inner.active = None;
            }
            inner.windows.remove(id)
        };

        match removed {
            Some(handle) => {
                (handle.deactivate)();
                tracing::debug!("Window {} removed", id);
                true
            }
            None => false,
        }
    }

    /// Make `id` the only window receiving input.
    ///
    /// Does nothing when `id` is already active unless `force` is set.
    /// Returns `false` if no such window is registered.
    pub fn set_active(&self, id: &str, force: bool) -> bool {
        let (deactivate, activate) = {
            let mut inner = self.inner.lock();
            if inner.active.as_deref() == Some(id) && !force {
                return true;
            }
            let Some(target) = inner.windows.get(id) else {
                tracing::warn!("Cannot activate unknown window {}", id);
                return false;
            };

            let activate = Arc::clone(&target.activate);
            let deactivate: Vec<WindowCallback> = inner
                .windows
                .values()
                .map(|w| Arc::clone(&w.deactivate))
                .collect();
            inner.active = Some(id.to_string());
            (deactivate, activate)
        };

        for callback in deactivate {
            callback();
        }
        activate();
        tracing::debug!("Window {} is active", id);
        true
    }

    /// Invoke the center callback of `id`. Returns whether it was registered.
    pub fn center(&self, id: &str) -> bool {
        let center = self
            .inner
            .lock()
            .windows
            .get(id)
            .map(|w| Arc::clone(&w.center));

        match center {
            Some(center) => {
                center();
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.inner.lock().windows.contains_key(id)
    }

    /// Id of the window receiving input, if any
    pub fn active(&self) -> Option<String> {
        self.inner.lock().active.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().windows.is_empty()
    }
}

impl fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("WindowRegistry")
            .field("windows", &inner.windows.keys().collect::<Vec<_>>())
            .field("active", &inner.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Probe {
        active: AtomicBool,
        activations: AtomicUsize,
        deactivations: AtomicUsize,
        centers: AtomicUsize,
    }

    impl Probe {
        fn handle(self: &Arc<Self>) -> WindowHandle {
            let (a, d, c) = (Arc::clone(self), Arc::clone(self), Arc::clone(self));
            WindowHandle::new(
                Arc::new(move || {
                    a.active.store(true, Ordering::SeqCst);
                    a.activations.fetch_add(1, Ordering::SeqCst);
                }),
                Arc::new(move || {
                    d.active.store(false, Ordering::SeqCst);
                    d.deactivations.fetch_add(1, Ordering::SeqCst);
                }),
                Arc::new(move || {
                    c.centers.fetch_add(1, Ordering::SeqCst);
                }),
            )
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_single_active_window() {
        let registry = WindowRegistry::new();
        let (a, b) = (Arc::new(Probe::default()), Arc::new(Probe::default()));
        registry.open("a", a.handle());
        registry.open("b", b.handle());

        assert!(registry.set_active("a", false));
        assert!(a.is_active() && !b.is_active());

        assert!(registry.set_active("b", false));
        assert!(!a.is_active() && b.is_active());
        assert_eq!(registry.active().as_deref(), Some("b"));
    }

    #[test]
    fn test_set_active_without_force_is_noop() {
        let registry = WindowRegistry::new();
        let a = Arc::new(Probe::default());
        registry.open("a", a.handle());

        registry.set_active("a", false);
        registry.set_active("a", false);
        assert_eq!(a.activations.load(Ordering::SeqCst), 1);

        registry.set_active("a", true);
        assert_eq!(a.activations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_window() {
        let registry = WindowRegistry::new();
        assert!(!registry.set_active("ghost", true));
        assert!(!registry.center("ghost"));
        assert!(!registry.close("ghost"));
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn test_center_leaves_active_window_alone() {
        let registry = WindowRegistry::new();
        let (a, b) = (Arc::new(Probe::default()), Arc::new(Probe::default()));
        registry.open("a", a.handle());
        registry.open("b", b.handle());
        registry.set_active("b", false);

        assert!(registry.center("a"));
        assert_eq!(a.centers.load(Ordering::SeqCst), 1);
        assert_eq!(registry.active().as_deref(), Some("b"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_open_replaces_entry() {
        let registry = WindowRegistry::new();
        let (first, second) = (Arc::new(Probe::default()), Arc::new(Probe::default()));
        registry.open("a", first.handle());
        registry.set_active("a", false);

        registry.open("a", second.handle());
        assert_eq!(registry.len(), 1);
        assert!(!first.is_active());
        assert_eq!(registry.active(), None);

        registry.set_active("a", false);
        assert!(second.is_active());
    }

    #[test]
    fn test_close_deactivates_and_removes() {
        let registry = WindowRegistry::new();
        let a = Arc::new(Probe::default());
        registry.open("a", a.handle());
        registry.set_active("a", false);

        assert!(registry.close("a"));
        assert!(!registry.close("a"));
        assert!(!a.is_active());
        assert_eq!(a.deactivations.load(Ordering::SeqCst), 1);
        assert!(!registry.is_open("a"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_callback_may_reenter_registry() {
        let registry = Arc::new(WindowRegistry::new());
        let closes = Arc::new(AtomicUsize::new(0));

        let (r, n) = (Arc::clone(&registry), Arc::clone(&closes));
        let handle = WindowHandle::new(
            Arc::new(move || {
                // Close ourselves while being activated
                if r.close("a") {
                    n.fetch_add(1, Ordering::SeqCst);
                }
            }),
            Arc::new(|| {}),
            Arc::new(|| {}),
        );
        registry.open("a", handle);

        assert!(registry.set_active("a", false));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
        assert_eq!(registry.active(), None);
    }
}
