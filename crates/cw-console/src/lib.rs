//! cw-console: Remote console windows over the Guacamole protocol
//!
//! Each console window owns a [`ConsoleSession`] (the protocol client and
//! its WebSocket tunnel) and a [`ConnectionStateMachine`] (retry chrome and
//! reconnect countdown), composed by a [`WindowController`] that manages
//! geometry and input. Windows share a [`WindowRegistry`] that keeps exactly
//! one of them active, and optionally a [`DockingCoordinator`] that pins
//! them to a pannable canvas. [`ConsoleManager`] ties it all together.

pub mod docking;
pub mod manager;
pub mod registry;
pub mod retry;
pub mod session;
pub mod window;

pub use docking::{DockBinding, DockedPlacement, DockingCoordinator};
pub use manager::ConsoleManager;
pub use registry::{WindowCallback, WindowHandle, WindowRegistry};
pub use retry::{ConnectionState, ConnectionStateMachine, Severity, StatusView};
pub use session::{ConsoleSession, SessionEvent, SessionState};
pub use window::{Notification, WindowContext, WindowController, WindowEvent, ZOrder};
