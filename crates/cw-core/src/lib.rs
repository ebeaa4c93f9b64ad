//! cw-core: Core abstractions and configuration for console-windows
//!
//! This crate provides the shared types, geometry, coordinate transforms,
//! layout persistence contract and configuration structures used by the
//! console session, window controller and CLI crates.

pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod traits;
pub mod transform;
pub mod types;

pub use error::{ConfigError, ConnectionError, CwError, SessionError, TelemetryError};
pub use geometry::{DisplayMetrics, Point, Rect, Size, WindowGeometry};
pub use layout::{FileLayoutStore, LayoutStore, MemoryLayoutStore, StoredLayout};
pub use transform::PointerTransform;
pub use types::{ConnectionId, ConnectionUrl, ConsoleSpec, ConsoleStatus, Credentials, ResizeMethod};
