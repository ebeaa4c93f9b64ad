//! Core trait definitions

mod projection;
mod telemetry;

pub use projection::{CanvasProjection, PanZoom};
pub use telemetry::{LogTelemetry, NoopTelemetry, TelemetryEvent, TelemetrySink};
