//! Telemetry traits

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::TelemetryError;
use crate::types::ConnectionId;

/// Events reported to the hosting application
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    /// A console window was opened
    ConsoleOpen {
        connection_id: ConnectionId,
        connection_type: String,
        title: String,
    },
    /// Local clipboard text was pasted into a console
    CopyPasteChange,
}

impl TelemetryEvent {
    /// Wire tag of the event
    pub fn tag(&self) -> &'static str {
        match self {
            TelemetryEvent::ConsoleOpen { .. } => "console_open",
            TelemetryEvent::CopyPasteChange => "copy_paste_change",
        }
    }

    /// Event metadata. The pasted text itself is never reported.
    pub fn metadata(&self) -> Value {
        match self {
            TelemetryEvent::ConsoleOpen {
                connection_id,
                connection_type,
                title,
            } => json!({
                "connectionId": connection_id.as_str(),
                "connectionType": connection_type,
                "title": title,
            }),
            TelemetryEvent::CopyPasteChange => json!({
                "clipboardContent": "copied text",
            }),
        }
    }
}

/// Receiver of telemetry events.
///
/// Callers log failures and carry on; a sink error never affects a window.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn send(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

#[async_trait]
impl TelemetrySink for NoopTelemetry {
    async fn send(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Writes events to the tracing log, tagged with a scenario id
#[derive(Debug, Default, Clone)]
pub struct LogTelemetry {
    scenario_id: Option<String>,
}

impl LogTelemetry {
    pub fn new(scenario_id: Option<String>) -> Self {
        Self { scenario_id }
    }
}

#[async_trait]
impl TelemetrySink for LogTelemetry {
    async fn send(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        tracing::info!(
            scenario = self.scenario_id.as_deref().unwrap_or("-"),
            event = event.tag(),
            metadata = %event.metadata(),
            "Scenario event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_open_metadata() {
        let event = TelemetryEvent::ConsoleOpen {
            connection_id: ConnectionId::new("abc"),
            connection_type: "c".to_string(),
            title: "Kali".to_string(),
        };
        assert_eq!(event.tag(), "console_open");
        assert_eq!(
            event.metadata(),
            json!({"connectionId": "abc", "connectionType": "c", "title": "Kali"})
        );
    }

    #[test]
    fn test_copy_paste_metadata_hides_content() {
        let event = TelemetryEvent::CopyPasteChange;
        assert_eq!(event.tag(), "copy_paste_change");
        assert_eq!(event.metadata(), json!({"clipboardContent": "copied text"}));
    }

    #[tokio::test]
    async fn test_noop_sink() {
        assert!(NoopTelemetry.send(&TelemetryEvent::CopyPasteChange).await.is_ok());
    }
}
