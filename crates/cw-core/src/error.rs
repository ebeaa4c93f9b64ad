//! Core error types for console-windows

use cw_protocol::{ProtocolError, StatusCode};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the console-windows crates
#[derive(Error, Debug)]
pub enum CwError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Session error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport and handshake errors.
///
/// These never cross the session boundary as `Err`; the session renders
/// them to a display string for the connection state machine.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Gateway reported an error status.
    ///
    /// Displays as `CATEGORY: message`, with unknown codes shown as numbers.
    #[error("{code}: {message}")]
    Status { code: StatusCode, message: String },

    /// WebSocket handshake or transport failure
    #[error("Tunnel error: {0}")]
    Transport(String),

    /// Auth token could not be obtained
    #[error("Token request failed: {0}")]
    Token(String),

    /// Tunnel closed by the remote end
    #[error("Tunnel closed")]
    Closed,

    /// Malformed instruction from the gateway
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    /// Connection URL could not be parsed
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),
}

/// Session-related errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// `connect` called while a tunnel is already open
    #[error("Session already connected: {0}")]
    AlreadyConnected(String),

    /// Operation requires an open tunnel
    #[error("Session not connected: {0}")]
    NotConnected(String),

    /// Window is closing or closed
    #[error("Window closed: {0}")]
    Closed(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// JSON layout file error
    #[error("Layout file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outbound telemetry failures; logged, never surfaced to the user
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The sink could not deliver the event
    #[error("Telemetry delivery failed: {0}")]
    Delivery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ConnectionError::Status {
            code: StatusCode::new(519),
            message: "Aborted. See logs.".to_string(),
        };
        assert_eq!(err.to_string(), "519: Aborted. See logs.");

        let err = ConnectionError::Status {
            code: StatusCode::UPSTREAM_TIMEOUT,
            message: "Connection timed out".to_string(),
        };
        assert_eq!(err.to_string(), "UPSTREAM_TIMEOUT: Connection timed out");
    }
}
