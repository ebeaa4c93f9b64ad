//! Console configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::RetryConfig;
use super::serde_utils::duration_secs;
use super::window::{ResizeConfig, WindowConfig};

/// Top-level configuration shared by every console window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Reconnect policy
    pub retry: RetryConfig,

    /// Window sizing limits
    pub window: WindowConfig,

    /// Resize timers
    pub resize: ResizeConfig,

    /// Tunnel handshake parameters
    pub tunnel: TunnelConfig,
}

/// Parameters of the tunnel handshake.
///
/// The connect data sent when opening the tunnel is built from these plus
/// the auth token and the connection id/type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Scheme of the WebSocket tunnel endpoint
    pub scheme: String,

    /// Scheme of the token endpoint
    pub token_scheme: String,

    /// Gateway data source holding the connection definitions
    pub data_source: String,

    /// Initial remote display width requested in the handshake
    pub width: u32,

    /// Initial remote display height requested in the handshake
    pub height: u32,

    /// Display DPI requested in the handshake
    pub dpi: u32,

    /// Timezone forwarded to the remote desktop
    pub timezone: String,

    /// Image mimetype the client accepts
    pub image: String,

    /// Timeout for the WebSocket handshake and the token request
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Interval between keep-alive `nop` instructions
    #[serde(with = "duration_secs")]
    pub keep_alive: Duration,

    /// Silence from the gateway after which the tunnel is considered dead
    #[serde(with = "duration_secs")]
    pub receive_timeout: Duration,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            scheme: "wss".to_string(),
            token_scheme: "https".to_string(),
            data_source: "postgresql".to_string(),
            width: 800,
            height: 600,
            dpi: 96,
            timezone: "America/New_York".to_string(),
            image: "image/png".to_string(),
            connect_timeout: Duration::from_secs(15),
            keep_alive: Duration::from_secs(5),
            receive_timeout: Duration::from_secs(15),
        }
    }
}
