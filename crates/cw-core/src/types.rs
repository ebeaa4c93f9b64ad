//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConnectionError;

/// Unique identifier for a remote console connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Create a new connection ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Gateway address taken from a console URL such as
/// `https://gw.example.com:8443/console/#/client/abc`.
///
/// Only the authority and an optional leading `console` path segment are
/// kept; both the tunnel and the token endpoint hang off that base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionUrl {
    host: String,
    port: Option<String>,
    console_path: bool,
}

impl ConnectionUrl {
    /// Parse a `scheme://host[:port][/console/...]` URL
    pub fn parse(url: &str) -> Result<Self, ConnectionError> {
        let segments: Vec<&str> = url.split('/').collect();
        let authority = segments
            .get(2)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConnectionError::InvalidUrl(url.to_string()))?;

        let mut parts = authority.split(':');
        let host = parts.next().unwrap_or_default();
        if host.is_empty() {
            return Err(ConnectionError::InvalidUrl(url.to_string()));
        }
        let port = parts.next().filter(|p| !p.is_empty()).map(str::to_string);

        Ok(Self {
            host: host.to_string(),
            port,
            console_path: segments.get(3) == Some(&"console"),
        })
    }

    /// Gateway host name
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Gateway port, if the URL carried one
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Whether the gateway is mounted under `/console`
    pub fn has_console_path(&self) -> bool {
        self.console_path
    }

    /// `host[:port][/console]`, the base every endpoint is built on
    pub fn authority(&self) -> String {
        let mut base = self.host.clone();
        if let Some(port) = &self.port {
            base.push(':');
            base.push_str(port);
        }
        if self.console_path {
            base.push_str("/console");
        }
        base
    }

    /// WebSocket tunnel endpoint
    pub fn tunnel_url(&self, scheme: &str) -> String {
        format!("{}://{}/websocket-tunnel", scheme, self.authority())
    }

    /// Auth token endpoint
    pub fn token_url(&self, scheme: &str) -> String {
        format!("{}://{}/api/tokens", scheme, self.authority())
    }
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority())
    }
}

/// How a window reacts to being resized
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeMethod {
    /// Aspect ratio locked to the remote display; the remote size never changes
    #[default]
    Locked,
    /// Window resizes freely and asks the remote display to follow
    Free(String),
}

impl ResizeMethod {
    /// An absent resize method means the aspect ratio is locked
    pub fn from_option(method: Option<&str>) -> Self {
        match method {
            Some(m) => ResizeMethod::Free(m.to_string()),
            None => ResizeMethod::Locked,
        }
    }

    /// Whether resizing keeps the remote aspect ratio
    pub fn is_aspect_locked(&self) -> bool {
        matches!(self, ResizeMethod::Locked)
    }
}

/// Static gateway credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Deployment status of a console as reported by the range API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStatus {
    /// Console is being provisioned
    Creating,
    /// Console can be opened
    Ready,
    /// Console is being torn down
    Deleting,
    /// Provisioning failed
    Error,
}

impl ConsoleStatus {
    /// Whether a console with this (possibly unknown) status can be launched
    pub fn is_ready(status: Option<ConsoleStatus>) -> bool {
        matches!(status, Some(ConsoleStatus::Ready))
    }
}

impl fmt::Display for ConsoleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleStatus::Creating => write!(f, "creating"),
            ConsoleStatus::Ready => write!(f, "ready"),
            ConsoleStatus::Deleting => write!(f, "deleting"),
            ConsoleStatus::Error => write!(f, "error"),
        }
    }
}

/// Everything needed to open one console window
#[derive(Debug, Clone)]
pub struct ConsoleSpec {
    /// Gateway connection identifier
    pub connection_id: ConnectionId,
    /// Gateway connection type (`c` for a connection, `g` for a group)
    pub connection_type: String,
    /// Gateway address
    pub connection_url: ConnectionUrl,
    /// Window title
    pub title: String,
    /// Aspect-lock behavior
    pub resize_method: ResizeMethod,
    /// Remote protocol hint (`RDP`, `VNC`, `SSH`); clipboard paste is only
    /// offered for RDP
    pub protocol: Option<String>,
    /// Static credentials for the token endpoint
    pub credentials: Option<Credentials>,
    /// Pre-issued auth token; skips the token endpoint
    pub token: Option<String>,
    /// SSO identity token sent as the `Authorization` header to the token
    /// endpoint when no static credentials are configured
    pub sso_token: Option<String>,
    /// Window lives in a tab: starts maximized and cannot be dragged
    pub is_tab: bool,
}

impl ConsoleSpec {
    /// Spec with an aspect-locked, non-tab window and no auth
    pub fn new(
        connection_id: impl Into<ConnectionId>,
        connection_type: impl Into<String>,
        connection_url: ConnectionUrl,
        title: impl Into<String>,
    ) -> Self {
        Self {
            connection_id: connection_id.into(),
            connection_type: connection_type.into(),
            connection_url,
            title: title.into(),
            resize_method: ResizeMethod::Locked,
            protocol: None,
            credentials: None,
            token: None,
            sso_token: None,
            is_tab: false,
        }
    }

    /// Whether local clipboard text can be pasted into the remote desktop
    pub fn supports_clipboard_paste(&self) -> bool {
        self.protocol.as_deref() == Some("RDP")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_console_url() {
        let url = ConnectionUrl::parse("https://gw.example.com:8443/console/#/client/abc").unwrap();
        assert_eq!(url.host(), "gw.example.com");
        assert_eq!(url.port(), Some("8443"));
        assert!(url.has_console_path());
        assert_eq!(url.authority(), "gw.example.com:8443/console");
        assert_eq!(
            url.tunnel_url("wss"),
            "wss://gw.example.com:8443/console/websocket-tunnel"
        );
        assert_eq!(
            url.token_url("https"),
            "https://gw.example.com:8443/console/api/tokens"
        );
    }

    #[test]
    fn test_parse_bare_url() {
        let url = ConnectionUrl::parse("https://10.0.0.5:8080/guacamole").unwrap();
        assert!(!url.has_console_path());
        assert_eq!(url.tunnel_url("wss"), "wss://10.0.0.5:8080/websocket-tunnel");

        let url = ConnectionUrl::parse("https://gateway").unwrap();
        assert_eq!(url.port(), None);
        assert_eq!(url.authority(), "gateway");
    }

    #[test]
    fn test_parse_invalid_url() {
        assert!(ConnectionUrl::parse("gateway:8443").is_err());
        assert!(ConnectionUrl::parse("https:///console").is_err());
        assert!(ConnectionUrl::parse("https://:8443/console").is_err());
    }

    #[test]
    fn test_resize_method_from_option() {
        assert!(ResizeMethod::from_option(None).is_aspect_locked());
        let free = ResizeMethod::from_option(Some("display-update"));
        assert_eq!(free, ResizeMethod::Free("display-update".to_string()));
        assert!(!free.is_aspect_locked());
    }

    #[test]
    fn test_console_ready() {
        assert!(ConsoleStatus::is_ready(Some(ConsoleStatus::Ready)));
        assert!(!ConsoleStatus::is_ready(Some(ConsoleStatus::Creating)));
        assert!(!ConsoleStatus::is_ready(None));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("student", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("student"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_console_status_display() {
        assert_eq!(format!("{}", ConsoleStatus::Ready), "ready");
        assert_eq!(format!("{}", ConsoleStatus::Deleting), "deleting");
    }
}
