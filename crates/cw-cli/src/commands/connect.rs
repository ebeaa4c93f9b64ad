//! Connect command implementation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use crate::output::{
    format_status, format_windows, print_error, print_info, print_notification, print_success,
    print_warning,
};
use cw_console::session::WebSocketConnector;
use cw_console::{ConnectionState, ConsoleManager, WindowEvent};
use cw_core::config::{self, ConsoleConfig};
use cw_core::traits::LogTelemetry;
use cw_core::{ConnectionUrl, ConsoleSpec, Credentials, FileLayoutStore, ResizeMethod, Size};

/// Arguments of `cw-probe connect`
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Console URL, e.g. https://gateway:8443/console/#/client/abc
    pub url: String,

    /// Connection identifier on the gateway
    #[arg(short = 'i', long)]
    pub connection_id: String,

    /// Connection type on the gateway ("c" for a connection, "g" for a group)
    #[arg(short = 't', long = "type", default_value = "c")]
    pub connection_type: String,

    /// Window title (defaults to the connection id)
    #[arg(long)]
    pub title: Option<String>,

    /// Pre-issued gateway auth token
    #[arg(long, env = "CW_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Gateway username
    #[arg(short, long, env = "CW_USERNAME")]
    pub username: Option<String>,

    /// Gateway password
    #[arg(long, env = "CW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SSO bearer token exchanged for a gateway token
    #[arg(long, env = "CW_SSO_TOKEN", hide_env_values = true)]
    pub sso_token: Option<String>,

    /// Remote protocol (clipboard paste needs RDP)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Let the remote display follow the window size using this method
    #[arg(long)]
    pub resize_method: Option<String>,

    /// Open as a maximized tab window
    #[arg(long)]
    pub tab: bool,

    /// Host viewport as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x800", value_parser = parse_viewport)]
    pub viewport: Size,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Paste this text into the remote clipboard once connected
    #[arg(long)]
    pub paste: Option<String>,

    /// Layout file (defaults to layouts.json next to the config)
    #[arg(long)]
    pub layouts: Option<PathBuf>,
}

/// Parse a `WIDTHxHEIGHT` viewport size
pub fn parse_viewport(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("viewport must be positive, got '{}'", s));
    }
    Ok(Size::new(width, height))
}

impl ConnectArgs {
    fn into_spec(self) -> Result<ConsoleSpec> {
        let url = ConnectionUrl::parse(&self.url)
            .with_context(|| format!("Invalid console URL: {}", self.url))?;
        let title = self.title.unwrap_or_else(|| self.connection_id.clone());

        let mut spec = ConsoleSpec::new(self.connection_id, self.connection_type, url, title);
        spec.protocol = self.protocol;
        spec.resize_method = ResizeMethod::from_option(self.resize_method.as_deref());
        spec.is_tab = self.tab;
        spec.token = self.token;
        spec.sso_token = self.sso_token;
        spec.credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (Some(_), None) => anyhow::bail!("--password is required with --username"),
            (None, _) => None,
        };
        Ok(spec)
    }
}

/// Execute the connect command: open one console and report its lifecycle
/// until it closes, gives up, the duration runs out or Ctrl-C.
pub async fn connect_command(config: ConsoleConfig, args: ConnectArgs) -> Result<()> {
    let viewport = args.viewport;
    let duration = args.duration.map(Duration::from_secs);
    let mut paste = args.paste.clone();
    let layout_path = args
        .layouts
        .clone()
        .unwrap_or_else(|| config::default_config_dir().join("layouts.json"));
    let spec = args.into_spec()?;
    let id = spec.connection_id.clone();

    let layouts = Arc::new(
        FileLayoutStore::open(&layout_path)
            .with_context(|| format!("Failed to open layouts: {:?}", layout_path))?,
    );
    let connector = Arc::new(WebSocketConnector::from_config(&config.tunnel));
    let mut manager = ConsoleManager::new(config, connector, viewport)
        .with_layouts(layouts.clone())
        .with_telemetry(Arc::new(LogTelemetry::new(None)));

    print_info(&format!(
        "Opening console {} on {}...",
        id, spec.connection_url
    ));
    let win = manager
        .add_console_window(spec)
        .await?
        .context("Console window already open")?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async {
        match duration {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                print_info("Interrupted");
                break Ok(());
            }
            _ = &mut deadline => {
                print_info("Probe duration elapsed");
                break Ok(());
            }
            event = manager.next_event() => {
                let Some((_, event)) = event else {
                    break Ok(());
                };
                tracing::debug!(?event, "Window event");
                let Some(window) = manager.window_mut(win) else {
                    break Ok(());
                };

                match event {
                    WindowEvent::Connection(ConnectionState::Success) => {
                        print_success(&format!("Connected to {}", id));
                        if let Some(text) = paste.take() {
                            print_notification(&window.paste(&text).await);
                        }
                    }
                    WindowEvent::Connection(ConnectionState::Connecting) => {
                        print_info(&format!("Connecting (attempt {})...", window.attempts()));
                    }
                    WindowEvent::Connection(ConnectionState::ErrorRetry) => {
                        print_warning(&format_status(&window.status()));
                    }
                    WindowEvent::Connection(ConnectionState::ErrorFinal) => {
                        let status = window.status();
                        print_error(&format_status(&status));
                        break Err(anyhow::anyhow!(
                            "Giving up on {} after {} attempts",
                            id,
                            window.attempts()
                        ));
                    }
                    WindowEvent::Display(display) => {
                        print_info(&format!(
                            "Remote display {}x{} (scale {})",
                            display.width,
                            display.height,
                            window.scale().map_or("-".to_string(), |s| format!("{:.3}", s))
                        ));
                    }
                    WindowEvent::RemoteClipboard(text) => {
                        print_info(&format!("Remote clipboard changed ({} bytes)", text.len()));
                    }
                    WindowEvent::Geometry(_) => {}
                    WindowEvent::Closed => break Ok(()),
                }
            }
        }
    };

    println!("{}", format_windows(manager.windows()));
    manager.close_all();
    if let Err(e) = layouts.persist() {
        tracing::warn!("Failed to save window layouts: {}", e);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(url: &str) -> ConnectArgs {
        ConnectArgs {
            url: url.to_string(),
            connection_id: "abc".to_string(),
            connection_type: "c".to_string(),
            title: None,
            token: None,
            username: None,
            password: None,
            sso_token: None,
            protocol: None,
            resize_method: None,
            tab: false,
            viewport: Size::new(1280.0, 800.0),
            duration: None,
            paste: None,
            layouts: None,
        }
    }

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("1280x800"), Ok(Size::new(1280.0, 800.0)));
        assert_eq!(parse_viewport("640X480"), Ok(Size::new(640.0, 480.0)));
        assert!(parse_viewport("1280").is_err());
        assert!(parse_viewport("0x800").is_err());
        assert!(parse_viewport("wide x tall").is_err());
    }

    #[test]
    fn test_spec_from_args() {
        let mut a = args("https://gw.example.com:8443/console/#/client/abc");
        a.resize_method = Some("display-update".to_string());
        a.username = Some("student".to_string());
        a.password = Some("pw".to_string());

        let spec = a.into_spec().unwrap();
        assert_eq!(spec.title, "abc");
        assert_eq!(spec.connection_url.host(), "gw.example.com");
        assert!(!spec.resize_method.is_aspect_locked());
        assert_eq!(spec.credentials.unwrap().username, "student");
    }

    #[test]
    fn test_username_needs_password() {
        let mut a = args("https://gw.example.com");
        a.username = Some("student".to_string());
        assert!(a.into_spec().is_err());
    }

    #[test]
    fn test_invalid_url() {
        let err = args("not a url").into_spec().unwrap_err();
        assert!(err.to_string().contains("Invalid console URL"));
    }
}
