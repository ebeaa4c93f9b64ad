//! Tunnel transports
//!
//! A tunnel carries Guacamole instruction text in both directions. The
//! session talks to it through [`TunnelTransport`]; how the bytes travel is
//! up to the [`TunnelConnector`].

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

use cw_core::config::TunnelConfig;
use cw_core::{ConnectionError, ConnectionId};
use cw_protocol::StatusCode;

/// WebSocket subprotocol spoken by the gateway
pub const GUACAMOLE_SUBPROTOCOL: &str = "guacamole";

/// Status reported when the gateway cannot be reached. Deliberately absent
/// from the named status table, so it renders as its number.
pub const UPSTREAM_NOT_FOUND: StatusCode = StatusCode(0x0207);

/// Outbound half of a tunnel
pub type TunnelSink = Pin<Box<dyn Sink<String, Error = ConnectionError> + Send>>;

/// Inbound half of a tunnel; yields raw instruction text
pub type TunnelStream = Pin<Box<dyn Stream<Item = Result<String, ConnectionError>> + Send>>;

/// An open tunnel
pub struct TunnelTransport {
    pub sink: TunnelSink,
    pub stream: TunnelStream,
}

impl std::fmt::Debug for TunnelTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelTransport").finish_non_exhaustive()
    }
}

/// Opens tunnels to a gateway
#[async_trait]
pub trait TunnelConnector: Send + Sync {
    /// Open a tunnel to `url`, passing the handshake `connect_data`
    async fn connect(&self, url: &str, connect_data: &str)
        -> Result<TunnelTransport, ConnectionError>;
}

/// Build the handshake query string for a connection
pub fn connect_data(
    token: &str,
    connection_id: &ConnectionId,
    connection_type: &str,
    config: &TunnelConfig,
) -> String {
    format!(
        "token={}&GUAC_ID={}&GUAC_DATA_SOURCE={}&GUAC_TYPE={}&GUAC_WIDTH={}&GUAC_HEIGHT={}&GUAC_DPI={}&GUAC_TIMEZONE={}&GUAC_IMAGE={}",
        urlencoding::encode(token),
        urlencoding::encode(connection_id.as_str()),
        urlencoding::encode(&config.data_source),
        urlencoding::encode(connection_type),
        config.width,
        config.height,
        config.dpi,
        urlencoding::encode(&config.timezone),
        urlencoding::encode(&config.image),
    )
}

/// Map a WebSocket close code onto a gateway status
pub fn status_for_close_code(code: u16) -> StatusCode {
    match code {
        1000 => StatusCode::SUCCESS,
        1006 | 1015 => UPSTREAM_NOT_FOUND,
        1013 => StatusCode::SERVER_BUSY,
        1008 => StatusCode::CLIENT_FORBIDDEN,
        _ => StatusCode::SERVER_ERROR,
    }
}

/// Tunnel over a `wss://` WebSocket with the `guacamole` subprotocol
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn from_config(config: &TunnelConfig) -> Self {
        Self::new(config.connect_timeout)
    }
}

#[async_trait]
impl TunnelConnector for WebSocketConnector {
    async fn connect(
        &self,
        url: &str,
        connect_data: &str,
    ) -> Result<TunnelTransport, ConnectionError> {
        let mut request = format!("{}?{}", url, connect_data)
            .into_client_request()
            .map_err(|e| ConnectionError::InvalidUrl(e.to_string()))?;
        request.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            HeaderValue::from_static(GUACAMOLE_SUBPROTOCOL),
        );

        tracing::debug!("Opening tunnel to {}", url);
        let (ws, _response) =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(request))
                .await
                .map_err(|_| ConnectionError::Status {
                    code: StatusCode::UPSTREAM_TIMEOUT,
                    message: "Connection timed out".to_string(),
                })?
                .map_err(|e| ConnectionError::Status {
                    code: UPSTREAM_NOT_FOUND,
                    message: e.to_string(),
                })?;

        let (sink, stream) = ws.split();

        let sink = sink
            .sink_map_err(|e| ConnectionError::Transport(e.to_string()))
            .with(|text: String| {
                futures::future::ready(Ok::<_, ConnectionError>(Message::Text(text.into())))
            });

        let stream = stream.filter_map(|frame| {
            futures::future::ready(match frame {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_string())),
                Ok(Message::Close(Some(close))) => {
                    let code = u16::from(close.code);
                    if close.code == CloseCode::Normal {
                        Some(Err(ConnectionError::Closed))
                    } else {
                        Some(Err(ConnectionError::Status {
                            code: status_for_close_code(code),
                            message: close.reason.as_str().to_string(),
                        }))
                    }
                }
                Ok(Message::Close(None)) => Some(Err(ConnectionError::Closed)),
                Ok(_) => None,
                Err(e) => Some(Err(ConnectionError::Transport(e.to_string()))),
            })
        });

        Ok(TunnelTransport {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}

/// Gateway end of an in-process tunnel
#[derive(Debug)]
pub struct GatewayEnd {
    /// URL the client asked for
    pub url: String,
    /// Handshake query string the client sent
    pub connect_data: String,
    to_client: fmpsc::UnboundedSender<String>,
    from_client: fmpsc::UnboundedReceiver<String>,
}

impl GatewayEnd {
    /// Send raw instruction text to the client
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.to_client.unbounded_send(text.into()).is_ok()
    }

    /// Next chunk of instruction text from the client; `None` once the
    /// client has closed the tunnel
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.next().await
    }

    /// Everything the client has sent so far, without waiting
    pub fn drain(&mut self) -> Vec<String> {
        let mut sent = Vec::new();
        while let Ok(Some(text)) = self.from_client.try_next() {
            sent.push(text);
        }
        sent
    }

    /// Drop the gateway side, closing the client's inbound stream
    pub fn close(self) {}
}

/// In-process tunnel for embedding a gateway and for tests.
///
/// Each successful `connect` hands a [`GatewayEnd`] to whoever holds the
/// receiver returned by [`ChannelConnector::new`]. Once that receiver is
/// dropped, connects fail as if the gateway were unreachable.
#[derive(Debug, Clone)]
pub struct ChannelConnector {
    gateway: mpsc::UnboundedSender<GatewayEnd>,
}

impl ChannelConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GatewayEnd>) {
        let (gateway, incoming) = mpsc::unbounded_channel();
        (Self { gateway }, incoming)
    }
}

#[async_trait]
impl TunnelConnector for ChannelConnector {
    async fn connect(
        &self,
        url: &str,
        connect_data: &str,
    ) -> Result<TunnelTransport, ConnectionError> {
        let (to_client, client_rx) = fmpsc::unbounded();
        let (client_tx, from_client) = fmpsc::unbounded();

        let end = GatewayEnd {
            url: url.to_string(),
            connect_data: connect_data.to_string(),
            to_client,
            from_client,
        };
        self.gateway.send(end).map_err(|_| ConnectionError::Status {
            code: UPSTREAM_NOT_FOUND,
            message: "Gateway unavailable".to_string(),
        })?;

        Ok(TunnelTransport {
            sink: Box::pin(client_tx.sink_map_err(|_| ConnectionError::Closed)),
            stream: Box::pin(client_rx.map(Ok)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_data_defaults() {
        let data = connect_data(
            "abc123",
            &ConnectionId::new("42"),
            "c",
            &TunnelConfig::default(),
        );
        assert_eq!(
            data,
            "token=abc123&GUAC_ID=42&GUAC_DATA_SOURCE=postgresql&GUAC_TYPE=c&GUAC_WIDTH=800&GUAC_HEIGHT=600&GUAC_DPI=96&GUAC_TIMEZONE=America%2FNew_York&GUAC_IMAGE=image%2Fpng"
        );
    }

    #[test]
    fn test_close_code_mapping() {
        assert_eq!(status_for_close_code(1006).to_string(), "519");
        assert_eq!(status_for_close_code(1011), StatusCode::SERVER_ERROR);
        assert_eq!(status_for_close_code(1013), StatusCode::SERVER_BUSY);
    }

    #[tokio::test]
    async fn test_channel_connector_round_trip() {
        let (connector, mut incoming) = ChannelConnector::new();
        let mut transport = connector
            .connect("wss://gw:8443/websocket-tunnel", "token=t")
            .await
            .unwrap();

        let mut gateway = incoming.recv().await.unwrap();
        assert_eq!(gateway.url, "wss://gw:8443/websocket-tunnel");
        assert_eq!(gateway.connect_data, "token=t");

        transport.sink.send("3.nop;".to_string()).await.unwrap();
        assert_eq!(gateway.recv().await.as_deref(), Some("3.nop;"));

        assert!(gateway.send("5.ready,1.x;"));
        let text = transport.stream.next().await.unwrap().unwrap();
        assert_eq!(text, "5.ready,1.x;");

        gateway.close();
        assert!(transport.stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_channel_connector_without_gateway() {
        let (connector, incoming) = ChannelConnector::new();
        drop(incoming);

        let err = connector.connect("wss://gw/websocket-tunnel", "").await.unwrap_err();
        assert_eq!(err.to_string(), "519: Gateway unavailable");
    }
}
