//! Tunnel I/O task
//!
//! One task per connection attempt. It resolves the auth token, opens the
//! tunnel, then shuttles instructions until cancelled or the tunnel fails.
//! It never touches session state; everything it learns is posted back as
//! a [`TunnelMessage`].

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use cw_core::config::TunnelConfig;
use cw_core::{ConnectionError, ConnectionId, ConnectionUrl};
use cw_protocol::{Instruction, InstructionCodec, Opcode, StatusCode};

use super::token::{AuthSource, TokenClient};
use super::tunnel::{connect_data, TunnelConnector, TunnelTransport};

/// Floor for the keep-alive interval; a zero period would spin
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(1);

/// What the I/O task reports back to its session
#[derive(Debug)]
pub(crate) enum TunnelMessage {
    /// Token used for this attempt; kept for reconnects
    Token(String),
    /// Tunnel handshake finished
    Opened,
    /// Instruction from the gateway
    Instruction(Instruction),
    /// Tunnel closed cleanly by the gateway
    Closed,
    /// Attempt failed; the task has exited
    Failed(ConnectionError),
}

/// Everything one connection attempt needs
pub(crate) struct TunnelRequest {
    pub connector: Arc<dyn TunnelConnector>,
    pub tokens: TokenClient,
    pub url: ConnectionUrl,
    pub auth: AuthSource,
    pub connection_id: ConnectionId,
    pub connection_type: String,
    pub config: TunnelConfig,
}

pub(crate) async fn run(
    request: TunnelRequest,
    mut outbound: mpsc::UnboundedReceiver<Instruction>,
    inbound: mpsc::UnboundedSender<TunnelMessage>,
    cancel: CancellationToken,
) {
    let token = tokio::select! {
        _ = cancel.cancelled() => return,
        result = request.tokens.resolve(&request.url, &request.auth) => match result {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Token request for {} failed: {}", request.connection_id, e);
                let _ = inbound.send(TunnelMessage::Failed(e));
                return;
            }
        },
    };
    let _ = inbound.send(TunnelMessage::Token(token.clone()));

    let data = connect_data(
        &token,
        &request.connection_id,
        &request.connection_type,
        &request.config,
    );
    let tunnel_url = request.url.tunnel_url(&request.config.scheme);

    let transport = tokio::select! {
        _ = cancel.cancelled() => return,
        result = request.connector.connect(&tunnel_url, &data) => match result {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!("Tunnel to {} failed: {}", tunnel_url, e);
                let _ = inbound.send(TunnelMessage::Failed(e));
                return;
            }
        },
    };

    tracing::info!("Tunnel open for connection {}", request.connection_id);
    let _ = inbound.send(TunnelMessage::Opened);

    if let Err(e) = pump(transport, &request.config, &mut outbound, &inbound, &cancel).await {
        tracing::warn!("Tunnel for {} failed: {}", request.connection_id, e);
        let _ = inbound.send(TunnelMessage::Failed(e));
    }
}

/// Shuttle instructions until cancelled or the tunnel ends
async fn pump(
    transport: TunnelTransport,
    config: &TunnelConfig,
    outbound: &mut mpsc::UnboundedReceiver<Instruction>,
    inbound: &mpsc::UnboundedSender<TunnelMessage>,
    cancel: &CancellationToken,
) -> Result<(), ConnectionError> {
    let TunnelTransport {
        mut sink,
        mut stream,
    } = transport;
    let mut codec = InstructionCodec::new();

    let mut keep_alive = tokio::time::interval(config.keep_alive.max(MIN_KEEP_ALIVE));
    keep_alive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    keep_alive.reset();

    let receive_deadline = tokio::time::sleep(config.receive_timeout);
    tokio::pin!(receive_deadline);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                // Flush what the session queued before cancelling, usually
                // the final `disconnect`.
                while let Ok(instruction) = outbound.try_recv() {
                    if sink.send(instruction.to_wire()).await.is_err() {
                        break;
                    }
                }
                let _ = sink.close().await;
                tracing::debug!("Tunnel closed by client");
                return Ok(());
            }

            Some(instruction) = outbound.recv() => {
                sink.send(instruction.to_wire()).await?;
            }

            frame = stream.next() => match frame {
                Some(Ok(text)) => {
                    receive_deadline
                        .as_mut()
                        .reset(Instant::now() + config.receive_timeout);

                    for instruction in codec.decode_all(&text)? {
                        match instruction.kind() {
                            Opcode::Internal => {
                                tracing::debug!(
                                    uuid = instruction.args().first().map(String::as_str).unwrap_or(""),
                                    "Tunnel established"
                                );
                            }
                            Opcode::Sync => {
                                let timestamp = instruction.arg_i64(0)?;
                                sink.send(Instruction::sync(timestamp).to_wire()).await?;
                                let _ = inbound.send(TunnelMessage::Instruction(instruction));
                            }
                            _ => {
                                let _ = inbound.send(TunnelMessage::Instruction(instruction));
                            }
                        }
                    }
                }
                Some(Err(ConnectionError::Closed)) | None => {
                    tracing::debug!("Tunnel closed by gateway");
                    let _ = inbound.send(TunnelMessage::Closed);
                    return Ok(());
                }
                Some(Err(e)) => return Err(e),
            },

            _ = keep_alive.tick() => {
                sink.send(Instruction::nop().to_wire()).await?;
            }

            _ = &mut receive_deadline => {
                return Err(ConnectionError::Status {
                    code: StatusCode::UPSTREAM_TIMEOUT,
                    message: "Server timeout.".to_string(),
                });
            }
        }
    }
}
