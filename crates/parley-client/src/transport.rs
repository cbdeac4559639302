//! WebSocket transport for the client.
//!
//! Provides [`ConnectedSocket`] which handles WebSocket I/O for envelope
//! transport. This is a thin layer that just sends/receives envelopes —
//! protocol logic remains in the Sans-IO [`crate::Client`].
//!
//! Connection loss is handled here with a bounded retry policy: a fixed
//! number of attempts with a fixed delay between them, no backoff. When the
//! attempts are exhausted the transport reports
//! [`TransportEvent::Down`] and stops; reconnecting after that is a user
//! decision.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parley_proto::{Envelope, ProtocolError};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::mpsc,
    time::sleep,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Initial connection failed.
    #[error("failed to connect: {0}")]
    Connect(String),

    /// Stream error after the connection was established.
    #[error("stream error: {0}")]
    Stream(String),

    /// Envelope encode/decode failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Bounded reconnect policy.
///
/// Fixed attempt count and fixed delay; no exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum automatic reconnection attempts after a drop.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, delay: Duration::from_millis(1000) }
    }
}

/// Events the transport reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection established (initial dial or a successful reconnect).
    Up,

    /// Envelope received from the server.
    Envelope(Envelope),

    /// Connection lost and the retry policy is exhausted, or the server
    /// closed the session.
    Down {
        /// Close reason, when one was reported.
        reason: Option<String>,
    },
}

/// Handle to a connected WebSocket transport.
///
/// Envelopes are sent/received via the channels; an internal task handles
/// the socket I/O and the reconnect policy.
pub struct ConnectedSocket {
    /// Send envelopes to the server.
    pub to_server: mpsc::Sender<Envelope>,
    /// Receive transport events (acks, envelopes, loss).
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedSocket {
    /// Stop the connection task and release the socket.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How one established connection ended.
enum StreamEnd {
    /// Server closed or the stream failed; reconnect may apply.
    Remote(Option<String>),
    /// Our side dropped the sender; no reconnect.
    Local,
}

/// Map an HTTP-scheme endpoint URL onto a WebSocket URL.
///
/// `http://` → `ws://`, `https://` → `wss://`; `ws(s)://` pass through;
/// anything without a scheme gets `ws://`.
#[must_use]
pub fn websocket_url(endpoint: &str) -> String {
    if let Some(rest) = endpoint.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = endpoint.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
        endpoint.to_string()
    } else {
        format!("ws://{endpoint}")
    }
}

/// Connect to a Parley server over WebSocket.
///
/// Returns a [`ConnectedSocket`] with channels for envelope transport. The
/// first [`TransportEvent::Up`] arrives on the event channel once the task
/// starts; subsequent `Up` events mark internal reconnects.
///
/// # Errors
///
/// [`TransportError::Connect`] if the initial dial fails. Later drops are
/// reported asynchronously as [`TransportEvent::Down`], not as errors.
pub async fn connect(
    endpoint: &str,
    policy: ReconnectPolicy,
) -> Result<ConnectedSocket, TransportError> {
    let url = websocket_url(endpoint);

    let (stream, _response) = connect_async(&url)
        .await
        .map_err(|e| TransportError::Connect(e.to_string()))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<Envelope>(32);
    let (events_tx, events_rx) = mpsc::channel::<TransportEvent>(32);

    let handle = tokio::spawn(run_connection(url, policy, stream, to_server_rx, events_tx));

    Ok(ConnectedSocket {
        to_server: to_server_tx,
        from_server: events_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the socket, and
/// applying the reconnect policy on drops.
async fn run_connection(
    url: String,
    policy: ReconnectPolicy,
    first_stream: WsStream,
    mut to_server: mpsc::Receiver<Envelope>,
    events: mpsc::Sender<TransportEvent>,
) {
    let mut stream = first_stream;

    loop {
        if events.send(TransportEvent::Up).await.is_err() {
            return;
        }

        let end = drive_stream(&mut stream, &mut to_server, &events).await;

        let reason = match end {
            StreamEnd::Local => return,
            StreamEnd::Remote(reason) => reason,
        };

        match redial(&url, policy).await {
            Some(next) => stream = next,
            None => {
                let _ = events.send(TransportEvent::Down { reason }).await;
                return;
            },
        }
    }
}

/// Pump one established stream until it ends.
async fn drive_stream(
    stream: &mut WsStream,
    to_server: &mut mpsc::Receiver<Envelope>,
    events: &mpsc::Sender<TransportEvent>,
) -> StreamEnd {
    loop {
        tokio::select! {
            outgoing = to_server.recv() => {
                let Some(envelope) = outgoing else {
                    // Owner dropped the handle; close quietly.
                    let _ = stream.close(None).await;
                    return StreamEnd::Local;
                };

                let text = match envelope.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("dropping unencodable envelope: {e}");
                        continue;
                    },
                };

                if let Err(e) = stream.send(Message::Text(text.into())).await {
                    return StreamEnd::Remote(Some(e.to_string()));
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match Envelope::decode(text.as_ref()) {
                            Ok(envelope) => {
                                if events
                                    .send(TransportEvent::Envelope(envelope))
                                    .await
                                    .is_err()
                                {
                                    return StreamEnd::Local;
                                }
                            },
                            Err(e) => {
                                tracing::warn!("dropping malformed frame: {e}");
                            },
                        }
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame.map(|f| f.reason.to_string());
                        return StreamEnd::Remote(reason);
                    },
                    // Ping/pong are handled inside tungstenite; binary
                    // frames are not part of this protocol.
                    Some(Ok(_)) => {},
                    Some(Err(e)) => return StreamEnd::Remote(Some(e.to_string())),
                    None => return StreamEnd::Remote(None),
                }
            }
        }
    }
}

/// Apply the reconnect policy. Returns the new stream, or `None` when the
/// attempts are exhausted.
async fn redial(url: &str, policy: ReconnectPolicy) -> Option<WsStream> {
    for attempt in 1..=policy.max_attempts {
        sleep(policy.delay).await;

        match connect_async(url).await {
            Ok((stream, _response)) => {
                tracing::info!("reconnected to {url} on attempt {attempt}");
                return Some(stream);
            },
            Err(e) => {
                tracing::warn!(
                    "reconnect attempt {attempt}/{} failed: {e}",
                    policy.max_attempts
                );
            },
        }
    }

    None
}
