//! # WebSocket Transport
//!
//! JSON text frames over a WebSocket, the protocol the robot's control server
//! speaks on port 8080.
//!
//! [`connect`] returns immediately with a [`ChannelLink`] and an event
//! receiver; a background task performs the handshake and then pumps frames
//! until either side closes. There is no retry: after `Close` or `Error` the
//! caller must call [`connect`] again.
//!
//! Inbound messages larger than [`MAX_MESSAGE_BYTES`] end the connection
//! with an `Error`.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::{ChannelLink, LinkEvent};

/// Largest inbound message or frame accepted from the robot.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handles to a running WebSocket transport.
#[derive(Debug)]
pub struct WsTransport {
    pub link: ChannelLink,
    pub events: mpsc::UnboundedReceiver<LinkEvent>,
    pub task: JoinHandle<()>,
}

/// `ws://` URL for a `host:port` address. Full `ws://` URLs pass through.
#[must_use]
pub fn url_for(address: &str) -> String {
    if address.starts_with("ws://") {
        address.to_string()
    } else {
        format!("ws://{}/", address)
    }
}

fn socket_config() -> WebSocketConfig {
    WebSocketConfig {
        max_message_size: Some(MAX_MESSAGE_BYTES),
        max_frame_size: Some(MAX_MESSAGE_BYTES),
        ..WebSocketConfig::default()
    }
}

/// Starts connecting to `address` (`host:port` or a `ws://` URL).
pub fn connect(address: String, connect_timeout: Duration) -> WsTransport {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let url = url_for(&address);
        let handshake =
            tokio_tungstenite::connect_async_with_config(url.as_str(), Some(socket_config()), true);
        let socket = match tokio::time::timeout(connect_timeout, handshake).await {
            Ok(Ok((socket, response))) => {
                debug!("Handshake with {} returned {}", url, response.status());
                socket
            }
            Ok(Err(e)) => {
                warn!("Failed to connect to {}: {}", url, e);
                let _ = event_tx.send(LinkEvent::Error(format!("Failed to connect to {}: {}", url, e)));
                return;
            }
            Err(_) => {
                warn!("Timed out connecting to {}", url);
                let _ = event_tx.send(LinkEvent::Error(format!("Timed out connecting to {}", url)));
                return;
            }
        };

        info!("Connected to robot at {}", url);
        let _ = event_tx.send(LinkEvent::Open);

        let closing = pump(socket, out_rx, &event_tx).await;
        info!("Link to {} closed", url);
        let _ = event_tx.send(closing);
    });

    WsTransport {
        link: ChannelLink::new(out_tx),
        events: event_rx,
        task,
    }
}

/// Moves frames in both directions until the connection ends.
///
/// Returns the event that ended it (`Close` or `Error`).
async fn pump(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: &mpsc::UnboundedSender<LinkEvent>,
) -> LinkEvent {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            message = stream.next() => {
                let text = match message {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            debug!("Dropping non UTF-8 binary message");
                            continue;
                        }
                    },
                    // Pings are answered by the stream itself
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => return LinkEvent::Close,
                    Some(Err(e)) => return LinkEvent::Error(format!("Read failed: {}", e)),
                };
                if events.send(LinkEvent::Frame(text)).is_err() {
                    return LinkEvent::Close;
                }
            }

            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::Text(frame)).await {
                        return LinkEvent::Error(format!("Write failed: {}", e));
                    }
                }
                None => {
                    // Every link handle is gone
                    let _ = sink.close().await;
                    return LinkEvent::Close;
                }
            },
        }
    }
}
