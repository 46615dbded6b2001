//! Reconnecting control link to the rover.
//!
//! [`DriveChannel`] keeps one logical WebSocket alive against an unreliable
//! radio link: every termination, whatever its cause, schedules exactly one
//! reconnect after a fixed delay, forever. Sends are fire-and-forget; a
//! command offered while the link is down is dropped rather than queued,
//! because a stale drive command is worse than a missing one.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{stream::SplitSink, SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{broadcast, Mutex},
};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

pub mod dispatcher;
pub use dispatcher::{AxisSide, ControlEvent, InputDispatcher};

/// Fixed wait between a close and the next connect attempt. Constant by
/// design; the policy never backs off and never gives up.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

const EVENT_CHANNEL_CAPACITY: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// What the channel tells the outside world. Inbound frames are forwarded
/// verbatim for display; the link layer never parses them.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    StateChanged(ChannelState),
    MessageReceived(String),
    Error(String),
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid device host {host:?}: {source}")]
    InvalidEndpoint {
        host: String,
        source: url::ParseError,
    },
}

/// Builds the fixed control endpoint for a device host: `ws://<host>/ws`.
pub fn endpoint_url(host: &str) -> Result<Url, LinkError> {
    Url::parse(&format!("ws://{host}/ws")).map_err(|source| LinkError::InvalidEndpoint {
        host: host.to_string(),
        source,
    })
}

/// Anything that accepts wire-format command frames. Lets the dispatcher be
/// exercised against a recording sink in tests.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send_command(&self, payload: &str);
}

struct ChannelInner {
    state: ChannelState,
    // Bumped on every connect attempt. Open/close handlers carry the
    // generation they were spawned under and ignore anything stale, so a
    // superseded socket can never clobber the live one or schedule a
    // duplicate reconnect.
    generation: u64,
    sink: Option<WsSink>,
}

pub struct DriveChannel {
    endpoint: Url,
    reconnect_delay: Duration,
    inner: Mutex<ChannelInner>,
    events: broadcast::Sender<ChannelEvent>,
}

impl DriveChannel {
    pub fn new(endpoint: Url) -> Arc<Self> {
        Self::with_reconnect_delay(endpoint, RECONNECT_DELAY)
    }

    pub fn with_reconnect_delay(endpoint: Url, reconnect_delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            endpoint,
            reconnect_delay,
            inner: Mutex::new(ChannelInner {
                state: ChannelState::Closed,
                generation: 0,
                sink: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> ChannelState {
        self.inner.lock().await.state
    }

    /// Starts a connect attempt and returns immediately. Idempotent: a call
    /// while an attempt is outstanding or the link is open does nothing.
    pub async fn connect(self: &Arc<Self>) {
        let generation = {
            let mut guard = self.inner.lock().await;
            if guard.state != ChannelState::Closed {
                debug!(state = ?guard.state, "link: connect skipped, attempt already outstanding");
                return;
            }
            guard.generation += 1;
            guard.state = ChannelState::Connecting;
            guard.generation
        };
        self.emit_state(ChannelState::Connecting);
        info!(endpoint = %self.endpoint, generation, "link: connecting");

        let channel = Arc::clone(self);
        tokio::spawn(async move {
            match connect_async(channel.endpoint.as_str()).await {
                Ok((stream, _)) => channel.on_open(generation, stream).await,
                Err(err) => {
                    warn!(endpoint = %channel.endpoint, generation, "link: connect failed: {err}");
                    let _ = channel
                        .events
                        .send(ChannelEvent::Error(format!("connect failed: {err}")));
                    channel.on_close(generation).await;
                }
            }
        });
    }

    /// Best-effort transmit. Nothing is queued and nothing is retried; if the
    /// link is not open the payload is dropped silently. A write failure is
    /// treated the same as any other termination.
    pub async fn send(self: &Arc<Self>, payload: &str) {
        // The sink is taken out of the lock for the write: a stalled TCP
        // write must not block state queries or the close path.
        let (mut sink, generation) = {
            let mut guard = self.inner.lock().await;
            if guard.state != ChannelState::Open {
                debug!(payload, state = ?guard.state, "link: dropping payload, channel not open");
                return;
            }
            let Some(sink) = guard.sink.take() else {
                debug!(payload, "link: dropping payload, no active socket");
                return;
            };
            (sink, guard.generation)
        };
        match sink.send(Message::Text(payload.to_string())).await {
            Ok(()) => {
                let mut guard = self.inner.lock().await;
                if guard.generation == generation && guard.state == ChannelState::Open {
                    guard.sink = Some(sink);
                }
                // Otherwise the link turned over during the write and the
                // old sink belongs to a dead socket.
            }
            Err(err) => {
                warn!(payload, generation, "link: send failed: {err}");
                let _ = self
                    .events
                    .send(ChannelEvent::Error(format!("send failed: {err}")));
                self.on_close(generation).await;
            }
        }
    }

    async fn on_open(self: &Arc<Self>, generation: u64, stream: WsStream) {
        let (sink, mut reader) = stream.split();
        {
            let mut guard = self.inner.lock().await;
            if guard.generation != generation {
                debug!(generation, "link: discarding socket from superseded attempt");
                return;
            }
            guard.state = ChannelState::Open;
            // No replay of anything sent before the drop; the link starts clean.
            guard.sink = Some(sink);
        }
        self.emit_state(ChannelState::Open);
        info!(endpoint = %self.endpoint, generation, "link: open");

        let channel = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let _ = channel.events.send(ChannelEvent::MessageReceived(text));
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        let _ = channel
                            .events
                            .send(ChannelEvent::Error(format!("receive failed: {err}")));
                        break;
                    }
                }
            }
            channel.on_close(generation).await;
        });
    }

    /// Single close path for every failure class: connect error, read error,
    /// graceful close, write error. Schedules exactly one reconnect.
    ///
    /// Returns a boxed future to break the `connect` -> `on_close` ->
    /// `connect` cycle in the async fn opaque types, which the compiler
    /// cannot otherwise prove `Send`.
    fn on_close<'a>(self: &'a Arc<Self>, generation: u64) -> futures::future::BoxFuture<'a, ()> {
        Box::pin(async move {
            {
                let mut guard = self.inner.lock().await;
                if guard.generation != generation || guard.state == ChannelState::Closed {
                    debug!(generation, "link: stale close ignored");
                    return;
                }
                guard.state = ChannelState::Closed;
                guard.sink = None;
            }
            self.emit_state(ChannelState::Closed);
            info!(
                delay_ms = self.reconnect_delay.as_millis() as u64,
                generation, "link: closed, reconnect scheduled"
            );

            let channel = Arc::clone(self);
            tokio::spawn(async move {
                tokio::time::sleep(channel.reconnect_delay).await;
                channel.connect().await;
            });
        })
    }

    fn emit_state(&self, state: ChannelState) {
        let _ = self.events.send(ChannelEvent::StateChanged(state));
    }
}

#[async_trait]
impl CommandSink for Arc<DriveChannel> {
    async fn send_command(&self, payload: &str) {
        self.send(payload).await;
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
