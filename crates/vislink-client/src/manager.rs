//! The connection manager: connect, send, receive loop, disconnect.
//!
//! One manager owns at most one outbound WebSocket connection:
//!
//! ```text
//! Disconnected → Connecting → Connected → Disconnected
//!                     └──────── connect failure ───────┘
//! ```
//!
//! The receive loop runs as a spawned task for the lifetime of the
//! `Connected` state and reports back through the event channel. A
//! malformed frame is logged and dropped there — it never tears the
//! connection down and never reaches the driver as a typed message.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use vislink_protocol::{Message, MessageCodec};

use crate::{ClientError, ClientEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;

/// Where the manager is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection; `send` fails, `connect` is valid.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// The session is live; the receive loop is running.
    Connected,
}

/// State shared between the manager handle and its receive loop.
struct Inner {
    state: ConnectionState,
    sink: Option<WsSink>,
    /// Bumped on every successful connect. A receive loop only runs
    /// its disconnect epilogue if its session is still the current
    /// one, so a stale loop can't tear down a newer session.
    session: u64,
}

/// Owns the single outbound connection to the data server.
///
/// Constructed together with its event receiver; the driver consumes
/// [`ClientEvent`]s from the receiver while calling `connect`/`send`
/// on the manager. All notifications are asynchronous — nothing here
/// blocks the caller waiting for the peer.
pub struct ConnectionManager {
    codec: MessageCodec,
    inner: Arc<Mutex<Inner>>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl ConnectionManager {
    /// Creates a disconnected manager and its event receiver.
    ///
    /// The codec's registry must already be fully populated: frames
    /// received for actions registered later would be dropped as
    /// unknown.
    pub fn new(
        codec: MessageCodec,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            codec,
            inner: Arc::new(Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                sink: None,
                session: 0,
            })),
            events,
        };
        (manager, receiver)
    }

    /// The current lifecycle state.
    pub async fn state(&self) -> ConnectionState {
        self.inner.lock().await.state
    }

    /// Connects to a discovered server address.
    pub async fn connect(
        &self,
        addr: SocketAddr,
    ) -> Result<(), ClientError> {
        self.connect_url(&format!("ws://{addr}")).await
    }

    /// Connects to a WebSocket URL.
    ///
    /// A no-op when already `Connecting` or `Connected` — at most one
    /// underlying connect attempt and at most one
    /// [`ClientEvent::Connected`] per session, no matter how often
    /// this is called. On success the receive loop is spawned and
    /// `Connected` is emitted. On failure the manager returns to
    /// `Disconnected` and the error goes to the caller; there is no
    /// automatic retry.
    ///
    /// # Errors
    /// [`ClientError::Connect`] if the transport-level connect fails.
    pub async fn connect_url(&self, url: &str) -> Result<(), ClientError> {
        {
            let mut inner = self.inner.lock().await;
            match inner.state {
                ConnectionState::Disconnected => {
                    inner.state = ConnectionState::Connecting;
                }
                state => {
                    tracing::debug!(
                        ?state,
                        "connect ignored; already initialized"
                    );
                    return Ok(());
                }
            }
        }

        let ws = match tokio_tungstenite::connect_async(url).await {
            Ok((ws, _response)) => ws,
            Err(e) => {
                self.inner.lock().await.state =
                    ConnectionState::Disconnected;
                tracing::warn!(url, error = %e, "connect failed");
                return Err(ClientError::Connect(e));
            }
        };

        let (sink, stream) = ws.split();
        let session = {
            let mut inner = self.inner.lock().await;
            inner.sink = Some(sink);
            inner.state = ConnectionState::Connected;
            inner.session += 1;
            inner.session
        };
        tracing::info!(url, "connected");
        let _ = self.events.send(ClientEvent::Connected);

        tokio::spawn(receive_loop(
            stream,
            self.codec.clone(),
            self.events.clone(),
            Arc::clone(&self.inner),
            session,
        ));

        Ok(())
    }

    /// Encodes a message and writes it as one text frame.
    ///
    /// # Errors
    /// - [`ClientError::NotConnected`] unless `Connected`.
    /// - [`ClientError::Protocol`] if encoding fails.
    /// - [`ClientError::Send`] on a transport write failure.
    pub async fn send(&self, message: &Message) -> Result<(), ClientError> {
        let frame = self.codec.encode(message)?;

        let mut inner = self.inner.lock().await;
        if inner.state != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        let Some(sink) = inner.sink.as_mut() else {
            return Err(ClientError::NotConnected);
        };

        tracing::debug!(action = message.action(), "sending frame");
        sink.send(WsMessage::Text(frame.into()))
            .await
            .map_err(ClientError::Send)
    }

    /// Closes the connection if one is open. Idempotent.
    ///
    /// Emits [`ClientEvent::Disconnected`] for the session being
    /// closed; the receive loop's own epilogue then stands down.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state != ConnectionState::Connected {
            return;
        }
        inner.state = ConnectionState::Disconnected;
        if let Some(mut sink) = inner.sink.take() {
            if let Err(e) = sink.close().await {
                tracing::debug!(error = %e, "close frame not delivered");
            }
        }
        tracing::info!("disconnected by client");
        let _ = self.events.send(ClientEvent::Disconnected {
            reason: "disconnected by client".into(),
        });
    }
}

/// Runs for the lifetime of one `Connected` session.
///
/// Every inbound frame emits [`ClientEvent::RawMessage`] first; a
/// frame that decodes also emits [`ClientEvent::Message`]. Decode
/// failures are logged and dropped. The loop ends on peer close or
/// transport error, and only then does the session transition to
/// `Disconnected`.
async fn receive_loop(
    mut stream: SplitStream<WsStream>,
    codec: MessageCodec,
    events: mpsc::UnboundedSender<ClientEvent>,
    inner: Arc<Mutex<Inner>>,
    session: u64,
) {
    let reason = loop {
        match stream.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                deliver_frame(text.to_string(), &codec, &events);
            }
            Some(Ok(WsMessage::Binary(data))) => {
                // The protocol is textual; a binary frame still gets
                // surfaced raw so corruption is observable.
                let text =
                    String::from_utf8_lossy(&data).into_owned();
                deliver_frame(text, &codec, &events);
            }
            Some(Ok(WsMessage::Close(_))) | None => {
                break "closed by server".to_string();
            }
            Some(Ok(_)) => continue, // ping/pong/frame
            Some(Err(e)) => {
                break format!("transport error: {e}");
            }
        }
    };

    let mut inner = inner.lock().await;
    // A stale loop (explicit disconnect, or a newer session already
    // connected) must not emit a second Disconnected.
    if inner.session == session
        && inner.state == ConnectionState::Connected
    {
        inner.state = ConnectionState::Disconnected;
        inner.sink = None;
        tracing::info!(%reason, "connection ended");
        let _ = events.send(ClientEvent::Disconnected { reason });
    }
}

/// Emits the raw frame, then the decoded message if decoding works.
fn deliver_frame(
    raw: String,
    codec: &MessageCodec,
    events: &mpsc::UnboundedSender<ClientEvent>,
) {
    let _ = events.send(ClientEvent::RawMessage(raw.clone()));
    match codec.decode(&raw) {
        Ok(message) => {
            tracing::debug!(action = message.action(), "frame decoded");
            let _ = events.send(ClientEvent::Message(message));
        }
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable frame");
        }
    }
}
