//! Error types for the connection layer.

use vislink_protocol::ProtocolError;

use tokio_tungstenite::tungstenite;

/// Errors surfaced to the caller by the connection manager.
///
/// Frame-level decode failures are *not* here: those are logged and
/// dropped inside the receive loop and never reach the caller as
/// errors (see the resilience contract on
/// [`ConnectionManager`](crate::ConnectionManager)).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// `send` was called while not connected.
    #[error("not connected")]
    NotConnected,

    /// Opening the connection failed (refused, unreachable, timeout).
    ///
    /// The manager is back in `Disconnected`; retrying is the
    /// caller's decision, this layer never reconnects on its own.
    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),

    /// A transport-level write failure while sending a frame.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// Encoding an outbound message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
