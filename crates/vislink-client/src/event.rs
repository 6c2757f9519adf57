//! Events emitted by the connection manager.

use vislink_protocol::Message;

/// Notifications delivered to the driver over an unbounded channel.
///
/// Delivery order is the receive order on the wire: for every inbound
/// frame, [`RawMessage`](Self::RawMessage) is emitted first,
/// unconditionally, and [`Message`](Self::Message) follows only if the
/// frame decoded. Events of one session never interleave out of order;
/// no ordering is promised against discovery events, which come from a
/// different component entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The connection was established; `send` is now valid.
    Connected,

    /// An inbound frame, exactly as it arrived on the wire, before
    /// any decoding. Fires for every frame — including ones that turn
    /// out to be malformed. Meant for observability and debugging.
    RawMessage(String),

    /// A frame that decoded into a registered variant.
    Message(Message),

    /// The session ended: peer close, transport error, or an explicit
    /// `disconnect`. Emitted exactly once per session.
    Disconnected {
        /// Human-readable cause, for logs and UI.
        reason: String,
    },
}
