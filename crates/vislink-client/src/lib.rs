//! Connection lifecycle for the Vislink client.
//!
//! Provides [`ConnectionManager`], which owns the single outbound
//! WebSocket connection to a data server, and [`ClientEvent`], the
//! asynchronous notification stream the application driver consumes:
//!
//! ```text
//! connect → Connected
//! frame   → RawMessage (always) → Message (if it decodes)
//! close   → Disconnected
//! ```
//!
//! The WebSocket is the message-protocol socket; finding the address
//! to connect to is `vislink-discovery`'s job and happens on a
//! separate UDP socket beforehand.

mod error;
mod event;
mod manager;

pub use error::ClientError;
pub use event::ClientEvent;
pub use manager::{ConnectionManager, ConnectionState};
