//! Server discovery for Vislink.
//!
//! Before the client can open its message connection it has to learn
//! where the server is. This crate implements the bounded-time
//! broadcast/listen exchange that answers that question:
//!
//! - [`DiscoveryClient`] — the `Idle → Discovering → Finished` state
//!   machine that broadcasts one query and collects replies.
//! - [`DiscoveryConfig`] — port, broadcast/bind addresses, timeout.
//! - [`packet`] — the query/reply datagram format.
//!
//! Discovery and the message connection use distinct sockets: this
//! exchange is UDP, the connection it leads to is a WebSocket. An
//! empty result is a first-class outcome ("no server present"), not
//! an error — the driver branches on it, typically by falling back to
//! a manually entered address.

mod client;
mod config;
mod error;
pub mod packet;

pub use client::{DiscoveryClient, DiscoveryPhase};
pub use config::{
    DiscoveryConfig, DEFAULT_DISCOVERY_PORT, DEFAULT_TIMEOUT,
};
pub use error::DiscoveryError;
