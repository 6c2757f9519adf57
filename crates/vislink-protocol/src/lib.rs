//! Wire protocol for Vislink.
//!
//! This crate defines the "language" the client and the data server
//! speak:
//!
//! - **Types** ([`Message`], [`Data`], the variant bodies) — the
//!   message structures that travel on the wire.
//! - **Registry** ([`MessageRegistry`]) — the action → decoder table
//!   the driver populates before any frame is received.
//! - **Codec** ([`MessageCodec`]) — wraps and unwraps the
//!   `{"action": ..., "data": ...}` envelope.
//! - **Errors** ([`ProtocolError`]) — what can go wrong per frame.
//!
//! # Architecture
//!
//! The protocol layer sits between the connection (raw text frames)
//! and the application driver (typed messages). It knows nothing about
//! sockets or discovery — it only maps frames to variants and back.
//!
//! ```text
//! Connection (frames) → Codec + Registry (Message) → Driver
//! ```
//!
//! # Registration phase
//!
//! [`MessageRegistry::register`] takes `&mut self`; wrapping the
//! registry in an `Arc` for [`MessageCodec::new`] ends the
//! registration phase. Frames whose action arrives unregistered are
//! rejected as [`ProtocolError::UnknownAction`] and dropped upstream.

mod codec;
mod error;
mod registry;
mod types;

pub use codec::MessageCodec;
pub use error::ProtocolError;
pub use registry::{DecodeFn, MessageRegistry};
pub use types::{
    Data, Hello, LoadDataset, LoadDatasetResult, Message, MessageBody,
    Response,
};
