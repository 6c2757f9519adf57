//! Envelope codec: wraps and unwraps `{"action": ..., "data": ...}`.
//!
//! The codec is stateless. It holds a shared handle to the registry
//! built during the driver's registration phase and does three things
//! on decode, in order: parse the envelope, resolve the action, run
//! the variant's decoder. Each stage has its own [`ProtocolError`]
//! variant, so a failed frame tells you exactly how far it got.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::MessageRegistry;
use crate::types::Message;
use crate::ProtocolError;

/// The outer wire structure common to every frame, both directions.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    action: String,
    data: serde_json::Value,
}

/// Encodes typed messages to frames and decodes frames back.
///
/// Cheap to clone — it shares the registry behind an `Arc`. The
/// connection layer clones one into its receive loop; the driver keeps
/// another for encoding outbound requests.
#[derive(Clone)]
pub struct MessageCodec {
    registry: Arc<MessageRegistry>,
}

impl MessageCodec {
    /// Creates a codec over a fully populated registry.
    ///
    /// Registration must be finished before this point; the `Arc`
    /// makes the registry read-only from here on.
    pub fn new(registry: Arc<MessageRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this codec resolves actions against.
    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Serializes a message into its wire frame.
    ///
    /// `Hello` produces `{"action":"hello","data":{}}`. Encoding a
    /// well-formed in-memory message does not fail in practice; the
    /// `Result` exists because serde_json's failure path has to go
    /// somewhere other than a panic.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode(&self, message: &Message) -> Result<String, ProtocolError> {
        let envelope = Envelope {
            action: message.action().to_string(),
            data: message.payload_value().map_err(ProtocolError::Encode)?,
        };
        serde_json::to_string(&envelope).map_err(ProtocolError::Encode)
    }

    /// Decodes a raw frame into a typed [`Message`].
    ///
    /// # Errors
    /// - [`ProtocolError::MalformedEnvelope`] — not valid JSON, or not
    ///   the `{"action": <string>, "data": <object>}` shape.
    /// - [`ProtocolError::UnknownAction`] — no variant registered for
    ///   the frame's action.
    /// - [`ProtocolError::MalformedPayload`] — `data` does not match
    ///   the variant's schema, or fails its validation hook.
    pub fn decode(&self, raw: &str) -> Result<Message, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(raw)
            .map_err(ProtocolError::MalformedEnvelope)?;

        if !envelope.data.is_object() {
            // Structurally part of the envelope contract, so this is
            // an envelope error, not a payload error.
            return Err(ProtocolError::MalformedEnvelope(
                serde::de::Error::custom("`data` is not an object"),
            ));
        }

        let decode = self
            .registry
            .resolve(&envelope.action)
            .ok_or_else(|| {
                ProtocolError::UnknownAction(envelope.action.clone())
            })?;

        decode(envelope.data)
    }
}

impl std::fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCodec")
            .field("registry", &self.registry)
            .finish()
    }
}
