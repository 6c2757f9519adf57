//! The action → decoder registry.
//!
//! The registry is the runtime dispatch table that turns an action
//! string into a typed [`Message`]: one decode function per registered
//! variant. It is an explicit object the application driver constructs
//! and owns — not process-wide state — and it is populated in a
//! one-time registration phase before any frame is decoded.
//!
//! That phasing is enforced by the API shape: [`register`] takes
//! `&mut self`, so once the driver wraps the registry in an `Arc` and
//! hands it to the codec, no further registration can happen. There is
//! no locking here because there is nothing left to race.
//!
//! [`register`]: MessageRegistry::register

use std::collections::HashMap;

use crate::types::{Message, MessageBody};
use crate::ProtocolError;

/// Decodes the `data` half of an envelope into a typed [`Message`].
///
/// Boxed because each registered variant contributes its own
/// monomorphized closure; the registry stores them uniformly.
pub type DecodeFn = Box<
    dyn Fn(serde_json::Value) -> Result<Message, ProtocolError>
        + Send
        + Sync,
>;

/// Mapping from action string to the decode function for that variant.
///
/// Duplicate registration overwrites the prior entry (last write wins);
/// this allows a driver to rebind an action during setup without a
/// remove step. A frame whose action arrives before its variant is
/// registered is dropped by the codec as [`ProtocolError::UnknownAction`],
/// so the registry must be fully populated before the connection starts
/// receiving.
#[derive(Default)]
pub struct MessageRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl MessageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers variant `B` under its own [`MessageBody::ACTION`].
    ///
    /// The stored decode function deserializes `data` into `B`, runs
    /// `B::validate`, and wraps the body into [`Message`]. Registering
    /// the same action twice replaces the earlier decoder.
    pub fn register<B: MessageBody + 'static>(&mut self) {
        self.decoders.insert(
            B::ACTION,
            Box::new(|data| {
                let body: B =
                    serde_json::from_value(data).map_err(|e| {
                        ProtocolError::MalformedPayload {
                            action: B::ACTION,
                            detail: e.to_string(),
                        }
                    })?;
                body.validate()?;
                Ok(body.into())
            }),
        );
    }

    /// Looks up the decoder for an action. `None` means unregistered.
    pub fn resolve(&self, action: &str) -> Option<&DecodeFn> {
        self.decoders.get(action)
    }

    /// Whether a decoder is registered for `action`.
    pub fn contains(&self, action: &str) -> bool {
        self.decoders.contains_key(action)
    }

    /// The registered actions, in no particular order.
    pub fn actions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl std::fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRegistry")
            .field("actions", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
