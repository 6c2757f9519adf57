//! Error types for the protocol layer.
//!
//! Each crate in Vislink defines its own error enum. This keeps errors
//! specific and meaningful — when you see a `ProtocolError`, you know
//! the problem is in the wire envelope or a payload, not in networking.

/// Errors that can occur while encoding or decoding frames.
///
/// The three decode variants mirror the three decode stages: first the
/// outer envelope is parsed (`MalformedEnvelope`), then the action is
/// resolved against the registry (`UnknownAction`), and only then is
/// the payload deserialized and validated (`MalformedPayload`).
///
/// All decode failures are non-fatal by contract: the connection layer
/// logs them and drops the frame, it never closes the connection over
/// one bad frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not a valid `{"action": ..., "data": ...}` envelope.
    ///
    /// Covers invalid JSON, a missing or non-string `action` field,
    /// and a missing `data` field.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The envelope parsed, but its action has no registered variant.
    ///
    /// The frame never becomes a typed message; the action string is
    /// carried for logging.
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// The action is registered, but `data` does not match the
    /// variant's payload schema.
    ///
    /// `detail` names the offending field — either serde's own
    /// "missing field `path`" style message, or a validation message
    /// such as jagged `values` rows in a dataset result.
    #[error("malformed payload for `{action}`: {detail}")]
    MalformedPayload {
        /// The action whose payload failed to decode.
        action: &'static str,
        /// What was wrong, naming the field.
        detail: String,
    },

    /// Serialization of an outbound message failed.
    ///
    /// Well-formed in-memory messages always encode; this exists so
    /// the serde_json failure path still surfaces as a `Result`
    /// instead of a panic.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}
