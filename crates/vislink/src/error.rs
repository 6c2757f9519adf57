//! Unified error type for the Vislink client stack.

use vislink_client::ClientError;
use vislink_discovery::DiscoveryError;
use vislink_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `vislink` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From`
/// impls, so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum VislinkError {
    /// A frame-level error (envelope, action, payload, encode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A discovery error (state-machine misuse, socket failure).
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A connection error (connect, send, not connected).
    #[error(transparent)]
    Client(#[from] ClientError),
}
