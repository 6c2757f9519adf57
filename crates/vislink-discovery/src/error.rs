//! Error types for the discovery layer.

/// Errors that can occur while discovering servers.
///
/// A discovery window that ends without replies is *not* an error —
/// it finishes with an empty address list, and the caller decides what
/// to do about it (typically fall back to a manually entered address).
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// `start` was called while a discovery window was already open.
    ///
    /// Only one discovery runs per client instance at a time; a second
    /// start is rejected rather than silently opening a concurrent
    /// window.
    #[error("a discovery window is already open")]
    AlreadyDiscovering,

    /// Binding the UDP socket or sending the broadcast query failed.
    #[error("discovery socket error: {0}")]
    Socket(#[source] std::io::Error),
}
