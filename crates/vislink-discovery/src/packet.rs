//! Discovery datagram format.
//!
//! The exchange is two datagrams. The client broadcasts a fixed query;
//! any listening server answers with a reply naming the TCP port its
//! message protocol listens on. The responder's IP comes from the
//! reply datagram's source address, so the reply body only needs the
//! port.
//!
//! Both directions carry a magic prefix so unrelated UDP traffic on
//! the discovery port is ignored instead of misparsed.

use serde::{Deserialize, Serialize};

/// Magic bytes identifying Vislink discovery datagrams.
pub const MAGIC: &[u8; 4] = b"VLNK";

/// The broadcast query: magic plus a query marker byte.
pub const QUERY: &[u8; 5] = b"VLNK?";

/// Largest datagram we accept. Anything longer is not ours.
pub const MAX_PACKET_SIZE: usize = 512;

/// A server's answer to the broadcast query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReply {
    /// TCP port of the responder's message-protocol endpoint.
    pub port: u16,
}

impl DiscoveryReply {
    /// Serializes the reply with its magic prefix.
    ///
    /// `None` only if serde_json fails, which a single `u16` field
    /// never does in practice.
    pub fn to_bytes(self) -> Option<Vec<u8>> {
        let body = serde_json::to_vec(&self).ok()?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + body.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend(body);
        Some(bytes)
    }

    /// Parses a datagram, validating the magic prefix.
    ///
    /// Returns `None` for foreign traffic: wrong magic, truncated, or
    /// an unparseable body. Callers drop those silently.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let body = bytes.strip_prefix(MAGIC)?;
        serde_json::from_slice(body).ok()
    }
}

/// Whether a datagram is the client's broadcast query.
///
/// Servers use this on their discovery listener; the client uses it to
/// skip its own query if it ever loops back.
pub fn is_query(bytes: &[u8]) -> bool {
    bytes == QUERY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_round_trip() {
        let reply = DiscoveryReply { port: 8080 };
        let bytes = reply.to_bytes().unwrap();
        assert_eq!(DiscoveryReply::from_bytes(&bytes), Some(reply));
    }

    #[test]
    fn test_reply_bytes_start_with_magic() {
        let bytes = DiscoveryReply { port: 1 }.to_bytes().unwrap();
        assert!(bytes.starts_with(MAGIC));
    }

    #[test]
    fn test_from_bytes_rejects_wrong_magic() {
        assert_eq!(DiscoveryReply::from_bytes(b"NOPE{\"port\":1}"), None);
    }

    #[test]
    fn test_from_bytes_rejects_truncated() {
        assert_eq!(DiscoveryReply::from_bytes(b"VL"), None);
        assert_eq!(DiscoveryReply::from_bytes(b""), None);
    }

    #[test]
    fn test_from_bytes_rejects_garbage_body() {
        assert_eq!(DiscoveryReply::from_bytes(b"VLNKgarbage"), None);
    }

    #[test]
    fn test_query_is_recognized() {
        assert!(is_query(QUERY));
        assert!(!is_query(b"VLNK!"));
        assert!(!is_query(&DiscoveryReply { port: 1 }.to_bytes().unwrap()));
    }
}
