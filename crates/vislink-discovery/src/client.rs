//! The discovery state machine.
//!
//! One client runs at most one discovery window at a time:
//!
//! ```text
//! Idle → Discovering → Finished(addresses)
//! ```
//!
//! A window either short-circuits on the first qualifying reply (when
//! asked to) or runs until its timeout and finishes with whatever was
//! collected — possibly nothing. Starting again from `Finished` opens
//! a fresh window; starting while `Discovering` is rejected.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::packet::{self, DiscoveryReply, MAX_PACKET_SIZE, QUERY};
use crate::{DiscoveryConfig, DiscoveryError};

/// Where a [`DiscoveryClient`] currently is in its state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryPhase {
    /// No discovery has run yet.
    Idle,
    /// A window is open; replies are being collected.
    Discovering,
    /// The last window's result, in arrival order. Empty means no
    /// server answered in time.
    Finished(Vec<SocketAddr>),
}

/// Finds message-protocol servers on the local network.
///
/// [`start`](Self::start) broadcasts one query datagram and listens
/// for replies on the same socket for a bounded window. Each distinct
/// responder contributes one address, in arrival order. The result is
/// delivered exactly once per window, through the returned receiver.
///
/// The client is `Clone`-free by design; share it behind an `Arc` if
/// several tasks need to observe [`phase`](Self::phase).
pub struct DiscoveryClient {
    config: DiscoveryConfig,
    phase: Arc<Mutex<DiscoveryPhase>>,
}

impl DiscoveryClient {
    /// Creates a client in the `Idle` phase.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            phase: Arc::new(Mutex::new(DiscoveryPhase::Idle)),
        }
    }

    /// The current phase of the state machine.
    pub fn phase(&self) -> DiscoveryPhase {
        lock_phase(&self.phase).clone()
    }

    /// Opens a discovery window.
    ///
    /// Binds the query socket, broadcasts the query, and spawns the
    /// listener task. The returned receiver resolves exactly once,
    /// when the window closes: on the first reply if
    /// `return_on_first`, otherwise when the timeout elapses. An empty
    /// list is the normal "no server present" outcome.
    ///
    /// # Errors
    /// - [`DiscoveryError::AlreadyDiscovering`] if a window is open.
    /// - [`DiscoveryError::Socket`] if binding or broadcasting fails;
    ///   the client falls back to `Idle` and can be started again.
    pub async fn start(
        &self,
        return_on_first: bool,
    ) -> Result<oneshot::Receiver<Vec<SocketAddr>>, DiscoveryError> {
        {
            let mut phase = lock_phase(&self.phase);
            if *phase == DiscoveryPhase::Discovering {
                return Err(DiscoveryError::AlreadyDiscovering);
            }
            *phase = DiscoveryPhase::Discovering;
        }

        match self.broadcast_query().await {
            Ok(socket) => {
                let (tx, rx) = oneshot::channel();
                let phase = Arc::clone(&self.phase);
                let timeout = self.config.timeout;
                tokio::spawn(async move {
                    let found =
                        collect_replies(socket, timeout, return_on_first)
                            .await;
                    tracing::info!(
                        count = found.len(),
                        "discovery finished"
                    );
                    *lock_phase(&phase) =
                        DiscoveryPhase::Finished(found.clone());
                    // Receiver may have been dropped; nothing to do then.
                    let _ = tx.send(found);
                });
                Ok(rx)
            }
            Err(e) => {
                *lock_phase(&self.phase) = DiscoveryPhase::Idle;
                Err(DiscoveryError::Socket(e))
            }
        }
    }

    /// Runs one discovery window to completion.
    ///
    /// Convenience over [`start`](Self::start) for drivers that have
    /// nothing else to do while waiting.
    pub async fn discover(
        &self,
        return_on_first: bool,
    ) -> Result<Vec<SocketAddr>, DiscoveryError> {
        let rx = self.start(return_on_first).await?;
        // The sender is only dropped if the listener task is aborted
        // with the runtime; treat that like an empty window.
        Ok(rx.await.unwrap_or_default())
    }

    /// Binds the query socket and sends the broadcast query.
    async fn broadcast_query(&self) -> std::io::Result<UdpSocket> {
        let socket =
            UdpSocket::bind((self.config.bind_addr, 0)).await?;
        socket.set_broadcast(true)?;
        let dest = (self.config.broadcast_addr, self.config.port);
        socket.send_to(QUERY, dest).await?;
        tracing::debug!(
            port = self.config.port,
            broadcast = %self.config.broadcast_addr,
            "discovery query broadcast"
        );
        Ok(socket)
    }
}

/// Listens on the query socket until the window closes.
async fn collect_replies(
    socket: UdpSocket,
    timeout: std::time::Duration,
    return_on_first: bool,
) -> Vec<SocketAddr> {
    let deadline = Instant::now() + timeout;
    let mut found = Vec::new();
    let mut responders: HashSet<SocketAddr> = HashSet::new();
    let mut buf = [0u8; MAX_PACKET_SIZE];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        let received =
            tokio::time::timeout(remaining, socket.recv_from(&mut buf))
                .await;
        match received {
            // Window elapsed.
            Err(_) => break,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "discovery recv failed");
            }
            Ok(Ok((len, src))) => {
                let datagram = &buf[..len];
                if packet::is_query(datagram) {
                    // Our own broadcast looped back.
                    continue;
                }
                let Some(reply) = DiscoveryReply::from_bytes(datagram)
                else {
                    tracing::debug!(
                        %src,
                        "ignoring datagram without discovery magic"
                    );
                    continue;
                };
                if !responders.insert(src) {
                    // Duplicate reply from a responder we already have.
                    continue;
                }
                let addr = SocketAddr::new(src.ip(), reply.port);
                tracing::info!(%addr, "discovered server");
                found.push(addr);
                if return_on_first {
                    break;
                }
            }
        }
    }

    found
}

/// Locks the phase mutex, recovering from poisoning.
///
/// The phase is a plain enum; a panic mid-update cannot leave it in a
/// torn state, so the poisoned value is safe to keep using.
fn lock_phase(
    phase: &Mutex<DiscoveryPhase>,
) -> std::sync::MutexGuard<'_, DiscoveryPhase> {
    phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
