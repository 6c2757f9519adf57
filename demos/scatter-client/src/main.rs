//! Scatter-client: a minimal driver for a Vislink data server.
//!
//! Discovers a server on the local network, connects, requests a
//! dataset, and prints a summary of the result. Everything past the
//! decoded `Data` (plotting, GPU upload) belongs to a renderer, not
//! to this driver.
//!
//! ```text
//! scatter-client [DATASET_PATH] [FALLBACK_ADDR]
//! ```
//!
//! `FALLBACK_ADDR` (host:port) is used when discovery times out with
//! no server found.

use std::net::SocketAddr;
use std::sync::Arc;

use vislink::prelude::*;

/// Registration phase: every variant this driver understands, before
/// the connection starts receiving.
fn build_codec() -> MessageCodec {
    let mut registry = MessageRegistry::new();
    registry.register::<Hello>();
    registry.register::<LoadDataset>();
    registry.register::<LoadDatasetResult>();
    registry.register::<Response>();
    MessageCodec::new(Arc::new(registry))
}

/// Picks the server address: first discovery hit, or the fallback.
async fn locate_server(
    fallback: Option<SocketAddr>,
) -> Result<Option<SocketAddr>, VislinkError> {
    let discovery = DiscoveryClient::new(DiscoveryConfig::default());
    let addrs = discovery.discover(true).await?;

    match addrs.first() {
        Some(addr) => Ok(Some(*addr)),
        None => {
            tracing::warn!("no server answered the discovery query");
            Ok(fallback)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), VislinkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let dataset_path = args
        .next()
        .unwrap_or_else(|| "/data/example.csv".to_string());
    let fallback: Option<SocketAddr> =
        args.next().and_then(|raw| raw.parse().ok());

    let Some(addr) = locate_server(fallback).await? else {
        tracing::error!(
            "no server found and no fallback address given; \
             pass one as host:port"
        );
        std::process::exit(1);
    };
    tracing::info!(%addr, "using server");

    let (manager, mut events) = ConnectionManager::new(build_codec());
    manager.connect(addr).await?;

    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Connected => {
                tracing::info!("now you can send messages");
                manager.send(&Message::Hello(Hello {})).await?;
                manager
                    .send(&Message::LoadDataset(LoadDataset::new(
                        dataset_path.clone(),
                    )))
                    .await?;
            }
            ClientEvent::RawMessage(raw) => {
                tracing::debug!(%raw, "raw frame");
            }
            ClientEvent::Message(Message::Hello(_)) => {
                tracing::info!("server said hello");
            }
            ClientEvent::Message(Message::LoadDatasetResult(result)) => {
                print_summary(&result.data);
                manager.disconnect().await;
            }
            ClientEvent::Message(Message::Response(response)) => {
                tracing::info!(fields = ?response.fields, "generic response");
            }
            ClientEvent::Message(other) => {
                tracing::debug!(action = other.action(), "unhandled");
            }
            ClientEvent::Disconnected { reason } => {
                tracing::info!(%reason, "session ended");
                break;
            }
        }
    }

    Ok(())
}

/// The consumer boundary: a renderer would take `Data` from here.
fn print_summary(data: &Data) {
    println!("dataset: {} rows", data.row_count());
    for (name, kind) in data.columns.iter().zip(&data.columns_types) {
        println!("  column {name} ({kind})");
    }
}
