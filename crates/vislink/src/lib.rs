//! # Vislink
//!
//! Client stack for locating a data-processing server on the local
//! network and exchanging typed, self-describing messages with it.
//!
//! Three layers, re-exported here:
//!
//! - [`vislink_discovery`] — UDP broadcast discovery of server
//!   addresses, bounded by a timeout.
//! - [`vislink_protocol`] — the `{"action": ..., "data": ...}` wire
//!   envelope, the message variants, and the registry/codec that maps
//!   between them.
//! - [`vislink_client`] — the connection manager and its event stream.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vislink::prelude::*;
//!
//! # async fn run() -> Result<(), VislinkError> {
//! // Registration phase: declare every variant before connecting.
//! let mut registry = MessageRegistry::new();
//! registry.register::<Hello>();
//! registry.register::<LoadDataset>();
//! registry.register::<LoadDatasetResult>();
//! registry.register::<Response>();
//! let codec = MessageCodec::new(Arc::new(registry));
//!
//! // Find a server, connect, request a dataset.
//! let discovery = DiscoveryClient::new(DiscoveryConfig::default());
//! let addrs = discovery.discover(true).await?;
//! let (manager, mut events) = ConnectionManager::new(codec);
//! if let Some(addr) = addrs.first() {
//!     manager.connect(*addr).await?;
//!     manager
//!         .send(&Message::LoadDataset(LoadDataset::new("/data/a.csv")))
//!         .await?;
//! }
//! while let Some(event) = events.recv().await {
//!     if let ClientEvent::Message(Message::LoadDatasetResult(result)) =
//!         event
//!     {
//!         println!("{} rows", result.data.row_count());
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::VislinkError;

pub mod prelude {
    //! The working set for a typical driver.

    pub use vislink_client::{
        ClientError, ClientEvent, ConnectionManager, ConnectionState,
    };
    pub use vislink_discovery::{
        DiscoveryClient, DiscoveryConfig, DiscoveryError, DiscoveryPhase,
    };
    pub use vislink_protocol::{
        Data, Hello, LoadDataset, LoadDatasetResult, Message,
        MessageBody, MessageCodec, MessageRegistry, ProtocolError,
        Response,
    };

    pub use crate::VislinkError;
}
