//! # Bridge Runtime
//!
//! Configuration, logging, and session bootstrap for the sandbox bridge.
//!
//! ## Overview
//!
//! [`start_session`] wires the two halves of the bridge together: it builds
//! the in-process message channel, spawns the virtual server on the
//! sandboxed endpoint, and hands back a [`BridgeSession`] owning the
//! host-side worker proxy. Everything the session needs is carried in a
//! validated [`BridgeConfig`]; there is no ambient global state, the session
//! value is the context.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_runtime::{start_session, BridgeConfig};
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .page_origin("https://app.example")
//!     .handler(Arc::new(MyApp))
//!     .build()?;
//!
//! let session = start_session(config)?;
//! let resolver = session.resolver();
//! // ... issue requests through session.proxy() ...
//! session.shutdown().await;
//! ```

pub mod config;
pub mod error;
pub mod logging;

use std::sync::Arc;

use bridge_host::{BlobStore, BridgeSession, WorkerProxy};
use bridge_server::VirtualServer;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::{Result, RuntimeError};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};

/// Start one bridge session from a validated configuration.
///
/// Spawns the virtual server task, so this must run inside a Tokio runtime.
/// The session is the only handle to the wiring; dropping it without
/// [`BridgeSession::shutdown`] leaves the server task running until the
/// transport closes.
pub fn start_session(config: BridgeConfig) -> Result<BridgeSession> {
    let BridgeConfig {
        page_origin,
        handler,
    } = config;

    let (host_end, sandbox_end) = bridge_transport::channel();

    let server = VirtualServer::new(sandbox_end, handler);
    let server_task = tokio::spawn(server.run());

    let cancel = CancellationToken::new();
    let proxy = WorkerProxy::new(host_end, cancel.clone());
    let blobs = Arc::new(BlobStore::new());

    info!(origin = %page_origin, "Bridge session started");
    Ok(BridgeSession::new(
        page_origin,
        proxy,
        blobs,
        cancel,
        server_task,
    ))
}
