//! Umbrella crate for the virtual network bridge.
//!
//! Applications running inside an isolated, sandboxed execution context have
//! no real network or filesystem access. This workspace lets the surrounding
//! host page keep issuing ordinary network-shaped requests: same-origin HTTP
//! fetches are redirected to an in-process virtual server living on the
//! sandboxed side of a message channel, while foreign-origin and non-http
//! resources pass through to the real network untouched.
//!
//! Most consumers only need two calls:
//!
//! ```ignore
//! use sandbox_bridge::{BridgeConfig, init_logging, start_session, LoggingConfig};
//! use std::sync::Arc;
//!
//! init_logging(LoggingConfig::default())?;
//!
//! let config = BridgeConfig::builder()
//!     .page_origin("https://host.example")
//!     .handler(Arc::new(MyApplication::new()))
//!     .build()?;
//!
//! let session = start_session(config)?;
//! let resolver = session.resolver();
//! let src = resolver.resolve(Some("https://host.example/app/data/img.png")).await?;
//! ```

pub use bridge_envelope::{
    ClonableError, CodecError, Headers, Method, RequestEnvelope, ResponseEnvelope,
    TransportMessage,
};
pub use bridge_host::{BlobStore, BridgeSession, HostError, MediaResolver, WorkerProxy};
pub use bridge_runtime::{
    init_logging, start_session, BridgeConfig, LogFormat, LogLevel, LoggingConfig, RuntimeError,
};
pub use bridge_server::{RequestHandler, StreamWriter, VirtualServer};
pub use bridge_transport::{channel, Endpoint, FrameSender, TransportError};
