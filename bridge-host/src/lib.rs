//! # Host-Side Bridge
//!
//! The host page's half of the virtual network bridge:
//!
//! - [`WorkerProxy`] - issues request envelopes over the message channel and
//!   pairs each reply with its correlation id
//! - [`BridgeSession`] - the per-sandbox-session context owning the proxy;
//!   its absence (a resolver constructed without one) is the only signal the
//!   rest of the system uses for "not running sandboxed"
//! - [`MediaResolver`] - decides per resource URL whether the real network
//!   or the sandbox serves it, and turns sandbox-served binary payloads into
//!   locally addressable [`BlobStore`] handles
//!
//! All operations are asynchronous; callers suspend at the request-issuing
//! call and resume when the matching correlation id arrives. The bridge
//! imposes no timeout of its own - bounded waits belong to the caller.

pub mod blob;
pub mod error;
pub mod proxy;
pub mod resolver;
pub mod session;

pub use blob::{Blob, BlobStore};
pub use error::{HostError, Result};
pub use proxy::{StreamHandle, WorkerProxy};
pub use resolver::MediaResolver;
pub use session::BridgeSession;
