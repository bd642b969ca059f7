//! # Virtual Server (sandboxed side)
//!
//! The isolated half of the bridge. A [`VirtualServer`] owns the sandboxed
//! endpoint of the message channel, decodes incoming request frames and
//! dispatches them to the application's [`RequestHandler`] - the sandboxed
//! app's own routing logic, opaque to the bridge.
//!
//! Per request the bridge guarantees:
//!
//! - at-most-once dispatch per correlation id
//! - exactly one terminal outcome sent back: a response envelope or a
//!   clonable error, never both, never neither
//! - handler panics are intercepted and cross the boundary as
//!   `NonStandardThrow` errors instead of killing the server loop
//!
//! Connection-oriented exchanges go through [`StreamWriter`] instead: the
//! handler appends frames as it produces them and the entry transitions
//! `open -> (closed | errored)` exactly once.

pub mod error;
pub mod handler;
pub mod server;
pub mod stream;

pub use error::{ServerError, Result};
pub use handler::{BoxError, RequestHandler};
pub use server::VirtualServer;
pub use stream::StreamWriter;
