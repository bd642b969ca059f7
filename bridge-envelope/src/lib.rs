//! # Envelope Types & Wire Codec
//!
//! Transportable representations of HTTP-shaped traffic crossing the
//! isolation boundary between the host page and the sandboxed context.
//!
//! ## Overview
//!
//! Only structurally-cloneable values may cross the boundary, which in
//! practice means plain byte buffers. This crate defines:
//!
//! - [`RequestEnvelope`] / [`ResponseEnvelope`] - HTTP-shaped request and
//!   response values with an order-preserving header map
//! - [`TransportMessage`] - the tagged union of everything that crosses the
//!   channel, including the streaming (WebSocket-style) message kinds
//! - [`codec`] - length-prefixed framing: a JSON header followed by the raw
//!   body bytes, so binary payloads are never re-encoded
//! - [`ClonableError`] - a value-only mirror of a thrown error that survives
//!   the boundary and reconstructs into an equivalent throwable
//!
//! Paths inside envelopes are always relative (no scheme/host); origin
//! eligibility is decided by the host-side resolver before an envelope is
//! ever constructed.

pub mod clone_error;
pub mod codec;
pub mod envelope;
pub mod error;

pub use clone_error::{ClonableError, NON_STANDARD_THROW, TRUNCATED_CAUSE};
pub use codec::TransportMessage;
pub use envelope::{Headers, Method, RequestEnvelope, ResponseEnvelope};
pub use error::{CodecError, Result};
