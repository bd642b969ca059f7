//! # Message Channel Transport
//!
//! Low-level bidirectional message passing between the host context and the
//! sandboxed context. Each side holds an [`Endpoint`]; frames sent on one
//! endpoint arrive on the other in send order.
//!
//! Payloads are opaque byte buffers ([`bytes::Bytes`]) - the only thing
//! that may cross the isolation boundary. Encoding and decoding of frames
//! belongs to `bridge-envelope`; this crate only moves them.
//!
//! In-order delivery is guaranteed per channel instance. Nothing survives
//! channel recreation: once either endpoint is dropped, sends fail with
//! [`TransportError::Closed`] and the peer's `recv` drains what was already
//! in flight, then returns `None`.

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport channel closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// One side of a bidirectional frame channel.
pub struct Endpoint {
    tx: mpsc::UnboundedSender<Bytes>,
    rx: Mutex<mpsc::UnboundedReceiver<Bytes>>,
}

/// A cloneable send-only handle, for tasks that reply on behalf of an
/// endpoint (e.g. concurrently dispatched request handlers).
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<Bytes>,
}

/// Create a connected pair of endpoints, one per side of the boundary.
pub fn channel() -> (Endpoint, Endpoint) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();
    (
        Endpoint {
            tx: a_tx,
            rx: Mutex::new(b_rx),
        },
        Endpoint {
            tx: b_tx,
            rx: Mutex::new(a_rx),
        },
    )
}

impl Endpoint {
    /// Send one frame to the peer.
    pub fn send(&self, frame: Bytes) -> Result<()> {
        trace!(len = frame.len(), "Sending frame");
        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }

    /// Receive the next frame, in send order. Returns `None` once the peer
    /// is gone and everything in flight has been drained.
    pub async fn recv(&self) -> Option<Bytes> {
        self.rx.lock().await.recv().await
    }

    /// Whether the peer endpoint has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A cloneable send-only handle onto this endpoint's outgoing side.
    pub fn sender(&self) -> FrameSender {
        FrameSender {
            tx: self.tx.clone(),
        }
    }
}

impl FrameSender {
    pub fn send(&self, frame: Bytes) -> Result<()> {
        trace!(len = frame.len(), "Sending frame");
        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
