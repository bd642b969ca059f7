//! Streaming queue discipline for connection-oriented exchanges.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_envelope::{codec, ClonableError, TransportMessage};
use bridge_transport::FrameSender;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, ServerError};

/// Producer side of one streaming exchange, keyed by correlation id.
///
/// Frames are delivered to the host in the order they are written. The
/// exchange transitions `open -> (closed | errored)` exactly once; any write
/// after completion fails with [`ServerError::StreamCompleted`].
#[derive(Clone)]
pub struct StreamWriter {
    id: Uuid,
    sender: FrameSender,
    completed: Arc<AtomicBool>,
}

impl StreamWriter {
    pub(crate) fn new(id: Uuid, sender: FrameSender) -> Self {
        Self {
            id,
            sender,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.id
    }

    /// Append one frame to the open exchange.
    pub fn frame(&self, payload: Bytes) -> Result<()> {
        if self.completed.load(Ordering::Acquire) {
            return Err(ServerError::StreamCompleted);
        }
        let frame = codec::encode(&TransportMessage::StreamFrame {
            id: self.id,
            payload,
        })?;
        self.sender.send(frame)?;
        Ok(())
    }

    /// Complete the exchange normally.
    pub fn close(&self) -> Result<()> {
        self.complete()?;
        debug!(id = %self.id, "Stream closed");
        let frame = codec::encode(&TransportMessage::StreamClose { id: self.id })?;
        self.sender.send(frame)?;
        Ok(())
    }

    /// Complete the exchange with an error.
    pub fn error(&self, error: ClonableError) -> Result<()> {
        self.complete()?;
        debug!(id = %self.id, kind = %error.kind, "Stream errored");
        let frame = codec::encode(&TransportMessage::StreamError {
            id: self.id,
            error,
        })?;
        self.sender.send(frame)?;
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn complete(&self) -> Result<()> {
        self.completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ServerError::StreamCompleted)
    }
}
