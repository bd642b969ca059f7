//! Worker proxy: the host-side handle for issuing requests.
//!
//! Every request gets a fresh v4 correlation id and a slot in the pending
//! table; a pump task reads the return channel and resolves slots as
//! matching ids arrive. Responses to different in-flight requests may
//! interleave freely - only the per-id pairing is guaranteed.
//!
//! The tables are plain `std::sync::Mutex`es: they are touched only by the
//! pump task and the issuing calls, and never held across an await point.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bridge_envelope::{codec, ClonableError, RequestEnvelope, ResponseEnvelope, TransportMessage};
use bridge_transport::{Endpoint, FrameSender};
use bytes::Bytes;
use futures::Stream;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::{HostError, Result};

type PendingSender = oneshot::Sender<std::result::Result<ResponseEnvelope, ClonableError>>;

enum StreamEvent {
    Frame(Bytes),
    Close,
    Error(ClonableError),
}

/// Host-side handle to the sandboxed context. One per sandbox session.
pub struct WorkerProxy {
    sender: FrameSender,
    pending: Mutex<HashMap<Uuid, PendingSender>>,
    streams: Mutex<HashMap<Uuid, mpsc::UnboundedSender<StreamEvent>>>,
    closed: AtomicBool,
}

impl WorkerProxy {
    /// Take ownership of the host endpoint and start the pump task.
    ///
    /// The pump stops when `cancel` fires or the transport closes; either
    /// way all in-flight requests reject with
    /// [`HostError::TransportClosed`].
    pub fn new(endpoint: Endpoint, cancel: CancellationToken) -> Arc<Self> {
        let proxy = Arc::new(Self {
            sender: endpoint.sender(),
            pending: Mutex::new(HashMap::new()),
            streams: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        });
        let pump = Arc::clone(&proxy);
        tokio::spawn(pump.pump(endpoint, cancel));
        proxy
    }

    /// Issue one request and suspend until its terminal outcome arrives.
    ///
    /// No timeout is imposed here; a caller needing a bounded wait wraps
    /// the returned future itself.
    pub async fn http_request(&self, request: RequestEnvelope) -> Result<ResponseEnvelope> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HostError::TransportClosed);
        }

        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending_table().insert(id, tx);

        let frame = codec::encode(&TransportMessage::Request {
            id,
            envelope: request,
        })?;
        if self.sender.send(frame).is_err() {
            self.pending_table().remove(&id);
            return Err(HostError::TransportClosed);
        }
        debug!(%id, "Request sent to sandboxed context");

        // The pump may have stopped between the closed check and the
        // insert; the slot would then never resolve.
        if self.closed.load(Ordering::Acquire) {
            self.pending_table().remove(&id);
            return Err(HostError::TransportClosed);
        }

        match rx.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(error)) => Err(HostError::Remote(error)),
            Err(_) => Err(HostError::TransportClosed),
        }
    }

    /// Open a connection-oriented exchange.
    ///
    /// The returned handle yields frames in arrival order and terminates
    /// when the sandboxed side closes or errors the exchange.
    pub async fn open_stream(&self, request: RequestEnvelope) -> Result<StreamHandle> {
        if self.closed.load(Ordering::Acquire) {
            return Err(HostError::TransportClosed);
        }

        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.stream_table().insert(id, tx);

        let frame = codec::encode(&TransportMessage::StreamOpen {
            id,
            envelope: request,
        })?;
        if self.sender.send(frame).is_err() {
            self.stream_table().remove(&id);
            return Err(HostError::TransportClosed);
        }
        debug!(%id, "Stream opened to sandboxed context");

        if self.closed.load(Ordering::Acquire) {
            self.stream_table().remove(&id);
            return Err(HostError::TransportClosed);
        }

        Ok(StreamHandle { rx, done: false })
    }

    /// Number of requests currently awaiting a terminal outcome.
    pub fn in_flight(&self) -> usize {
        self.pending_table().len()
    }

    async fn pump(self: Arc<Self>, endpoint: Endpoint, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                frame = endpoint.recv() => match frame {
                    Some(frame) => self.route(frame),
                    None => break,
                },
            }
        }
        self.closed.store(true, Ordering::Release);
        // Dropping the slots rejects every in-flight request/stream.
        self.pending_table().clear();
        self.stream_table().clear();
        debug!("Worker proxy pump stopped");
    }

    fn route(&self, frame: Bytes) {
        let message = match codec::decode(frame) {
            Ok(message) => message,
            Err(err) => {
                error!(error = %err, "Dropping malformed frame from sandboxed context");
                return;
            }
        };

        match message {
            TransportMessage::Response { id, envelope } => self.complete(id, Ok(envelope)),
            TransportMessage::Error { id, error } => self.complete(id, Err(error)),
            TransportMessage::StreamFrame { id, payload } => {
                self.stream_event(id, StreamEvent::Frame(payload), false)
            }
            TransportMessage::StreamClose { id } => self.stream_event(id, StreamEvent::Close, true),
            TransportMessage::StreamError { id, error } => {
                self.stream_event(id, StreamEvent::Error(error), true)
            }
            TransportMessage::Request { id, .. } | TransportMessage::StreamOpen { id, .. } => {
                warn!(%id, "Unexpected message kind on the host endpoint");
            }
        }
    }

    fn complete(&self, id: Uuid, outcome: std::result::Result<ResponseEnvelope, ClonableError>) {
        match self.pending_table().remove(&id) {
            // A dropped receiver means the caller lost interest; dispatched
            // work still completed, which is the cooperative-cancellation
            // contract.
            Some(slot) => {
                let _ = slot.send(outcome);
            }
            None => warn!(%id, "Terminal outcome for unknown correlation id"),
        }
    }

    fn stream_event(&self, id: Uuid, event: StreamEvent, terminal: bool) {
        let mut streams = self.stream_table();
        let delivered = if terminal {
            streams.remove(&id).map(|tx| tx.send(event).is_ok())
        } else {
            streams.get(&id).map(|tx| tx.send(event).is_ok())
        };
        match delivered {
            Some(_) => {}
            None => warn!(%id, "Stream event for unknown correlation id"),
        }
    }

    fn pending_table(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, PendingSender>> {
        self.pending.lock().expect("pending table poisoned")
    }

    fn stream_table(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<Uuid, mpsc::UnboundedSender<StreamEvent>>> {
        self.streams.lock().expect("stream table poisoned")
    }
}

/// Consumer side of one streaming exchange.
///
/// Yields frames in arrival order; ends after the sandboxed side closes the
/// exchange; surfaces a stream error as the final item. Losing the
/// transport before a clean close yields [`HostError::TransportClosed`].
pub struct StreamHandle {
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    done: bool,
}

impl Stream for StreamHandle {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(StreamEvent::Frame(payload))) => Poll::Ready(Some(Ok(payload))),
            Poll::Ready(Some(StreamEvent::Close)) => {
                this.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(Some(StreamEvent::Error(error))) => {
                this.done = true;
                Poll::Ready(Some(Err(HostError::Remote(error))))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(Some(Err(HostError::TransportClosed)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
