//! Request dispatch loop.
//!
//! Per-request state machine: Received (frame decoded) -> Routed (handed to
//! the application handler) -> Completed | Errored (one terminal message
//! sent back under the original correlation id).

use std::collections::HashSet;
use std::sync::Arc;

use bridge_envelope::{codec, ClonableError, RequestEnvelope, TransportMessage};
use bridge_transport::{Endpoint, FrameSender};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::handler::RequestHandler;
use crate::stream::StreamWriter;

/// The virtual server owning the sandboxed endpoint.
pub struct VirtualServer {
    endpoint: Endpoint,
    handler: Arc<dyn RequestHandler>,
    dispatched: HashSet<Uuid>,
}

impl VirtualServer {
    pub fn new(endpoint: Endpoint, handler: Arc<dyn RequestHandler>) -> Self {
        Self {
            endpoint,
            handler,
            dispatched: HashSet::new(),
        }
    }

    /// Run until the transport closes.
    ///
    /// Requests are dispatched concurrently, one spawned task each; the loop
    /// itself never blocks on application logic.
    pub async fn run(mut self) {
        while let Some(frame) = self.endpoint.recv().await {
            let message = match codec::decode(frame) {
                Ok(message) => message,
                Err(err) => {
                    // No recoverable correlation id, so nobody to answer.
                    error!(error = %err, "Dropping malformed frame");
                    continue;
                }
            };

            match message {
                TransportMessage::Request { id, envelope } => {
                    if !self.dispatched.insert(id) {
                        warn!(%id, "Duplicate correlation id, request ignored");
                        continue;
                    }
                    let handler = Arc::clone(&self.handler);
                    let sender = self.endpoint.sender();
                    tokio::spawn(dispatch_request(handler, sender, id, envelope));
                }
                TransportMessage::StreamOpen { id, envelope } => {
                    if !self.dispatched.insert(id) {
                        warn!(%id, "Duplicate correlation id, stream ignored");
                        continue;
                    }
                    let handler = Arc::clone(&self.handler);
                    let sender = self.endpoint.sender();
                    tokio::spawn(dispatch_stream(handler, sender, id, envelope));
                }
                other => {
                    warn!(
                        id = %other.correlation_id(),
                        "Unexpected message kind on the sandboxed endpoint"
                    );
                }
            }
        }
        debug!("Transport closed, virtual server stopping");
    }
}

async fn dispatch_request(
    handler: Arc<dyn RequestHandler>,
    sender: FrameSender,
    id: Uuid,
    envelope: RequestEnvelope,
) {
    debug!(%id, method = %envelope.method, path = %envelope.path, "Routing request");

    // Inner spawn so a panicking handler surfaces as a JoinError instead of
    // tearing down this dispatch task silently.
    let join = tokio::spawn(async move { handler.handle(envelope).await });

    let outcome = match join.await {
        Ok(Ok(response)) => {
            debug!(%id, status = response.status, "Request completed");
            TransportMessage::Response {
                id,
                envelope: response,
            }
        }
        Ok(Err(err)) => {
            let source: &(dyn std::error::Error + 'static) = err.as_ref();
            let error = ClonableError::from_error(source);
            debug!(%id, kind = %error.kind, "Request errored");
            TransportMessage::Error { id, error }
        }
        Err(join_err) if join_err.is_panic() => {
            let payload = join_err.into_panic();
            let error = ClonableError::from_panic(payload.as_ref());
            warn!(%id, "Handler panicked");
            TransportMessage::Error { id, error }
        }
        Err(_) => TransportMessage::Error {
            id,
            error: ClonableError::new("Error", "request task cancelled before completion"),
        },
    };

    send_terminal(&sender, id, &outcome);
}

async fn dispatch_stream(
    handler: Arc<dyn RequestHandler>,
    sender: FrameSender,
    id: Uuid,
    envelope: RequestEnvelope,
) {
    debug!(%id, path = %envelope.path, "Opening stream");

    let writer = StreamWriter::new(id, sender.clone());
    let server_view = writer.clone();

    let join = tokio::spawn(async move { handler.handle_stream(envelope, writer).await });

    match join.await {
        Ok(Ok(())) => {
            // Handler may already have closed or errored the stream; the
            // single-transition guard makes this a no-op then.
            let _ = server_view.close();
        }
        Ok(Err(err)) => {
            let source: &(dyn std::error::Error + 'static) = err.as_ref();
            let _ = server_view.error(ClonableError::from_error(source));
        }
        Err(join_err) if join_err.is_panic() => {
            warn!(%id, "Stream handler panicked");
            let payload = join_err.into_panic();
            let _ = server_view.error(ClonableError::from_panic(payload.as_ref()));
        }
        Err(_) => {
            let _ = server_view.error(ClonableError::new(
                "Error",
                "stream task cancelled before completion",
            ));
        }
    }
}

fn send_terminal(sender: &FrameSender, id: Uuid, outcome: &TransportMessage) {
    match codec::encode(outcome) {
        Ok(frame) => {
            if sender.send(frame).is_err() {
                warn!(%id, "Host endpoint gone before the reply could be sent");
            }
        }
        Err(err) => error!(%id, error = %err, "Failed to encode terminal outcome"),
    }
}
