//! The seam between the bridge and the sandboxed application.

use async_trait::async_trait;
use bridge_envelope::{ClonableError, RequestEnvelope, ResponseEnvelope};

use crate::stream::StreamWriter;

/// Opaque application error. Anything the sandboxed logic raises is carried
/// across the boundary via [`ClonableError::from_error`]; handlers wanting a
/// specific `kind` return a [`ClonableError`] directly.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The sandboxed application's request-handling logic.
///
/// The bridge routes decoded envelopes here and does not interpret paths or
/// methods itself. Implementations run on the sandboxed side and may only
/// touch in-context state (e.g. a virtual filesystem).
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle one request and produce one response.
    ///
    /// # Errors
    ///
    /// Any error returned crosses the boundary in place of a response and is
    /// rethrown to the original host-side caller.
    async fn handle(&self, request: RequestEnvelope) -> std::result::Result<ResponseEnvelope, BoxError>;

    /// Handle a connection-oriented exchange by appending frames to
    /// `stream` and closing it when done.
    ///
    /// The default implementation rejects the stream; applications that
    /// never open streaming exchanges need not override it.
    async fn handle_stream(
        &self,
        request: RequestEnvelope,
        stream: StreamWriter,
    ) -> std::result::Result<(), BoxError> {
        let error = ClonableError::new(
            "Error",
            format!(
                "streaming is not supported by this application (path '{}')",
                request.path
            ),
        );
        stream.error(error)?;
        Ok(())
    }
}
