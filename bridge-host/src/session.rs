//! Per-sandbox-session context.
//!
//! Exactly one [`BridgeSession`] exists per sandbox session. It is built
//! once during sandbox initialization, threaded explicitly to whoever needs
//! the bridge (no ambient global), outlives every request issued through
//! it, and is torn down deterministically when the sandbox session ends.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::blob::BlobStore;
use crate::proxy::WorkerProxy;
use crate::resolver::MediaResolver;

pub struct BridgeSession {
    origin: Url,
    proxy: Arc<WorkerProxy>,
    blobs: Arc<BlobStore>,
    cancel: CancellationToken,
    server: tokio::task::JoinHandle<()>,
}

impl BridgeSession {
    /// Assemble a session from its wired parts. Normally called once by the
    /// runtime's `start_session`.
    pub fn new(
        origin: Url,
        proxy: Arc<WorkerProxy>,
        blobs: Arc<BlobStore>,
        cancel: CancellationToken,
        server: tokio::task::JoinHandle<()>,
    ) -> Self {
        Self {
            origin,
            proxy,
            blobs,
            cancel,
            server,
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn proxy(&self) -> Arc<WorkerProxy> {
        Arc::clone(&self.proxy)
    }

    pub fn blobs(&self) -> Arc<BlobStore> {
        Arc::clone(&self.blobs)
    }

    /// A resolver wired to this session's proxy and blob store.
    pub fn resolver(&self) -> MediaResolver {
        MediaResolver::new(self.origin.clone(), Some(self.proxy()), self.blobs())
    }

    /// Tear the session down deterministically.
    ///
    /// In-flight requests reject with `TransportClosed`; the virtual server
    /// task is stopped. Blob handles already resolved stay valid until
    /// their owners release them.
    pub async fn shutdown(self) {
        debug!(origin = %self.origin, "Shutting down bridge session");
        self.cancel.cancel();
        self.server.abort();
        let _ = self.server.await;
    }
}
