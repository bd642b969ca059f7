//! Media/resource resolver.
//!
//! Decides per resource URL whether the real network or the sandbox serves
//! it. Eligibility is settled strictly before any envelope exists: only
//! same-origin http(s) URLs reach the worker proxy, and only when a proxy
//! is attached at all. Everything else passes through unchanged for the
//! platform's ordinary fetch path.

use std::sync::Arc;

use bridge_envelope::{Method, RequestEnvelope};
use tracing::debug;
use url::Url;

use crate::blob::BlobStore;
use crate::error::{HostError, Result};
use crate::proxy::WorkerProxy;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Resolves resource URLs for UI components.
#[derive(Clone)]
pub struct MediaResolver {
    origin: Url,
    proxy: Option<Arc<WorkerProxy>>,
    blobs: Arc<BlobStore>,
}

impl MediaResolver {
    /// `proxy: None` is the "not running sandboxed" configuration: every
    /// resolve call becomes a passthrough.
    pub fn new(origin: Url, proxy: Option<Arc<WorkerProxy>>, blobs: Arc<BlobStore>) -> Self {
        Self {
            origin,
            proxy,
            blobs,
        }
    }

    /// Resolve a resource URL to something locally loadable.
    ///
    /// Passthrough cases return the input unchanged: absent values, foreign
    /// hosts, non-http(s) schemes (data URLs and the like), and running
    /// without a sandbox. Sandbox-served resources come back as a
    /// `blob:<uuid>` handle address caged to this resolver's [`BlobStore`];
    /// the caller releases the handle when done.
    ///
    /// # Errors
    ///
    /// [`HostError::ResourceFetch`] when the virtual server answers with a
    /// non-200 status, plus any transport or remote failure from the proxy.
    pub async fn resolve(&self, src: Option<&str>) -> Result<Option<String>> {
        let Some(src) = src else {
            return Ok(None);
        };
        let Some(url) = self.eligible(src) else {
            return Ok(Some(src.to_string()));
        };
        let Some(proxy) = self.proxy.as_ref() else {
            return Ok(Some(src.to_string()));
        };

        let request = RequestEnvelope::new(Method::Get, url.path());
        let response = proxy.http_request(request).await?;

        if response.status != 200 {
            return Err(HostError::ResourceFetch {
                path: url.path().to_string(),
                status: response.status,
            });
        }

        let media_type = response.content_type().unwrap_or(FALLBACK_MEDIA_TYPE);
        let address = self.blobs.insert(response.body.clone(), media_type);
        debug!(path = %url.path(), %address, "Resolved media source through sandbox");
        Ok(Some(address))
    }

    /// The blob store backing resolved handles.
    pub fn blobs(&self) -> Arc<BlobStore> {
        Arc::clone(&self.blobs)
    }

    /// Same-origin http(s) check. Relative URLs resolve against the page
    /// origin first, the way a document base URL would.
    fn eligible(&self, src: &str) -> Option<Url> {
        let url = Url::options().base_url(Some(&self.origin)).parse(src).ok()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        if url.host_str() != self.origin.host_str() {
            return None;
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough_resolver() -> MediaResolver {
        let origin = Url::parse("https://host.example").expect("origin");
        MediaResolver::new(origin, None, Arc::new(BlobStore::new()))
    }

    #[tokio::test]
    async fn test_absent_src_is_identity() {
        let resolver = passthrough_resolver();
        assert_eq!(resolver.resolve(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_foreign_host_passes_through() {
        let resolver = passthrough_resolver();
        let src = "https://cdn.other.example/lib.js";
        assert_eq!(
            resolver.resolve(Some(src)).await.unwrap().as_deref(),
            Some(src)
        );
    }

    #[tokio::test]
    async fn test_data_url_passes_through() {
        let resolver = passthrough_resolver();
        let src = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(
            resolver.resolve(Some(src)).await.unwrap().as_deref(),
            Some(src)
        );
    }

    #[tokio::test]
    async fn test_same_origin_without_proxy_passes_through() {
        let resolver = passthrough_resolver();
        let src = "https://host.example/app/img.png";
        assert_eq!(
            resolver.resolve(Some(src)).await.unwrap().as_deref(),
            Some(src)
        );
    }

    #[tokio::test]
    async fn test_unparseable_src_passes_through() {
        let resolver = passthrough_resolver();
        // Not resolvable even against the page base.
        let src = "https://";
        assert_eq!(
            resolver.resolve(Some(src)).await.unwrap().as_deref(),
            Some(src)
        );
    }

    #[test]
    fn test_relative_src_resolves_against_origin() {
        let resolver = passthrough_resolver();
        let url = resolver.eligible("/app/data/img.png").expect("eligible");
        assert_eq!(url.host_str(), Some("host.example"));
        assert_eq!(url.path(), "/app/data/img.png");
    }
}
