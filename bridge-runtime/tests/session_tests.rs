//! End-to-end session tests: bootstrap, resolve, stream, shutdown.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_envelope::{Method, RequestEnvelope, ResponseEnvelope};
use bridge_host::HostError;
use bridge_runtime::{start_session, BridgeConfig};
use bridge_server::{BoxError, RequestHandler, StreamWriter};
use bytes::Bytes;
use futures::StreamExt;

// Smallest well-formed payload worth shipping: a 17-byte PNG-ish blob.
const TINY_PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
    b'R', 0x00,
];

struct DemoApp;

#[async_trait]
impl RequestHandler for DemoApp {
    async fn handle(&self, request: RequestEnvelope) -> Result<ResponseEnvelope, BoxError> {
        match request.path.as_str() {
            "/app/data/img.png" => Ok(ResponseEnvelope::new(200)
                .header("Content-Type", "image/png")
                .body(Bytes::from_static(TINY_PNG))),
            _ => Ok(ResponseEnvelope::new(404)),
        }
    }

    async fn handle_stream(
        &self,
        _request: RequestEnvelope,
        stream: StreamWriter,
    ) -> Result<(), BoxError> {
        stream.frame(Bytes::from_static(b"tick"))?;
        stream.frame(Bytes::from_static(b"tock"))?;
        Ok(())
    }
}

fn demo_config() -> BridgeConfig {
    BridgeConfig::builder()
        .page_origin("https://host.example")
        .handler(Arc::new(DemoApp))
        .build()
        .expect("valid config")
}

#[tokio::test]
async fn test_png_resolves_to_blob_with_exact_bytes() {
    let session = start_session(demo_config()).expect("session");
    let resolver = session.resolver();

    let address = resolver
        .resolve(Some("https://host.example/app/data/img.png"))
        .await
        .unwrap()
        .expect("resolved address");

    let blob = session.blobs().get(&address).expect("stored blob");
    assert_eq!(blob.data.len(), 17);
    assert_eq!(blob.data, Bytes::from_static(TINY_PNG));
    assert_eq!(blob.media_type, "image/png");

    assert!(session.blobs().release(&address));
    assert!(session.blobs().get(&address).is_none());

    session.shutdown().await;
}

#[tokio::test]
async fn test_direct_request_through_proxy() {
    let session = start_session(demo_config()).expect("session");

    let response = session
        .proxy()
        .http_request(RequestEnvelope::new(Method::Get, "/nowhere"))
        .await
        .unwrap();
    assert_eq!(response.status, 404);

    session.shutdown().await;
}

#[tokio::test]
async fn test_stream_roundtrip_through_session() {
    let session = start_session(demo_config()).expect("session");

    let mut stream = session
        .proxy()
        .open_stream(RequestEnvelope::new(Method::Get, "/feed"))
        .await
        .unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "tick");
    assert_eq!(stream.next().await.unwrap().unwrap(), "tock");
    assert!(stream.next().await.is_none());

    session.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_rejects_later_requests() {
    let session = start_session(demo_config()).expect("session");
    let proxy = session.proxy();

    session.shutdown().await;

    let err = proxy
        .http_request(RequestEnvelope::new(Method::Get, "/app/data/img.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, HostError::TransportClosed));
}
