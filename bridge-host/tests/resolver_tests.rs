//! Resolver against a live virtual server, with the application mocked out.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_envelope::{RequestEnvelope, ResponseEnvelope};
use bridge_host::{BlobStore, HostError, MediaResolver, WorkerProxy};
use bridge_server::{BoxError, RequestHandler, VirtualServer};
use bytes::Bytes;
use mockall::mock;
use mockall::predicate::function;
use tokio_util::sync::CancellationToken;
use url::Url;

mock! {
    App {}

    #[async_trait]
    impl RequestHandler for App {
        async fn handle(&self, request: RequestEnvelope) -> Result<ResponseEnvelope, BoxError>;
    }
}

fn sandboxed_resolver(app: MockApp) -> MediaResolver {
    let (host_end, sandbox_end) = bridge_transport::channel();
    let server = VirtualServer::new(sandbox_end, Arc::new(app));
    tokio::spawn(server.run());

    let proxy = WorkerProxy::new(host_end, CancellationToken::new());
    let origin = Url::parse("https://host.example").expect("origin");
    MediaResolver::new(origin, Some(proxy), Arc::new(BlobStore::new()))
}

#[tokio::test]
async fn test_success_yields_blob_handle_with_exact_body() {
    let mut app = MockApp::new();
    app.expect_handle()
        .with(function(|req: &RequestEnvelope| {
            req.path == "/app/data/img.png"
        }))
        .times(1)
        .returning(|_| {
            Ok(ResponseEnvelope::new(200)
                .header("Content-Type", "image/png")
                .body(Bytes::from_static(b"pngbytes")))
        });

    let resolver = sandboxed_resolver(app);
    let address = resolver
        .resolve(Some("https://host.example/app/data/img.png"))
        .await
        .unwrap()
        .expect("resolved address");

    assert!(address.starts_with("blob:"));
    let blob = resolver.blobs().get(&address).expect("stored blob");
    assert_eq!(blob.data, Bytes::from_static(b"pngbytes"));
    assert_eq!(blob.media_type, "image/png");
}

#[tokio::test]
async fn test_missing_resource_surfaces_path_and_status() {
    let mut app = MockApp::new();
    app.expect_handle()
        .times(1)
        .returning(|_| Ok(ResponseEnvelope::new(404)));

    let resolver = sandboxed_resolver(app);
    let err = resolver
        .resolve(Some("/app/data/missing.png"))
        .await
        .unwrap_err();

    match err {
        HostError::ResourceFetch { path, status } => {
            assert_eq!(path, "/app/data/missing.png");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_relative_src_is_fetched_same_origin() {
    let mut app = MockApp::new();
    app.expect_handle()
        .with(function(|req: &RequestEnvelope| req.path == "/theme.css"))
        .times(1)
        .returning(|_| {
            Ok(ResponseEnvelope::new(200)
                .header("Content-Type", "text/css")
                .body(Bytes::from_static(b"body{}")))
        });

    let resolver = sandboxed_resolver(app);
    let address = resolver
        .resolve(Some("/theme.css"))
        .await
        .unwrap()
        .expect("resolved address");
    assert!(address.starts_with("blob:"));
}

#[tokio::test]
async fn test_response_without_content_type_gets_fallback() {
    let mut app = MockApp::new();
    app.expect_handle()
        .times(1)
        .returning(|_| Ok(ResponseEnvelope::new(200).body(Bytes::from_static(b"\x00\x01"))));

    let resolver = sandboxed_resolver(app);
    let address = resolver
        .resolve(Some("/raw.bin"))
        .await
        .unwrap()
        .expect("resolved address");

    let blob = resolver.blobs().get(&address).expect("stored blob");
    assert_eq!(blob.media_type, "application/octet-stream");
}
