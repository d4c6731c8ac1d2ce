//! HTTP-level tests against the full router, no encoder required.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::TestHarness;
use loopcast::server::create_router;

async fn get(harness: &TestHarness, uri: &str) -> (StatusCode, Vec<u8>) {
    let router = create_router(harness.ctx.clone());
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn health_check_works() {
    let harness = TestHarness::new();
    let (status, body) = get(&harness, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn invalid_container_is_a_client_error() {
    let harness = TestHarness::new();
    let (status, body) = get(&harness, "/video/h264_1280x720.avi").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("invalid container"));
}

#[tokio::test]
async fn missing_source_clip_is_not_found() {
    let harness = TestHarness::new();
    // No sources seeded: the default clip cannot be resolved.
    let (status, _) = get(&harness, "/video/720p_h264").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cached_artifact_is_served_without_encoding() {
    let harness = TestHarness::new();
    harness.seed_source("bunny.mp4");
    // The canonical rendering of the fully-defaulted request token.
    let canonical = "bunny_h264_1280x720_30fps_20s_25crf_aac_128kbps.mp4";
    harness.seed_scratch_artifact(canonical, 4096);

    let (status, body) = get(&harness, "/video/bunny.mp4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 4096);
}

#[tokio::test]
async fn cached_artifact_supports_range_requests() {
    let harness = TestHarness::new();
    harness.seed_source("bunny.mp4");
    let canonical = "bunny_h264_1280x720_30fps_20s_25crf_aac_128kbps.mp4";
    harness.seed_scratch_artifact(canonical, 4096);

    let router = create_router(harness.ctx.clone());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/video/bunny.mp4")
                .header(header::RANGE, "bytes=0-1023")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .unwrap()
            .to_str()
            .unwrap(),
        "bytes 0-1023/4096"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.len(), 1024);
}

#[tokio::test]
async fn undersized_cached_artifact_is_not_served() {
    let harness = TestHarness::new();
    harness.seed_source("bunny.mp4");
    let canonical = "bunny_h264_1280x720_30fps_20s_25crf_aac_128kbps.mp4";
    // Below the 1024-byte sanity threshold: a crashed partial write.
    harness.seed_scratch_artifact(canonical, 16);

    // The cache refuses it; with no real encoder input the request fails
    // rather than serving the corrupt file.
    let (status, body) = get(&harness, "/video/bunny.mp4").await;
    assert_ne!(status, StatusCode::OK);
    assert_ne!(body.len(), 16);
}

#[tokio::test]
async fn master_playlist_is_served() {
    let harness = TestHarness::new();
    harness.seed_rendition("bunny", "720p", 6);

    let router = create_router(harness.ctx.clone());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/hls/bunny/master.m3u8")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap(),
        "application/vnd.apple.mpegurl"
    );
}

#[tokio::test]
async fn media_playlist_looks_live() {
    let harness = TestHarness::new();
    harness.seed_rendition("bunny", "720p", 6);

    let (status, body) = get(&harness, "/hls/bunny/720p/playlist.m3u8").await;
    assert_eq!(status, StatusCode::OK);

    let m3u8 = String::from_utf8(body).unwrap();
    assert!(m3u8.contains("#EXT-X-MEDIA-SEQUENCE:"));
    assert!(m3u8.contains("#EXT-X-MAP:URI=\"init.mp4\""));
    assert_eq!(m3u8.matches("#EXTINF:").count(), 5);
    assert!(!m3u8.contains("#EXT-X-ENDLIST"));
}

#[tokio::test]
async fn virtual_segment_resolves_to_physical_chunk() {
    let harness = TestHarness::new();
    harness.seed_rendition("bunny", "720p", 6);

    // 5 usable chunks; seq 12 maps to chunk 2.
    let (status, body) = get(&harness, "/hls/bunny/720p/media.12.mp4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"chunk-2");
}

#[tokio::test]
async fn init_segment_is_served() {
    let harness = TestHarness::new();
    harness.seed_rendition("bunny", "720p", 6);

    let (status, body) = get(&harness, "/hls/bunny/720p/init.mp4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"init-bytes");
}

#[tokio::test]
async fn unknown_clip_and_tier_are_not_found() {
    let harness = TestHarness::new();
    harness.seed_rendition("bunny", "720p", 6);

    let (status, _) = get(&harness, "/hls/ghost/master.m3u8").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&harness, "/hls/bunny/144p/playlist.m3u8").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&harness, "/hls/bunny/720p/media.xyz.mp4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rendition_with_one_chunk_is_unusable() {
    let harness = TestHarness::new();
    // One physical chunk leaves no usable ones after dropping the tail.
    harness.seed_rendition("bunny", "480p", 1);

    let (status, _) = get(&harness, "/hls/bunny/480p/playlist.m3u8").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
