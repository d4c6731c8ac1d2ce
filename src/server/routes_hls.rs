//! Simulated-live HLS serving.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tokio_util::io::ReaderStream;

use crate::hls::HlsEngine;
use crate::server::{ApiError, AppContext};

const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
// Everything the live engine serves is time-sensitive: segments rotate
// every second, so even the "static" files get a one-second cache.
const LIVE_CACHE_CONTROL: &str = "public, max-age=1";

/// Serve the pregenerated master playlist for a clip.
pub async fn master_playlist(
    State(ctx): State<AppContext>,
    Path(clip): Path<String>,
) -> Result<Response, ApiError> {
    let path = ctx.hls.master_path(&clip)?;
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    playlist_response(content)
}

/// Compute and serve the live media playlist for a rendition.
pub async fn media_playlist(
    State(ctx): State<AppContext>,
    Path((clip, tier)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let m3u8 = ctx.hls.media_playlist(&clip, &tier, HlsEngine::now())?;
    playlist_response(m3u8.into_bytes())
}

/// Serve a rendition's shared init segment.
pub async fn init_segment(
    State(ctx): State<AppContext>,
    Path((clip, tier)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let path = ctx.hls.init_path(&clip, &tier)?;
    stream_chunk(&path).await
}

/// Resolve a virtual segment (`media.<seq>.mp4`) to its physical chunk.
pub async fn media_segment(
    State(ctx): State<AppContext>,
    Path((clip, tier, segment)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let seq = parse_segment_name(&segment)
        .ok_or_else(|| ApiError::not_found(format!("unknown segment: {}", segment)))?;

    let path = ctx.hls.segment_path(&clip, &tier, seq)?;
    stream_chunk(&path).await
}

/// Extract the sequence number from a `media.<seq>.mp4` name.
fn parse_segment_name(name: &str) -> Option<u64> {
    name.strip_prefix("media.")?
        .strip_suffix(".mp4")?
        .parse()
        .ok()
}

fn playlist_response(content: Vec<u8>) -> Result<Response, ApiError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, LIVE_CACHE_CONTROL)
        .body(Body::from(content))
        .map_err(|e| ApiError::internal(e.to_string()))
}

async fn stream_chunk(path: &std::path::Path) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|_| ApiError::not_found("chunk not found"))?;
    let size = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, LIVE_CACHE_CONTROL)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(e.to_string()))
}
