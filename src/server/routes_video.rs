//! On-demand artifact serving.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Json, Response},
};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::server::{ApiError, AppContext};
use crate::transcode::TranscodeError;

/// Serve the artifact described by the request token.
///
/// Cache hit: stream the existing artifact with range support. Miss: wait
/// for the (coalesced) encode to finish, then stream the fresh artifact.
/// A client that disconnects while waiting only abandons its wait; the
/// encode keeps running and a retry attaches to it.
pub async fn serve_video(
    State(ctx): State<AppContext>,
    Path(params): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (resolved, existing) = ctx.transcoder.lookup(&params)?;

    if let Some(path) = existing {
        return serve_media_file(&path, &headers, "max-age=3600").await;
    }

    let name = resolved
        .name
        .clone()
        .ok_or_else(|| ApiError::internal("resolved spec is missing a clip name"))?;
    let input = ctx
        .library
        .source_path(&name)
        .ok_or(TranscodeError::SourceNotFound(name))?;

    tracing::info!(token = %params, "artifact miss, transcoding");
    let output = ctx
        .transcoder
        .transcode(&resolved, &input, ctx.library.scratch_dir())
        .await?;

    // Freshly produced; let the caches revalidate until it has proven itself.
    serve_media_file(&output, &headers, "no-store").await
}

/// Probe a source clip and return the raw stream/format metadata.
pub async fn clip_info(
    State(ctx): State<AppContext>,
    Path(clip): Path<String>,
) -> Result<Json<loopcast_av::MediaInfo>, ApiError> {
    let path = ctx
        .library
        .source_path(&clip)
        .ok_or(TranscodeError::SourceNotFound(clip))?;

    let info = loopcast_av::probe(&path).await?;
    Ok(Json(info))
}

/// Stream a media file with HTTP range support.
async fn serve_media_file(
    path: &std::path::Path,
    headers: &HeaderMap,
    cache_control: &str,
) -> Result<Response, ApiError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| ApiError::not_found("artifact vanished"))?;
    let file_size = metadata.len();

    let content_type = content_type_for(path);

    let range = headers
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| parse_range_header(s, file_size));

    match range {
        Some((start, end)) => {
            let length = end - start + 1;

            let mut file = File::open(path)
                .await
                .map_err(|_| ApiError::not_found("artifact vanished"))?;
            file.seek(SeekFrom::Start(start))
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;

            let stream = ReaderStream::new(file.take(length));
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CACHE_CONTROL, cache_control)
                .body(Body::from_stream(stream))
                .map_err(|e| ApiError::internal(e.to_string()))
        }
        None => {
            let file = File::open(path)
                .await
                .map_err(|_| ApiError::not_found("artifact vanished"))?;

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CACHE_CONTROL, cache_control)
                .body(Body::from_stream(ReaderStream::new(file)))
                .map_err(|e| ApiError::internal(e.to_string()))
        }
    }
}

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Parse HTTP Range header.
///
/// Supports formats:
/// - bytes=0-499
/// - bytes=500-
/// - bytes=-500 (last 500 bytes)
fn parse_range_header(header: &str, file_size: u64) -> Option<(u64, u64)> {
    let header = header.strip_prefix("bytes=")?;

    let (start, end) = header.split_once('-')?;
    let start = start.trim();
    let end = end.trim();

    match (start.is_empty(), end.is_empty()) {
        // bytes=-500 (last 500 bytes)
        (true, false) => {
            let suffix_len: u64 = end.parse().ok()?;
            if suffix_len == 0 || file_size == 0 {
                return None;
            }
            let start = file_size.saturating_sub(suffix_len);
            Some((start, file_size - 1))
        }
        // bytes=500- (from 500 to end)
        (false, true) => {
            let start: u64 = start.parse().ok()?;
            if start >= file_size {
                return None;
            }
            Some((start, file_size - 1))
        }
        // bytes=0-499
        (false, false) => {
            let start: u64 = start.parse().ok()?;
            let end: u64 = end.parse().ok()?;
            if start >= file_size {
                return None;
            }
            let end = end.min(file_size - 1);
            if start > end {
                return None;
            }
            Some((start, end))
        }
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_header() {
        assert_eq!(parse_range_header("bytes=0-499", 1000), Some((0, 499)));
        assert_eq!(parse_range_header("bytes=500-", 1000), Some((500, 999)));
        assert_eq!(parse_range_header("bytes=-200", 1000), Some((800, 999)));
        assert_eq!(parse_range_header("bytes=0-9999", 1000), Some((0, 999)));
        assert_eq!(parse_range_header("bytes=1000-", 1000), None);
        assert_eq!(parse_range_header("bytes=-", 1000), None);
        assert_eq!(parse_range_header("octets=0-1", 1000), None);
        assert_eq!(parse_range_header("bytes=9-3", 1000), None);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(
            content_type_for(std::path::Path::new("a/bunny_720p.mp4")),
            "video/mp4"
        );
        assert_eq!(
            content_type_for(std::path::Path::new("clip.webm")),
            "video/webm"
        );
        assert_eq!(
            content_type_for(std::path::Path::new("mystery")),
            "application/octet-stream"
        );
    }
}
