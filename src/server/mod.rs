//! HTTP surface.
//!
//! A thin Axum layer over the orchestrator, discovery, and the HLS engine.
//!
//! # Routes
//!
//! - `GET /health` - liveness
//! - `GET /video/{params}` - artifact described by the request token
//! - `GET /info/{clip}` - probe output for a source clip
//! - `GET /hls/{clip}/master.m3u8` - master playlist
//! - `GET /hls/{clip}/{tier}/playlist.m3u8` - live media playlist
//! - `GET /hls/{clip}/{tier}/init.mp4` - shared init segment
//! - `GET /hls/{clip}/{tier}/media.{seq}.mp4` - virtual media segment

mod error;
mod routes_hls;
mod routes_video;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::discovery::Library;
use crate::hls::HlsEngine;
use crate::transcode::Transcoder;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub library: Arc<Library>,
    pub transcoder: Arc<Transcoder>,
    pub hls: Arc<HlsEngine>,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let library = Arc::new(Library::new(&config.paths));
        let transcoder = Arc::new(Transcoder::new(
            Arc::clone(&library),
            config.transcode.min_artifact_bytes,
        ));
        let hls = Arc::new(HlsEngine::new(config.paths.stream_dir()));

        Self {
            config,
            library,
            transcoder,
            hls,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, header::RANGE]);

    Router::new()
        .route("/health", get(health_check))
        .route("/video/:params", get(routes_video::serve_video))
        .route("/info/:clip", get(routes_video::clip_info))
        .route("/hls/:clip/master.m3u8", get(routes_hls::master_playlist))
        .route(
            "/hls/:clip/:tier/playlist.m3u8",
            get(routes_hls::media_playlist),
        )
        .route("/hls/:clip/:tier/init.mp4", get(routes_hls::init_segment))
        .route("/hls/:clip/:tier/:segment", get(routes_hls::media_segment))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind and serve until ctrl-c.
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(ctx);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
