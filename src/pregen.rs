//! Startup pregeneration.
//!
//! Walks every discovered source clip through the popular-combinations
//! matrix and prepares the HLS renditions the virtual-live engine serves.
//! Runs once per process start inside a timeout-bounded background task;
//! failures are logged, never fatal. Everything is idempotent (artifacts
//! hit the orchestrator's cache, HLS tiers are skipped when their
//! media-playlist sentinel exists), so an interrupted pass simply resumes
//! on the next start.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use loopcast_media::{MasterPlaylist, StreamInfo};
use loopcast_spec::catalog::{self, HlsTier};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::discovery::Library;
use crate::transcode::Transcoder;

pub struct Pregenerator {
    library: Arc<Library>,
    transcoder: Arc<Transcoder>,
    stream_dir: PathBuf,
    source_dir: PathBuf,
}

impl Pregenerator {
    pub fn new(config: &Config, library: Arc<Library>, transcoder: Arc<Transcoder>) -> Self {
        Self {
            library,
            transcoder,
            stream_dir: config.paths.stream_dir(),
            source_dir: config.paths.source_dir(),
        }
    }

    /// Spawn the startup pregeneration task.
    ///
    /// The timeout is independent of any request lifetime; a pass that
    /// overruns it is cut off and retried (from its sentinels) next start.
    pub fn spawn_startup(self, timeout: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, self.run()).await {
                Ok(Ok(())) => info!("Pregeneration complete"),
                Ok(Err(e)) => error!("Pregeneration failed: {:#}", e),
                Err(_) => warn!(
                    "Pregeneration timed out after {}s; resuming on next start",
                    timeout.as_secs()
                ),
            }
        })
    }

    /// Run the full pass: default source, popular artifacts, HLS renditions.
    pub async fn run(&self) -> Result<()> {
        self.ensure_default_source().await?;

        let clips = self.library.source_clips();
        if clips.is_empty() {
            warn!("No source clips found; nothing to pregenerate");
            return Ok(());
        }

        for clip in &clips {
            if let Err(e) = self.pregenerate_artifacts(clip).await {
                error!(clip = %clip.display(), "Artifact pregeneration failed: {:#}", e);
            }
        }

        for clip in &clips {
            if let Err(e) = self.pregenerate_hls(clip).await {
                error!(clip = %clip.display(), "HLS pregeneration failed: {:#}", e);
            }
        }

        Ok(())
    }

    /// Generate a synthetic source clip when the library is empty, so a
    /// fresh install has something to serve.
    async fn ensure_default_source(&self) -> Result<()> {
        if !self.library.source_clips().is_empty() {
            return Ok(());
        }

        let default_name = catalog::default_spec()
            .name
            .expect("baseline spec names a clip");
        let output = self.source_dir.join(format!("{}.mp4", default_name));

        info!(path = %output.display(), "Generating default source clip");
        loopcast_av::generate_test_source(&output)
            .await
            .context("failed to generate default source clip")?;
        Ok(())
    }

    /// Encode every popular combination for one clip, strictly in order.
    ///
    /// Sequential on purpose: one encode at a time bounds peak CPU on
    /// constrained hosts. Fails fast on the first error; the caller moves
    /// on to the next clip.
    async fn pregenerate_artifacts(&self, input: &Path) -> Result<()> {
        let stem = clip_stem(input)?;
        let out_dir = self.library.clip_video_dir(&stem);
        tokio::fs::create_dir_all(&out_dir).await?;

        for (i, mut spec) in catalog::popular_combinations().into_iter().enumerate() {
            spec.name = Some(stem.clone());
            self.transcoder
                .transcode(&spec, input, &out_dir)
                .await
                .with_context(|| {
                    format!(
                        "failed to generate combination {} ({:?} {:?})",
                        i + 1,
                        spec.codec,
                        spec.resolution
                    )
                })?;
        }

        info!(clip = %stem, "Popular combinations ready");
        Ok(())
    }

    /// Prepare the HLS rendition ladder and master playlist for one clip.
    async fn pregenerate_hls(&self, input: &Path) -> Result<()> {
        let stem = clip_stem(input)?;
        let clip_dir = self.stream_dir.join(&stem);
        tokio::fs::create_dir_all(&clip_dir).await?;

        // Portrait sources get swapped tiers so they are not stretched
        // into a landscape box. Probe failures fall back to landscape.
        let portrait = match loopcast_av::probe(input).await {
            Ok(info) => info.is_portrait(),
            Err(e) => {
                warn!(clip = %stem, "Orientation probe failed, assuming landscape: {}", e);
                false
            }
        };

        for tier in catalog::HLS_TIERS {
            self.pregenerate_tier(input, &clip_dir, &stem, tier, portrait)
                .await?;
        }

        let master_path = clip_dir.join("master.m3u8");
        if !master_path.exists() {
            let master = master_playlist(portrait);
            tokio::fs::write(&master_path, master.render()).await?;
            info!(clip = %stem, "Master playlist written");
        }

        Ok(())
    }

    async fn pregenerate_tier(
        &self,
        input: &Path,
        clip_dir: &Path,
        stem: &str,
        tier: HlsTier,
        portrait: bool,
    ) -> Result<()> {
        let tier_dir = clip_dir.join(tier.name);
        let sentinel = tier_dir.join("playlist.m3u8");
        if sentinel.exists() {
            return Ok(());
        }

        tokio::fs::create_dir_all(&tier_dir).await?;

        let resolution = if portrait {
            tier.resolution.swapped()
        } else {
            tier.resolution
        };

        info!(clip = %stem, tier = tier.name, "Generating HLS rendition");
        let args = loopcast_av::hls_encode_args(resolution, input, &tier_dir);
        loopcast_av::run_ffmpeg(&args)
            .await
            .with_context(|| format!("failed to generate HLS tier {} ({})", tier.name, resolution))?;

        Ok(())
    }
}

/// Build the master playlist for the fixed tier ladder.
fn master_playlist(portrait: bool) -> MasterPlaylist {
    catalog::HLS_TIERS
        .iter()
        .fold(MasterPlaylist::new(), |master, tier| {
            let resolution = if portrait {
                tier.resolution.swapped()
            } else {
                tier.resolution
            };
            master.add_stream(StreamInfo {
                name: tier.name.to_string(),
                // Relative to the master playlist's own location.
                uri: format!("{}/playlist.m3u8", tier.name),
                bandwidth: tier.bandwidth,
                width: resolution.width,
                height: resolution.height,
            })
        })
}

fn clip_stem(input: &Path) -> Result<String> {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
        .with_context(|| format!("source clip has no usable name: {}", input.display()))
}
