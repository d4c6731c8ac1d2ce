//! The HLS virtual-live engine.
//!
//! Serves a perpetually-live channel from the pregenerated renditions.
//! There is no per-viewer state: the current Unix time is the media
//! sequence, so every request recomputes the same window and the stream
//! survives server restarts and concurrent viewers for free.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use loopcast_media::live_media_playlist;
use loopcast_spec::catalog;

use crate::transcode::TranscodeError;

/// Duration of one virtual segment, seconds.
const SEGMENT_SECONDS: u32 = loopcast_av::HLS_SEGMENT_SECONDS;

pub struct HlsEngine {
    stream_dir: PathBuf,
}

impl HlsEngine {
    pub fn new(stream_dir: PathBuf) -> Self {
        Self { stream_dir }
    }

    /// Current Unix time in seconds; the live media sequence base.
    pub fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn rendition_dir(&self, clip: &str, tier: &str) -> Result<PathBuf, TranscodeError> {
        if catalog::hls_tier(tier).is_none() {
            return Err(TranscodeError::SourceNotFound(format!("{}/{}", clip, tier)));
        }
        let dir = self.stream_dir.join(clip).join(tier);
        if !dir.is_dir() {
            return Err(TranscodeError::SourceNotFound(format!("{}/{}", clip, tier)));
        }
        Ok(dir)
    }

    /// Count the usable chunks of a rendition.
    ///
    /// The last physical chunk is excluded: it may be shorter than the
    /// nominal segment duration and would desynchronize the loop period.
    fn usable_chunks(&self, dir: &Path) -> Result<u64, TranscodeError> {
        let mut count: u64 = 0;
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("chunk_") && name.ends_with(".mp4") {
                count += 1;
            }
        }

        let usable = count.saturating_sub(1);
        if usable < 1 {
            return Err(TranscodeError::SourceNotFound(format!(
                "no usable chunks in {}",
                dir.display()
            )));
        }
        Ok(usable)
    }

    /// Render the live media playlist for a rendition at time `now`.
    pub fn media_playlist(&self, clip: &str, tier: &str, now: u64) -> Result<String, TranscodeError> {
        let dir = self.rendition_dir(clip, tier)?;
        let usable = self.usable_chunks(&dir)?;
        Ok(live_media_playlist(now, usable, SEGMENT_SECONDS).render())
    }

    /// Resolve a virtual segment request to its physical chunk file.
    pub fn segment_path(&self, clip: &str, tier: &str, seq: u64) -> Result<PathBuf, TranscodeError> {
        let dir = self.rendition_dir(clip, tier)?;
        let usable = self.usable_chunks(&dir)?;
        let chunk = seq % usable;
        Ok(dir.join(format!("chunk_{:03}.mp4", chunk)))
    }

    /// Path of a rendition's shared init segment.
    pub fn init_path(&self, clip: &str, tier: &str) -> Result<PathBuf, TranscodeError> {
        let path = self.rendition_dir(clip, tier)?.join("init.mp4");
        if !path.is_file() {
            return Err(TranscodeError::SourceNotFound(format!("{}/{}", clip, tier)));
        }
        Ok(path)
    }

    /// Path of a clip's master playlist.
    pub fn master_path(&self, clip: &str) -> Result<PathBuf, TranscodeError> {
        let path = self.stream_dir.join(clip).join("master.m3u8");
        if !path.is_file() {
            return Err(TranscodeError::SourceNotFound(clip.to_string()));
        }
        Ok(path)
    }
}
