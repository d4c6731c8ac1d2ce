//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a temp data directory with the
//! standard layout and a fully-constructed [`AppContext`], plus helpers
//! for seeding source clips, artifacts, and HLS renditions.

use std::fs;
use std::path::{Path, PathBuf};

use loopcast::config::Config;
use loopcast::server::AppContext;

pub struct TestHarness {
    pub ctx: AppContext,
    // Held for its Drop; the directory dies with the harness.
    #[allow(dead_code)]
    tmp: tempfile::TempDir,
    pub data_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let data_dir = tmp.path().to_path_buf();

        let mut config = Config::default();
        config.paths.data_dir = data_dir.clone();
        config.paths.ensure_layout().expect("failed to create layout");

        let ctx = AppContext::new(config);

        Self { ctx, tmp, data_dir }
    }

    /// Drop a (fake) source clip into the source tier.
    pub fn seed_source(&self, filename: &str) -> PathBuf {
        let path = self.data_dir.join("source").join(filename);
        fs::write(&path, b"not really a video").unwrap();
        path
    }

    /// Drop an artifact of the given size into the scratch tier.
    pub fn seed_scratch_artifact(&self, filename: &str, bytes: usize) -> PathBuf {
        let path = self.data_dir.join("tmp").join(filename);
        fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    /// Lay down a full HLS rendition: init segment, chunks, sentinel
    /// playlist, and the clip's master playlist.
    pub fn seed_rendition(&self, clip: &str, tier: &str, chunks: usize) {
        let dir = self.data_dir.join("stream").join(clip).join(tier);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("init.mp4"), b"init-bytes").unwrap();
        fs::write(dir.join("playlist.m3u8"), b"#EXTM3U\n").unwrap();
        for i in 0..chunks {
            fs::write(
                dir.join(format!("chunk_{:03}.mp4", i)),
                format!("chunk-{}", i),
            )
            .unwrap();
        }

        let master = self.data_dir.join("stream").join(clip).join("master.m3u8");
        fs::write(master, "#EXTM3U\n#EXT-X-VERSION:6\n").unwrap();
    }

    pub fn path(&self) -> &Path {
        &self.data_dir
    }
}
