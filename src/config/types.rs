use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub transcode: TranscodeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where everything lives on disk. All other paths derive from `data_dir`:
///
/// ```text
/// data/
///   source/            source clips (one file per clip)
///   video/<clip>/      pregenerated artifacts, canonical filenames
///   tmp/               on-demand artifacts (scratch tier)
///   stream/<clip>/     HLS renditions and master playlists
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    // Container deployments mount /data; local runs use ./data.
    let root = Path::new("/data");
    if root.exists() {
        root.to_path_buf()
    } else {
        PathBuf::from("data")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl PathsConfig {
    /// Directory holding the source clips.
    pub fn source_dir(&self) -> PathBuf {
        self.data_dir.join("source")
    }

    /// Pregenerated artifact tier, one subdirectory per clip.
    pub fn video_dir(&self) -> PathBuf {
        self.data_dir.join("video")
    }

    /// On-demand artifact tier.
    pub fn scratch_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    /// HLS rendition tree.
    pub fn stream_dir(&self) -> PathBuf {
        self.data_dir.join("stream")
    }

    /// Create the directory layout if missing.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [
            self.source_dir(),
            self.video_dir(),
            self.scratch_dir(),
            self.stream_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscodeConfig {
    /// Artifacts smaller than this are treated as crashed partial writes
    /// and regenerated.
    #[serde(default = "default_min_artifact_bytes")]
    pub min_artifact_bytes: u64,

    /// Wall-clock budget for the whole startup pregeneration pass.
    #[serde(default = "default_pregen_timeout_secs")]
    pub pregen_timeout_secs: u64,
}

fn default_min_artifact_bytes() -> u64 {
    1024
}
fn default_pregen_timeout_secs() -> u64 {
    15 * 60
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            min_artifact_bytes: default_min_artifact_bytes(),
            pregen_timeout_secs: default_pregen_timeout_secs(),
        }
    }
}
