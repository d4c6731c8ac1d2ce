//! Source clip discovery and artifact cache lookup.
//!
//! Discovery is a filesystem scan, not an index: the clip catalog is tens
//! of files, so a handful of stat calls per request is cheaper than the
//! invalidation machinery an index would need.

use std::path::{Path, PathBuf};

use loopcast_spec::Container;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::PathsConfig;

/// Whether a path has a whitelisted container extension.
pub fn is_source_clip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            Container::ALL.iter().any(|c| c.extension() == ext)
        })
        .unwrap_or(false)
}

/// The on-disk media library: source clips plus the two artifact tiers.
#[derive(Debug, Clone)]
pub struct Library {
    source_dir: PathBuf,
    video_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl Library {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            source_dir: paths.source_dir(),
            video_dir: paths.video_dir(),
            scratch_dir: paths.scratch_dir(),
        }
    }

    /// All source clip files, sorted by name.
    pub fn source_clips(&self) -> Vec<PathBuf> {
        let mut clips: Vec<PathBuf> = WalkDir::new(&self.source_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!("Failed to read source entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_source_clip(p))
            .collect();
        clips.sort();
        clips
    }

    /// Known clip names (file stems of the source clips).
    pub fn clip_names(&self) -> Vec<String> {
        self.source_clips()
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect()
    }

    /// Resolve a clip name back to its source file.
    pub fn source_path(&self, name: &str) -> Option<PathBuf> {
        self.source_clips()
            .into_iter()
            .find(|p| p.file_stem().and_then(|s| s.to_str()) == Some(name))
    }

    /// Pregenerated artifact directory for a clip.
    pub fn clip_video_dir(&self, name: &str) -> PathBuf {
        self.video_dir.join(name)
    }

    /// The scratch (on-demand) artifact directory.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Search all storage tiers for an existing, sane artifact.
    ///
    /// Per-clip pregenerated directories are checked first, then the
    /// scratch tier; first hit wins. Files below `min_bytes` are crashed
    /// partial writes and are skipped so the orchestrator regenerates them.
    pub fn find_existing(&self, filename: &str, min_bytes: u64) -> Option<PathBuf> {
        for name in self.clip_names() {
            let candidate = self.clip_video_dir(&name).join(filename);
            if artifact_ready(&candidate, min_bytes) {
                return Some(candidate);
            }
        }

        let candidate = self.scratch_dir.join(filename);
        if artifact_ready(&candidate, min_bytes) {
            return Some(candidate);
        }

        None
    }
}

/// Whether an artifact exists and clears the minimum-size sanity check.
pub fn artifact_ready(path: &Path, min_bytes: u64) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() >= min_bytes)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn library(root: &Path) -> Library {
        let paths = PathsConfig {
            data_dir: root.to_path_buf(),
        };
        paths.ensure_layout().unwrap();
        Library::new(&paths)
    }

    #[test]
    fn test_is_source_clip() {
        assert!(is_source_clip(Path::new("bunny.mp4")));
        assert!(is_source_clip(Path::new("clip.webm")));
        assert!(is_source_clip(Path::new("CLIP.MP4")));
        assert!(!is_source_clip(Path::new("movie.mkv")));
        assert!(!is_source_clip(Path::new("notes.txt")));
        assert!(!is_source_clip(Path::new("no_extension")));
    }

    #[test]
    fn test_source_discovery_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = library(tmp.path());
        let src = tmp.path().join("source");

        fs::write(src.join("zebra.mp4"), b"z").unwrap();
        fs::write(src.join("bunny.webm"), b"b").unwrap();
        fs::write(src.join("readme.txt"), b"r").unwrap();

        assert_eq!(lib.clip_names(), vec!["bunny", "zebra"]);
        assert_eq!(
            lib.source_path("bunny"),
            Some(src.join("bunny.webm"))
        );
        assert_eq!(lib.source_path("ghost"), None);
    }

    #[test]
    fn test_find_existing_prefers_pregenerated_tier() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = library(tmp.path());
        fs::write(tmp.path().join("source/bunny.mp4"), b"src").unwrap();

        let filename = "bunny_h264_1280x720_30fps_20s_25crf_aac_128kbps.mp4";
        let pregen = tmp.path().join("video/bunny");
        fs::create_dir_all(&pregen).unwrap();
        fs::write(pregen.join(filename), vec![0u8; 2048]).unwrap();
        fs::write(tmp.path().join("tmp").join(filename), vec![0u8; 2048]).unwrap();

        assert_eq!(
            lib.find_existing(filename, 1024),
            Some(pregen.join(filename))
        );
    }

    #[test]
    fn test_find_existing_falls_back_to_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = library(tmp.path());
        fs::write(tmp.path().join("source/bunny.mp4"), b"src").unwrap();

        let filename = "bunny_av1_854x480_30fps_20s_25crf_opus_96kbps.webm";
        fs::write(tmp.path().join("tmp").join(filename), vec![0u8; 2048]).unwrap();

        assert_eq!(
            lib.find_existing(filename, 1024),
            Some(tmp.path().join("tmp").join(filename))
        );
    }

    #[test]
    fn test_find_existing_skips_undersized_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = library(tmp.path());
        fs::write(tmp.path().join("source/bunny.mp4"), b"src").unwrap();

        let filename = "bunny_h264_1280x720_30fps_20s_25crf_aac_128kbps.mp4";
        fs::write(tmp.path().join("tmp").join(filename), b"partial").unwrap();

        assert_eq!(lib.find_existing(filename, 1024), None);
    }

    #[test]
    fn test_artifact_ready() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("artifact.mp4");

        assert!(!artifact_ready(&path, 1024));

        fs::write(&path, vec![0u8; 100]).unwrap();
        assert!(!artifact_ready(&path, 1024));

        fs::write(&path, vec![0u8; 1024]).unwrap();
        assert!(artifact_ready(&path, 1024));
    }
}
