//! FFprobe-based media probing.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;

/// Probed metadata for a media file: container-level format plus all
/// streams. Serializable so the info endpoint can pass it through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    pub format: FormatInfo,
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    pub format_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub index: u32,
    pub codec_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_frame_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub side_data_list: Vec<SideData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i64>,
}

impl MediaInfo {
    /// The primary video stream, if any.
    pub fn primary_video(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == "video")
    }

    /// Container duration in seconds.
    pub fn duration_secs(&self) -> Option<f64> {
        self.format.duration.as_deref().and_then(|s| s.parse().ok())
    }

    /// Whether the clip plays back in portrait orientation.
    ///
    /// True when the primary video stream is naturally taller than wide,
    /// or carries a 90-degree rotation in its side data (phone footage
    /// stored landscape with a rotate flag).
    pub fn is_portrait(&self) -> bool {
        let Some(video) = self.primary_video() else {
            return false;
        };

        let width = video.width.unwrap_or(0);
        let height = video.height.unwrap_or(0);
        let rotation = video
            .side_data_list
            .iter()
            .find_map(|sd| sd.rotation)
            .unwrap_or(0);

        height > width || rotation.abs() == 90
    }
}

/// Probe a media file using ffprobe.
pub async fn probe(path: &Path) -> Result<MediaInfo> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("invalid UTF-8: {}", e)))?;

    let info: MediaInfo = serde_json::from_str(&json_str)?;
    Ok(info)
}
