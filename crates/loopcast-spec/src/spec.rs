//! The video specification value object.

use crate::codec::{AudioCodec, Bitrate, Container, VideoCodec};
use crate::resolution::Resolution;

/// A structured description of a desired video artifact.
///
/// Every field is independently optional; `None` means "unspecified" and is
/// filled in from a baseline via [`VideoSpec::resolve`]. A fully resolved
/// spec has every field populated except those legitimately suppressed by a
/// disabled track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSpec {
    /// Source clip name (file stem, no extension).
    pub name: Option<String>,
    pub resolution: Option<Resolution>,
    /// Output duration in seconds.
    pub duration: Option<u32>,
    pub codec: Option<VideoCodec>,
    pub fps: Option<u32>,
    pub bitrate: Option<Bitrate>,
    pub audio_codec: Option<AudioCodec>,
    /// Audio bitrate in kbps.
    pub audio_bitrate: Option<u32>,
    pub container: Option<Container>,
}

impl VideoSpec {
    /// Fill every unspecified field from `defaults`.
    ///
    /// Field-wise: `self.field` if set, else `defaults.field`.
    pub fn resolve(&self, defaults: &VideoSpec) -> VideoSpec {
        VideoSpec {
            name: self.name.clone().or_else(|| defaults.name.clone()),
            resolution: self.resolution.or(defaults.resolution),
            duration: self.duration.or(defaults.duration),
            codec: self.codec.or(defaults.codec),
            fps: self.fps.or(defaults.fps),
            bitrate: self.bitrate.or(defaults.bitrate),
            audio_codec: self.audio_codec.or(defaults.audio_codec),
            audio_bitrate: self.audio_bitrate.or(defaults.audio_bitrate),
            container: self.container.or(defaults.container),
        }
    }

    /// Whether an enabled video track is requested.
    pub fn has_video(&self) -> bool {
        self.codec.map(|c| !c.is_disabled()).unwrap_or(false)
    }

    /// Whether an enabled audio track is requested.
    pub fn has_audio(&self) -> bool {
        self.audio_codec.map(|c| !c.is_disabled()).unwrap_or(false)
    }

    /// True when no token set any field.
    pub fn is_empty(&self) -> bool {
        *self == VideoSpec::default()
    }
}
