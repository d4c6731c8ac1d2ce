//! Parsing and rendering of canonical artifact filenames.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::codec::{AudioCodec, Bitrate, Container, VideoCodec};
use crate::resolution::Resolution;
use crate::spec::VideoSpec;

/// Errors produced by the specification language.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The filename extension is not a whitelisted container.
    #[error("invalid container format: {0} (valid formats: mp4, webm)")]
    InvalidContainer(String),

    /// A token could not be interpreted as the requested field.
    #[error("invalid specification token: {0}")]
    InvalidToken(String),
}

/// Bidirectional codec between request tokens and [`VideoSpec`] values.
///
/// Parsing classifies `_`-separated tokens independently of their order;
/// when two tokens set the same field, the later one wins. Tokens that
/// match no class are ignored rather than rejected, so a malformed field
/// degrades to "unspecified" instead of failing the request. The only hard
/// error is a non-whitelisted container extension.
#[derive(Debug, Clone)]
pub struct FilenameCodec {
    clips: BTreeSet<String>,
}

impl FilenameCodec {
    /// Create a codec aware of the given source clip names.
    pub fn new<I: IntoIterator<Item = String>>(clips: I) -> Self {
        FilenameCodec {
            clips: clips.into_iter().collect(),
        }
    }

    /// The known source clip names.
    pub fn clips(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|s| s.as_str())
    }

    /// Parse a request token such as `bunny_av1_720p_30fps_60s_23crf_opus_128kbps.webm`.
    ///
    /// An empty token parses to an all-unspecified spec; defaulting is the
    /// caller's job.
    pub fn parse(&self, token: &str) -> Result<VideoSpec, ParseError> {
        let mut spec = VideoSpec::default();

        let stem = match token.rsplit_once('.') {
            Some((stem, ext)) if ext.is_empty() => stem,
            Some((stem, ext)) => {
                let ext = ext.to_ascii_lowercase();
                let container = ext
                    .parse::<Container>()
                    .map_err(|_| ParseError::InvalidContainer(ext.clone()))?;
                spec.container = Some(container);
                stem
            }
            None => token,
        };

        for part in stem.split('_') {
            self.classify(part, &mut spec);
        }

        Ok(spec)
    }

    /// Try each token class in sequence; the first that matches sets its
    /// field, overwriting any earlier token of the same class.
    fn classify(&self, part: &str, spec: &mut VideoSpec) {
        if part.contains('x') {
            if let Ok(res) = part.parse::<Resolution>() {
                spec.resolution = Some(res);
                return;
            }
        }

        if let Some(v) = part.strip_suffix("fps") {
            if let Ok(fps) = v.parse::<u32>() {
                spec.fps = Some(fps);
                return;
            }
        }

        // "kbps" before "s": both end in s.
        if let Some(v) = part.strip_suffix("kbps") {
            if let Ok(kbps) = v.parse::<u32>() {
                spec.audio_bitrate = Some(kbps);
                return;
            }
        }

        if let Some(v) = part.strip_suffix('s') {
            if let Ok(secs) = v.parse::<u32>() {
                spec.duration = Some(secs);
                return;
            }
        }

        if let Ok(bitrate) = part.parse::<Bitrate>() {
            spec.bitrate = Some(bitrate);
            return;
        }

        if let Some(res) = Resolution::named(part) {
            spec.resolution = Some(res);
            return;
        }

        if let Ok(codec) = part.parse::<VideoCodec>() {
            spec.codec = Some(codec);
            return;
        }

        if let Ok(codec) = part.parse::<AudioCodec>() {
            spec.audio_codec = Some(codec);
            return;
        }

        if self.clips.contains(part) {
            spec.name = Some(part.to_string());
        }

        // Anything else is silently ignored.
    }

    /// Render a spec into its canonical filename.
    ///
    /// Fields are emitted in a fixed order so the rendering is a stable
    /// cache key. Resolution, frame rate, and bitrate are suppressed when
    /// video is disabled; audio bitrate when audio is disabled.
    pub fn render(&self, spec: &VideoSpec) -> String {
        let mut parts: Vec<String> = Vec::new();
        let video_on = !matches!(spec.codec, Some(VideoCodec::NoVideo));
        let audio_on = !matches!(spec.audio_codec, Some(AudioCodec::NoAudio));

        if let Some(name) = &spec.name {
            parts.push(name.clone());
        }
        if let Some(codec) = spec.codec {
            parts.push(codec.to_string());
        }
        if video_on {
            if let Some(res) = spec.resolution {
                parts.push(res.to_string());
            }
            if let Some(fps) = spec.fps {
                parts.push(format!("{}fps", fps));
            }
        }
        if let Some(duration) = spec.duration {
            parts.push(format!("{}s", duration));
        }
        if video_on {
            if let Some(bitrate) = spec.bitrate {
                parts.push(bitrate.to_string());
            }
        }
        if let Some(codec) = spec.audio_codec {
            parts.push(codec.to_string());
        }
        if audio_on {
            if let Some(kbps) = spec.audio_bitrate {
                parts.push(format!("{}kbps", kbps));
            }
        }

        let mut filename = parts.join("_");
        if let Some(container) = spec.container {
            filename.push('.');
            filename.push_str(container.extension());
        }
        filename
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> FilenameCodec {
        FilenameCodec::new(["bunny".to_string(), "sunrise".to_string()])
    }

    #[test]
    fn test_parse_full_token() {
        let spec = codec()
            .parse("bunny_av1_1280x720_30fps_60s_23crf_opus_128kbps.webm")
            .unwrap();
        assert_eq!(spec.name.as_deref(), Some("bunny"));
        assert_eq!(spec.codec, Some(VideoCodec::Av1));
        assert_eq!(spec.resolution, Some(Resolution::new(1280, 720)));
        assert_eq!(spec.fps, Some(30));
        assert_eq!(spec.duration, Some(60));
        assert_eq!(spec.bitrate, Some(Bitrate::crf(23)));
        assert_eq!(spec.audio_codec, Some(AudioCodec::Opus));
        assert_eq!(spec.audio_bitrate, Some(128));
        assert_eq!(spec.container, Some(Container::Webm));
    }

    #[test]
    fn test_parse_is_order_independent() {
        let a = codec().parse("720p_h264_60s").unwrap();
        let b = codec().parse("60s_h264_720p").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_last_token_wins() {
        let spec = codec().parse("720p_h264_240p").unwrap();
        assert_eq!(spec.resolution, Some(Resolution::new(426, 240)));
    }

    #[test]
    fn test_invalid_container_rejected() {
        assert_eq!(
            codec().parse("h264_1280x720.avi"),
            Err(ParseError::InvalidContainer("avi".to_string()))
        );
        let spec = codec().parse("h264_1280x720.mp4").unwrap();
        assert_eq!(spec.container, Some(Container::Mp4));
    }

    #[test]
    fn test_empty_and_unknown_tokens() {
        let spec = codec().parse("").unwrap();
        assert!(spec.is_empty());

        // Garbage degrades to unspecified, never errors.
        let spec = codec().parse("wibble_99zz_kitten").unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_no_extension_leaves_container_unset() {
        let spec = codec().parse("bunny_720p").unwrap();
        assert_eq!(spec.container, None);
        assert_eq!(spec.name.as_deref(), Some("bunny"));
    }

    #[test]
    fn test_audio_bitrate_not_mistaken_for_duration() {
        let spec = codec().parse("128kbps").unwrap();
        assert_eq!(spec.audio_bitrate, Some(128));
        assert_eq!(spec.duration, None);
    }

    #[test]
    fn test_out_of_bounds_resolution_ignored() {
        let spec = codec().parse("9999x9999_h264").unwrap();
        assert_eq!(spec.resolution, None);
        assert_eq!(spec.codec, Some(VideoCodec::H264));
    }

    #[test]
    fn test_render_disabled_video() {
        let spec = VideoSpec {
            codec: Some(VideoCodec::NoVideo),
            resolution: Some(Resolution::new(1280, 720)),
            fps: Some(30),
            duration: Some(60),
            bitrate: Some(Bitrate::crf(25)),
            audio_codec: Some(AudioCodec::Aac),
            audio_bitrate: Some(128),
            ..Default::default()
        };
        assert_eq!(codec().render(&spec), "novideo_60s_aac_128kbps");
    }

    #[test]
    fn test_render_disabled_audio() {
        let spec = VideoSpec {
            codec: Some(VideoCodec::H264),
            resolution: Some(Resolution::new(854, 480)),
            duration: Some(20),
            audio_codec: Some(AudioCodec::NoAudio),
            audio_bitrate: Some(128),
            container: Some(Container::Mp4),
            ..Default::default()
        };
        assert_eq!(codec().render(&spec), "h264_854x480_20s_noaudio.mp4");
    }

    #[test]
    fn test_render_parse_roundtrip() {
        let spec = VideoSpec {
            name: Some("sunrise".to_string()),
            codec: Some(VideoCodec::Vp9),
            resolution: Some(Resolution::new(1920, 1080)),
            fps: Some(24),
            duration: Some(30),
            bitrate: Some(Bitrate::vbr(3000)),
            audio_codec: Some(AudioCodec::Vorbis),
            audio_bitrate: Some(96),
            container: Some(Container::Webm),
        };
        let c = codec();
        let rendered = c.render(&spec);
        assert_eq!(
            rendered,
            "sunrise_vp9_1920x1080_24fps_30s_3000vbr_vorbis_96kbps.webm"
        );
        let reparsed = c.parse(&rendered).unwrap();
        assert_eq!(c.render(&reparsed), rendered);
    }
}
