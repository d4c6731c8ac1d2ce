//! Codec, container, and bitrate enums.

use crate::filename::ParseError;

/// Video codec selection, including the disabled sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// H.264/AVC
    H264,
    /// H.265/HEVC
    H265,
    /// AV1
    Av1,
    /// VP9
    Vp9,
    /// No video track.
    NoVideo,
}

impl VideoCodec {
    /// All valid logical codec names.
    pub const ALL: [VideoCodec; 5] = [
        VideoCodec::H264,
        VideoCodec::H265,
        VideoCodec::Av1,
        VideoCodec::Vp9,
        VideoCodec::NoVideo,
    ];

    /// The ffmpeg encoder name, or `None` when the track is disabled.
    pub fn encoder(&self) -> Option<&'static str> {
        match self {
            VideoCodec::H264 => Some("libx264"),
            VideoCodec::H265 => Some("libx265"),
            VideoCodec::Av1 => Some("libaom-av1"),
            VideoCodec::Vp9 => Some("libvpx-vp9"),
            VideoCodec::NoVideo => None,
        }
    }

    /// Encoder tuning arguments. Default encoder settings are far too slow
    /// for on-demand latency budgets; these trade compression for speed.
    pub fn tuning_args(&self) -> &'static [&'static str] {
        match self {
            VideoCodec::H264 => &["-preset", "fast", "-threads", "0"],
            VideoCodec::H265 => &["-preset", "fast", "-x265-params", "pools=+"],
            VideoCodec::Av1 => &["-cpu-used", "8", "-row-mt", "1", "-tiles", "2x2"],
            VideoCodec::Vp9 => &[
                "-speed",
                "4",
                "-tile-columns",
                "2",
                "-tile-rows",
                "1",
                "-threads",
                "8",
            ],
            VideoCodec::NoVideo => &[],
        }
    }

    /// Whether this selection disables the video track.
    pub fn is_disabled(&self) -> bool {
        matches!(self, VideoCodec::NoVideo)
    }
}

impl std::fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
            VideoCodec::Av1 => "av1",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::NoVideo => "novideo",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for VideoCodec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h264" => Ok(VideoCodec::H264),
            "h265" => Ok(VideoCodec::H265),
            "av1" => Ok(VideoCodec::Av1),
            "vp9" => Ok(VideoCodec::Vp9),
            "novideo" => Ok(VideoCodec::NoVideo),
            _ => Err(ParseError::InvalidToken(s.to_string())),
        }
    }
}

/// Audio codec selection, including the disabled sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCodec {
    /// AAC-LC
    Aac,
    /// Opus
    Opus,
    /// MP3
    Mp3,
    /// Vorbis
    Vorbis,
    /// No audio track.
    NoAudio,
}

impl AudioCodec {
    /// All valid logical codec names.
    pub const ALL: [AudioCodec; 5] = [
        AudioCodec::Aac,
        AudioCodec::Opus,
        AudioCodec::Mp3,
        AudioCodec::Vorbis,
        AudioCodec::NoAudio,
    ];

    /// The ffmpeg encoder name, or `None` when the track is disabled.
    ///
    /// aac, mp3 and vorbis resolve through ffmpeg's default encoder for the
    /// codec name; only opus needs the explicit libopus encoder.
    pub fn encoder(&self) -> Option<&'static str> {
        match self {
            AudioCodec::Aac => Some("aac"),
            AudioCodec::Opus => Some("libopus"),
            AudioCodec::Mp3 => Some("mp3"),
            AudioCodec::Vorbis => Some("vorbis"),
            AudioCodec::NoAudio => None,
        }
    }

    /// Whether this selection disables the audio track.
    pub fn is_disabled(&self) -> bool {
        matches!(self, AudioCodec::NoAudio)
    }
}

impl std::fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Opus => "opus",
            AudioCodec::Mp3 => "mp3",
            AudioCodec::Vorbis => "vorbis",
            AudioCodec::NoAudio => "noaudio",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for AudioCodec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aac" => Ok(AudioCodec::Aac),
            "opus" => Ok(AudioCodec::Opus),
            "mp3" => Ok(AudioCodec::Mp3),
            "vorbis" => Ok(AudioCodec::Vorbis),
            "noaudio" => Ok(AudioCodec::NoAudio),
            _ => Err(ParseError::InvalidToken(s.to_string())),
        }
    }
}

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// MPEG-4 Part 14
    Mp4,
    /// WebM
    Webm,
}

impl Container {
    /// All whitelisted containers.
    pub const ALL: [Container; 2] = [Container::Mp4, Container::Webm];

    /// The file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for Container {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mp4" => Ok(Container::Mp4),
            "webm" => Ok(Container::Webm),
            _ => Err(ParseError::InvalidContainer(s.to_string())),
        }
    }
}

/// How the video bitrate token is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitrateMode {
    /// Constant quality (constant rate factor).
    Crf,
    /// Constrained bitrate: target, max, and buffer all pinned.
    Cbr,
    /// Target bitrate only.
    Vbr,
}

impl BitrateMode {
    fn suffix(&self) -> &'static str {
        match self {
            BitrateMode::Crf => "crf",
            BitrateMode::Cbr => "cbr",
            BitrateMode::Vbr => "vbr",
        }
    }
}

/// A bitrate token: a value plus its interpretation mode.
///
/// Renders as `25crf`, `3000cbr`, or `3000vbr`. For CRF the value is a
/// quality factor; for CBR/VBR it is kilobits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitrate {
    pub value: u32,
    pub mode: BitrateMode,
}

impl Bitrate {
    pub fn crf(value: u32) -> Self {
        Bitrate {
            value,
            mode: BitrateMode::Crf,
        }
    }

    pub fn cbr(value: u32) -> Self {
        Bitrate {
            value,
            mode: BitrateMode::Cbr,
        }
    }

    pub fn vbr(value: u32) -> Self {
        Bitrate {
            value,
            mode: BitrateMode::Vbr,
        }
    }
}

impl std::fmt::Display for Bitrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.mode.suffix())
    }
}

impl std::str::FromStr for Bitrate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, mode) = if let Some(v) = s.strip_suffix("crf") {
            (v, BitrateMode::Crf)
        } else if let Some(v) = s.strip_suffix("cbr") {
            (v, BitrateMode::Cbr)
        } else if let Some(v) = s.strip_suffix("vbr") {
            (v, BitrateMode::Vbr)
        } else {
            return Err(ParseError::InvalidToken(s.to_string()));
        };

        let value = digits
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidToken(s.to_string()))?;

        Ok(Bitrate { value, mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_codec_roundtrip() {
        for codec in VideoCodec::ALL {
            assert_eq!(codec.to_string().parse::<VideoCodec>().unwrap(), codec);
        }
    }

    #[test]
    fn test_audio_codec_roundtrip() {
        for codec in AudioCodec::ALL {
            assert_eq!(codec.to_string().parse::<AudioCodec>().unwrap(), codec);
        }
    }

    #[test]
    fn test_encoder_names() {
        assert_eq!(VideoCodec::Av1.encoder(), Some("libaom-av1"));
        assert_eq!(VideoCodec::Vp9.encoder(), Some("libvpx-vp9"));
        assert_eq!(VideoCodec::NoVideo.encoder(), None);
        assert_eq!(AudioCodec::Opus.encoder(), Some("libopus"));
        assert_eq!(AudioCodec::NoAudio.encoder(), None);
    }

    #[test]
    fn test_bitrate_parse() {
        assert_eq!("25crf".parse::<Bitrate>().unwrap(), Bitrate::crf(25));
        assert_eq!("3000cbr".parse::<Bitrate>().unwrap(), Bitrate::cbr(3000));
        assert_eq!("3000vbr".parse::<Bitrate>().unwrap(), Bitrate::vbr(3000));
        assert!("crf".parse::<Bitrate>().is_err());
        assert!("25xyz".parse::<Bitrate>().is_err());
    }

    #[test]
    fn test_bitrate_display() {
        assert_eq!(Bitrate::crf(25).to_string(), "25crf");
        assert_eq!(Bitrate::vbr(3000).to_string(), "3000vbr");
    }

    #[test]
    fn test_container_whitelist() {
        assert_eq!("mp4".parse::<Container>().unwrap(), Container::Mp4);
        assert_eq!("webm".parse::<Container>().unwrap(), Container::Webm);
        assert!(matches!(
            "avi".parse::<Container>(),
            Err(ParseError::InvalidContainer(_))
        ));
    }
}
