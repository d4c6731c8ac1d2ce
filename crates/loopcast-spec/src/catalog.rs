//! Static catalog: baseline spec, popular combinations, HLS tiers.

use crate::codec::{AudioCodec, Bitrate, Container, VideoCodec};
use crate::resolution::Resolution;
use crate::spec::VideoSpec;

/// The hard-coded baseline every request is resolved against.
pub fn default_spec() -> VideoSpec {
    VideoSpec {
        name: Some("bunny".to_string()),
        resolution: Some(Resolution::new(1280, 720)),
        duration: Some(20),
        codec: Some(VideoCodec::H264),
        fps: Some(30),
        bitrate: Some(Bitrate::crf(25)),
        audio_codec: Some(AudioCodec::Aac),
        audio_bitrate: Some(128),
        container: Some(Container::Mp4),
    }
}

/// Popular specification combinations, pregenerated for every source clip.
///
/// Three resolutions for each of the three mainstream codec/container
/// pairings. The same CRF across codecs means the newer codecs come out
/// higher quality, which is the intent. Order is fixed; pregeneration
/// walks it front to back.
pub fn popular_combinations() -> Vec<VideoSpec> {
    let mut specs = Vec::new();

    let tiers = [
        (Resolution::new(854, 480), 96),
        (Resolution::new(1280, 720), 128),
        (Resolution::new(1920, 1080), 128),
    ];

    let families = [
        (VideoCodec::H264, AudioCodec::Aac, Container::Mp4),
        (VideoCodec::Av1, AudioCodec::Opus, Container::Webm),
        (VideoCodec::Vp9, AudioCodec::Opus, Container::Webm),
    ];

    for (codec, audio_codec, container) in families {
        for (resolution, audio_bitrate) in tiers {
            specs.push(VideoSpec {
                name: None,
                resolution: Some(resolution),
                duration: Some(20),
                codec: Some(codec),
                fps: Some(30),
                bitrate: Some(Bitrate::crf(25)),
                audio_codec: Some(audio_codec),
                audio_bitrate: Some(audio_bitrate),
                container: Some(container),
            });
        }
    }

    specs
}

/// One adaptive-streaming rendition tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HlsTier {
    /// Tier directory name and master-playlist label.
    pub name: &'static str,
    pub resolution: Resolution,
    /// Approximate bandwidth advertised in the master playlist, bits/s.
    pub bandwidth: u32,
}

/// The fixed rendition ladder for the simulated-live channel.
pub const HLS_TIERS: [HlsTier; 3] = [
    HlsTier {
        name: "480p",
        resolution: Resolution::new(854, 480),
        bandwidth: 800_000,
    },
    HlsTier {
        name: "720p",
        resolution: Resolution::new(1280, 720),
        bandwidth: 2_000_000,
    },
    HlsTier {
        name: "1080p",
        resolution: Resolution::new(1920, 1080),
        bandwidth: 5_000_000,
    },
];

/// Look up a tier by its directory name.
pub fn hls_tier(name: &str) -> Option<HlsTier> {
    HLS_TIERS.iter().find(|t| t.name == name).copied()
}
