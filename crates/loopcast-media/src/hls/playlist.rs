//! HLS playlist structures.

use std::fmt::Write;

/// Media playlist for a single rendition.
#[derive(Debug, Clone)]
pub struct MediaPlaylist {
    /// Protocol version (7 for fMP4 segments).
    pub version: u32,
    /// Target duration in seconds.
    pub target_duration: u32,
    /// Media sequence number of the first segment.
    pub media_sequence: u64,
    /// Init segment URI (EXT-X-MAP).
    pub init_uri: Option<String>,
    /// Segment entries.
    pub segments: Vec<SegmentEntry>,
    /// Whether the playlist carries an end marker. Live playlists never do;
    /// that is what keeps players polling.
    pub ended: bool,
}

impl MediaPlaylist {
    /// Create a live playlist starting at the given media sequence.
    pub fn live(media_sequence: u64, target_duration: u32) -> Self {
        Self {
            version: 7,
            target_duration,
            media_sequence,
            init_uri: None,
            segments: Vec::new(),
            ended: false,
        }
    }

    /// Render to M3U8 string.
    pub fn render(&self) -> String {
        let mut out = String::new();

        writeln!(out, "#EXTM3U").unwrap();
        writeln!(out, "#EXT-X-VERSION:{}", self.version).unwrap();
        writeln!(out, "#EXT-X-TARGETDURATION:{}", self.target_duration).unwrap();
        writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{}", self.media_sequence).unwrap();

        if let Some(ref init_uri) = self.init_uri {
            writeln!(out, "#EXT-X-MAP:URI=\"{}\"", init_uri).unwrap();
        }

        for segment in &self.segments {
            if segment.discontinuity {
                writeln!(out, "#EXT-X-DISCONTINUITY").unwrap();
            }
            writeln!(out, "#EXTINF:{:.6},", segment.duration).unwrap();
            writeln!(out, "{}", segment.uri).unwrap();
        }

        if self.ended {
            writeln!(out, "#EXT-X-ENDLIST").unwrap();
        }

        out
    }
}

/// A segment entry in the playlist.
#[derive(Debug, Clone)]
pub struct SegmentEntry {
    /// Duration in seconds.
    pub duration: f64,
    /// Segment URI.
    pub uri: String,
    /// Discontinuity before this segment: its timestamps restart relative
    /// to the previous one.
    pub discontinuity: bool,
}

/// Master playlist referencing every rendition tier.
#[derive(Debug, Clone, Default)]
pub struct MasterPlaylist {
    /// Stream variants.
    pub streams: Vec<StreamInfo>,
}

impl MasterPlaylist {
    /// Create an empty master playlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream variant.
    pub fn add_stream(mut self, stream: StreamInfo) -> Self {
        self.streams.push(stream);
        self
    }

    /// Render to M3U8 string.
    pub fn render(&self) -> String {
        let mut out = String::new();

        writeln!(out, "#EXTM3U").unwrap();
        writeln!(out, "#EXT-X-VERSION:6").unwrap();

        for stream in &self.streams {
            writeln!(
                out,
                "#EXT-X-STREAM-INF:BANDWIDTH={},NAME={},RESOLUTION={}x{}",
                stream.bandwidth, stream.name, stream.width, stream.height
            )
            .unwrap();
            writeln!(out, "{}", stream.uri).unwrap();
        }

        out
    }
}

/// Stream variant information.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Tier label (e.g. `720p`).
    pub name: String,
    /// Media playlist URI.
    pub uri: String,
    /// Approximate bandwidth in bits per second.
    pub bandwidth: u32,
    /// Video width.
    pub width: u32,
    /// Video height.
    pub height: u32,
}
