//! # loopcast-spec
//!
//! The bidirectional filename specification language used by loopcast.
//!
//! A request token such as `bunny_av1_1280x720_30fps_60s_23crf_opus_128kbps.webm`
//! describes a video artifact completely: source clip, codec, resolution,
//! frame rate, duration, bitrate, audio track, and container. This crate
//! parses such tokens into a [`VideoSpec`] and renders a spec back into its
//! canonical filename, which doubles as the artifact cache key.
//!
//! Parsing and rendering are pure; no I/O happens here.
//!
//! ## Example
//!
//! ```
//! use loopcast_spec::{catalog, FilenameCodec};
//!
//! let codec = FilenameCodec::new(["bunny".to_string()]);
//! let spec = codec.parse("bunny_720p_h264_30fps.mp4")?;
//! let resolved = spec.resolve(&catalog::default_spec());
//! assert_eq!(codec.render(&resolved), "bunny_h264_1280x720_30fps_20s_25crf_aac_128kbps.mp4");
//! # Ok::<(), loopcast_spec::ParseError>(())
//! ```

pub mod catalog;
mod codec;
mod filename;
mod resolution;
mod spec;

pub use codec::{AudioCodec, Bitrate, BitrateMode, Container, VideoCodec};
pub use filename::{FilenameCodec, ParseError};
pub use resolution::{Resolution, MAX_DIMENSION, MIN_DIMENSION};
pub use spec::VideoSpec;
