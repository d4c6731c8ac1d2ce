//! # loopcast-av
//!
//! External-tool layer for loopcast: probing media files with ffprobe and
//! driving ffmpeg encodes.
//!
//! This crate owns everything that shells out:
//!
//! - Probing files to extract stream geometry, duration, and rotation
//!   side-data (used for orientation-aware HLS pregeneration and the
//!   info endpoint)
//! - Building the exact ffmpeg argument sequences for single-artifact
//!   transcodes and HLS rendition encodes
//! - Running those invocations asynchronously with cancellation support
//! - Discovering which tools are installed
//!
//! Argument construction is pure and unit-tested; only the `run_*`
//! functions touch a subprocess.

mod encode;
mod error;
pub mod probe;
pub mod tools;

pub use encode::{
    generate_test_source, hls_encode_args, run_ffmpeg, scale_crop_filter, transcode_args,
    HLS_SEGMENT_SECONDS,
};
pub use error::{Error, Result};
pub use probe::{probe, MediaInfo, StreamInfo};
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
