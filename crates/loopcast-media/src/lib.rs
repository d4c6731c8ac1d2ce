//! # loopcast-media
//!
//! HLS playlist structures and the virtual-live window computation.
//!
//! The virtual-live trick: a rendition is a small set of fixed-duration
//! chunks on disk, and the current Unix time doubles as an ever-increasing
//! media sequence number. Mapping each virtual sequence number onto a
//! physical chunk with a modulo turns finite media into an unbounded live
//! channel; the only state is the wall clock, so every server and every
//! viewer computes the same window.
//!
//! Everything here is pure and deterministic given `now`.

pub mod hls;

pub use hls::live::{live_media_playlist, live_window, WindowSlot, WINDOW_SEGMENTS};
pub use hls::playlist::{MasterPlaylist, MediaPlaylist, SegmentEntry, StreamInfo};
