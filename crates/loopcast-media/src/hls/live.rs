//! Virtual-live window computation.
//!
//! A rendition holds `N` usable physical chunks. Virtual segment `seq`
//! (a Unix timestamp) maps to physical chunk `seq mod N`, so the rendition
//! loops forever with a repeat period of `N` seconds. Where the modulo
//! wraps back to the start, the encoder's internal timestamps restart, so
//! the playlist must flag a discontinuity there.

use crate::hls::playlist::{MediaPlaylist, SegmentEntry};

/// Number of virtual segments exposed per playlist window.
pub const WINDOW_SEGMENTS: u64 = 5;

/// One virtual segment of the live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSlot {
    /// Virtual sequence number (Unix seconds).
    pub seq: u64,
    /// Physical chunk index this sequence maps to.
    pub chunk: u64,
    /// Whether the physical loop wrapped between the previous virtual
    /// segment and this one.
    pub discontinuity: bool,
}

/// Map a virtual sequence number to its physical chunk index.
pub fn chunk_index(seq: u64, usable_chunks: u64) -> u64 {
    seq % usable_chunks
}

/// Compute the window of virtual segments starting at `now`.
///
/// A slot is flagged discontinuous when its mapped chunk index is lower
/// than the previous sequence's, including against the segment just before
/// the window (players joining mid-loop still need the first marker).
pub fn live_window(now: u64, usable_chunks: u64) -> Vec<WindowSlot> {
    if usable_chunks == 0 {
        return Vec::new();
    }

    (now..now + WINDOW_SEGMENTS)
        .map(|seq| {
            let chunk = chunk_index(seq, usable_chunks);
            let discontinuity = match seq.checked_sub(1) {
                Some(prev) => chunk < chunk_index(prev, usable_chunks),
                None => false,
            };
            WindowSlot {
                seq,
                chunk,
                discontinuity,
            }
        })
        .collect()
}

/// Build the live media playlist for one rendition at time `now`.
///
/// Segments are named `media.<seq>.mp4`; the init segment is the shared
/// `init.mp4` next to the chunks. No end marker is emitted, so the channel
/// appears perpetually live.
pub fn live_media_playlist(now: u64, usable_chunks: u64, segment_duration: u32) -> MediaPlaylist {
    let mut playlist = MediaPlaylist::live(now, segment_duration);
    playlist.init_uri = Some("init.mp4".to_string());
    playlist.segments = live_window(now, usable_chunks)
        .into_iter()
        .map(|slot| SegmentEntry {
            duration: f64::from(segment_duration),
            uri: format!("media.{}.mp4", slot.seq),
            discontinuity: slot.discontinuity,
        })
        .collect();
    playlist
}
