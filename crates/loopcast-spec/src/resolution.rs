//! Resolution presets and `WxH` parsing.

use crate::filename::ParseError;

/// Smallest accepted dimension on either axis.
pub const MIN_DIMENSION: u32 = 64;
/// Largest accepted dimension on either axis (4K).
pub const MAX_DIMENSION: u32 = 3840;

/// A video frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Named presets, bit-exact.
const PRESETS: &[(&str, Resolution)] = &[
    ("240p", Resolution::new(426, 240)),
    ("360p", Resolution::new(640, 360)),
    ("480p", Resolution::new(854, 480)),
    ("720p", Resolution::new(1280, 720)),
    ("1080p", Resolution::new(1920, 1080)),
    ("1440p", Resolution::new(2560, 1440)),
    ("4k", Resolution::new(3840, 2160)),
];

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Resolution { width, height }
    }

    /// Look up a named preset such as `720p` or `4k`.
    pub fn named(name: &str) -> Option<Resolution> {
        PRESETS
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, res)| *res)
    }

    /// Swap width and height (portrait orientation).
    pub fn swapped(&self) -> Resolution {
        Resolution::new(self.height, self.width)
    }

    /// Whether both dimensions fall inside the accepted bounds.
    pub fn in_bounds(&self) -> bool {
        (MIN_DIMENSION..=MAX_DIMENSION).contains(&self.width)
            && (MIN_DIMENSION..=MAX_DIMENSION).contains(&self.height)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = ParseError;

    /// Parse `720p`-style presets or explicit `WxH`, bounds-checked.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(res) = Resolution::named(s) {
            return Ok(res);
        }

        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| ParseError::InvalidToken(s.to_string()))?;
        let width = w
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidToken(s.to_string()))?;
        let height = h
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidToken(s.to_string()))?;

        let res = Resolution::new(width, height);
        if !res.in_bounds() {
            return Err(ParseError::InvalidToken(s.to_string()));
        }
        Ok(res)
    }
}
