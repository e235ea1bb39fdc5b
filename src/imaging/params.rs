//! What a thumbnail job asks the backend for.
//!
//! [`thumbnails`](crate::thumbnails) builds one [`ThumbnailParams`] per photo
//! and hands it to an [`ImageBackend`](super::ImageBackend); nothing in here
//! touches pixels.

use std::path::PathBuf;

/// JPEG encoder quality, always within 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    /// Clamp a configured value into the encoder's range.
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// One thumbnail: read `source`, write a JPEG `width` pixels wide to
/// `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Height follows the oriented source's aspect ratio.
    pub width: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_quality_is_clamped() {
        assert_eq!(Quality::new(0).get(), 1);
        assert_eq!(Quality::new(75).get(), 75);
        assert_eq!(Quality::new(4000).get(), 100);
    }

    #[test]
    fn default_quality_matches_stock_config() {
        assert_eq!(Quality::default().get(), 80);
    }
}
