//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Height of an image scaled to `width`, keeping the source aspect ratio.
///
/// Rounds to the nearest pixel and never returns zero, so very wide
/// panoramas still produce a one-pixel-high thumbnail.
///
/// ```
/// # use photoblog::imaging::scaled_height;
/// assert_eq!(scaled_height((4000, 3000), 200), 150);
/// assert_eq!(scaled_height((3000, 4000), 200), 267);
/// ```
pub fn scaled_height(source: (u32, u32), width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return 1;
    }
    let h = (width as f64 * src_h as f64 / src_w as f64).round() as u32;
    h.max(1)
}
