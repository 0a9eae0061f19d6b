//! Pure calculation functions for picture placement.
//!
//! All functions here are pure and testable without any I/O or images.
//! Sizes use integer pixel math so results never depend on float rounding.

/// Largest size that fits inside `bounds` while keeping the source aspect
/// ratio (letterbox / pillarbox fit).
///
/// One edge matches `bounds` exactly; the other is floored and never drops
/// below 1 px.
///
/// # Examples
/// ```
/// # use photodeck::imaging::fit_within;
/// // 4:3 source on a 4:3 slide fills it exactly
/// assert_eq!(fit_within((4000, 3000), (960, 720)), (960, 720));
///
/// // 16:9 source on a 4:3 slide gets bars above and below
/// assert_eq!(fit_within((1920, 1080), (960, 720)), (960, 540));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as u64, source.1.max(1) as u64);
    let (max_w, max_h) = (bounds.0.max(1) as u64, bounds.1.max(1) as u64);

    if src_w * max_h >= src_h * max_w {
        // Source is at least as wide as the bounds: width is the limit
        let h = (src_h * max_w / src_w).clamp(1, max_h);
        (max_w as u32, h as u32)
    } else {
        let w = (src_w * max_h / src_h).clamp(1, max_w);
        (w as u32, max_h as u32)
    }
}

/// Size when scaling to exactly `width`, keeping aspect ratio.
///
/// The height is unbounded: a tall source ends up taller than the slide.
pub fn fit_width(source: (u32, u32), width: u32) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as u64, source.1 as u64);
    let h = (src_h * width as u64 / src_w).max(1);
    (width, h.min(u32::MAX as u64) as u32)
}

/// Offset that centers `inner` inside `outer` along one axis.
///
/// Negative when `inner` overflows; floors toward the top-left.
pub fn center_offset(outer: u32, inner: u32) -> i64 {
    (outer as i64 - inner as i64).div_euclid(2)
}
