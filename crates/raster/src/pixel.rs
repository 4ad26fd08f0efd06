//! Source-over compositing of a solid color onto a straight-alpha RGBA8 pixel.
//!
//! Matches what a 2D canvas does for a `fillStyle` of `rgba(r, g, b, a)` on a
//! pixel fully covered by the shape.

use dot_reveal_core::Rgb;

/// Blends `color` at `alpha` over the 4-byte pixel `dst` in place.
///
/// `alpha` is clamped to [0, 1]; NaN draws nothing.
pub fn blend_over(dst: &mut [u8], color: Rgb, alpha: f64) {
    let src_a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    if src_a == 0.0 {
        return;
    }
    let dst_a = f64::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let mix = |s: u8, d: u8| {
        let c = (f64::from(s) * src_a + f64::from(d) * dst_a * (1.0 - src_a)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    dst[0] = mix(color.r, dst[0]);
    dst[1] = mix(color.g, dst[1]);
    dst[2] = mix(color.b, dst[2]);
    dst[3] = (out_a * 255.0).round() as u8;
}
