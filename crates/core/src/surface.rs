//! The 2D immediate-mode drawing surface an engine renders into.
//!
//! Coordinates passed to [`RenderSurface::fill_circle`] are in CSS pixels; a
//! surface scales them by its device pixel ratio, the way a canvas context does
//! after `ctx.scale(dpr, dpr)`.

use crate::color::Rgb;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Content-box size of a host surface plus its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f64,
}

impl SurfaceSize {
    /// A size at device pixel ratio 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_pixel_ratio(width, height, 1.0)
    }

    /// Non-finite or non-positive ratios fall back to 1.
    pub fn with_pixel_ratio(width: f64, height: f64, pixel_ratio: f64) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// True when nothing can be drawn: a dimension that is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    /// Backing-store dimensions in device pixels, `(0, 0)` for an empty size.
    pub fn backing_dimensions(&self) -> Result<(u32, u32), EngineError> {
        if self.is_empty() {
            return Ok((0, 0));
        }
        let to_px = |css: f64| {
            let px = (css * self.pixel_ratio).ceil();
            if px > u32::MAX as f64 {
                Err(EngineError::InvalidDimensions(format!(
                    "{css} css px at ratio {} overflows u32",
                    self.pixel_ratio
                )))
            } else {
                Ok(px as u32)
            }
        };
        Ok((to_px(self.width)?, to_px(self.height)?))
    }
}

/// Drawing operations the reveal engine needs from its host.
pub trait RenderSurface {
    /// Current content-box size of the host element.
    fn size(&self) -> SurfaceSize;

    /// Resizes the backing store to match `size`, resetting the device-pixel scale.
    fn resize_backing(&mut self, size: SurfaceSize) -> Result<(), EngineError>;

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Fills a disc centered at `(x, y)` with `color` at `alpha` in [0, 1].
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64);

    /// Detaches the surface from its host. Called once, on disposal.
    fn release(&mut self) {}
}
