#![deny(unsafe_code)]
//! CPU render surface for dot-reveal.
//!
//! [`RasterSurface`] implements [`RenderSurface`] over an in-memory RGBA8
//! buffer sized like a canvas backing store: content size times device pixel
//! ratio. It is what the CLI renders into, and what tests use to check actual
//! pixels rather than draw calls.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use dot_reveal_core::error::EngineError;
use dot_reveal_core::{FrameHandle, FrameScheduler, RenderSurface, Rgb, SurfaceSize};

use crate::pixel::blend_over;

/// An RGBA8 buffer that dots are rasterized into.
///
/// Coverage is binary: a device pixel is painted when its center lies inside
/// the disc. Once released, draw calls are ignored.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    size: SurfaceSize,
    width: u32,
    height: u32,
    data: Vec<u8>,
    released: bool,
}

impl RasterSurface {
    /// Creates a surface whose host content box is `size`. The buffer stays
    /// empty until [`RenderSurface::resize_backing`] is called.
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            width: 0,
            height: 0,
            data: Vec::new(),
            released: false,
        }
    }

    /// Changes the reported host size, as a window resize would.
    pub fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    /// Backing width in device pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Backing height in device pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of the device pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    /// True once the owning effect has been disposed.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl RenderSurface for RasterSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize_backing(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        let (width, height) = size.backing_dimensions()?;
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                EngineError::InvalidDimensions(format!("{width}x{height} buffer overflows usize"))
            })?;
        self.size = size;
        self.width = width;
        self.height = height;
        self.data = vec![0; len];
        log::debug!("raster backing resized to {width}x{height}");
        Ok(())
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64) {
        if self.released || self.data.is_empty() || !(radius > 0.0) {
            return;
        }
        let ratio = self.size.pixel_ratio;
        let (cx, cy, r) = (x * ratio, y * ratio, radius * ratio);
        if !(cx.is_finite() && cy.is_finite() && r.is_finite()) {
            return;
        }

        let x0 = (cx - r).floor().max(0.0) as u32;
        let y0 = (cy - r).floor().max(0.0) as u32;
        let x1 = ((cx + r).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + r).ceil().max(0.0) as u32).min(self.height);
        let r2 = r * r;
        let stride = self.width as usize;

        for py in y0..y1 {
            let dy = f64::from(py) + 0.5 - cy;
            for px in x0..x1 {
                let dx = f64::from(px) + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    let i = (py as usize * stride + px as usize) * 4;
                    blend_over(&mut self.data[i..i + 4], color, alpha);
                }
            }
        }
    }

    fn release(&mut self) {
        self.released = true;
        self.data = Vec::new();
        self.width = 0;
        self.height = 0;
    }
}

/// Frame scheduler for offline rendering: every request is granted at once
/// and the caller delivers frames by calling `on_frame` itself.
#[derive(Debug, Default)]
pub struct HeadlessScheduler {
    next: FrameHandle,
    pending: Option<FrameHandle>,
}

impl HeadlessScheduler {
    /// The most recently requested frame that has not been cancelled.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

impl FrameScheduler for HeadlessScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError> {
        self.next = self.next.wrapping_add(1);
        self.pending = Some(self.next);
        Ok(self.next)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dot_reveal_core::{RevealConfig, RevealEffect, RevealEngine};

    fn surface(w: f64, h: f64, ratio: f64) -> RasterSurface {
        let size = SurfaceSize::with_pixel_ratio(w, h, ratio);
        let mut s = RasterSurface::new(size);
        s.resize_backing(size).unwrap();
        s
    }

    #[test]
    fn backing_is_scaled_by_pixel_ratio() {
        let s = surface(50.0, 20.0, 2.0);
        assert_eq!((s.width(), s.height()), (100, 40));
        assert_eq!(s.data().len(), 100 * 40 * 4);
    }

    #[test]
    fn zero_area_surface_has_empty_buffer_and_ignores_draws() {
        let mut s = surface(0.0, 20.0, 1.0);
        s.fill_circle(0.0, 0.0, 3.0, Rgb::CYAN, 1.0);
        assert!(s.data().is_empty());
    }

    #[test]
    fn fill_circle_paints_disc_around_center() {
        let mut s = surface(20.0, 20.0, 1.0);
        s.fill_circle(10.0, 10.0, 3.0, Rgb::CYAN, 1.0);
        assert_eq!(s.pixel(10, 10), Some([0, 255, 255, 255]));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        // area of r=3 disc is ~28 pixels
        let painted = s.painted_pixels();
        assert!((24..=32).contains(&painted), "painted {painted}");
    }

    #[test]
    fn fill_circle_scales_with_pixel_ratio() {
        let mut s = surface(20.0, 20.0, 2.0);
        s.fill_circle(10.0, 10.0, 3.0, Rgb::CYAN, 1.0);
        assert_eq!(s.pixel(20, 20), Some([0, 255, 255, 255]));
        let painted = s.painted_pixels();
        assert!((100..=125).contains(&painted), "painted {painted}");
    }

    #[test]
    fn fill_circle_clips_at_edges() {
        let mut s = surface(8.0, 8.0, 1.0);
        s.fill_circle(0.0, 0.0, 3.0, Rgb::CYAN, 1.0);
        s.fill_circle(-100.0, 4.0, 3.0, Rgb::CYAN, 1.0);
        s.fill_circle(4.0, 100.0, 3.0, Rgb::CYAN, 1.0);
        assert!(s.painted_pixels() > 0);
        assert_eq!(s.pixel(7, 7), Some([0, 0, 0, 0]));
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut s = surface(8.0, 8.0, 1.0);
        s.fill_circle(4.0, 4.0, 3.0, Rgb::CYAN, 1.0);
        s.clear();
        assert_eq!(s.painted_pixels(), 0);
    }

    #[test]
    fn release_drops_buffer_and_ignores_later_draws() {
        let mut s = surface(8.0, 8.0, 1.0);
        s.release();
        s.fill_circle(4.0, 4.0, 3.0, Rgb::CYAN, 1.0);
        assert!(s.is_released());
        assert!(s.data().is_empty());
        assert_eq!(s.pixel(4, 4), None);
    }

    #[test]
    fn engine_frame_paints_only_near_center_early_on() {
        let size = SurfaceSize::new(200.0, 200.0);
        let mut s = RasterSurface::new(size);
        s.resize_backing(size).unwrap();
        let config = RevealConfig {
            animation_speed: 1.0,
            ..RevealConfig::default()
        };
        let mut engine = RevealEngine::new(size, config, 9).unwrap();
        engine.advance_frame(&mut s);

        // t = 0.016: only dots within ~1.6 px of the center can have crossed
        // their threshold, so corners stay empty
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(199, 199), Some([0, 0, 0, 0]));
        assert!(s.painted_pixels() <= 50);
    }

    #[test]
    fn headless_effect_runs_and_disposes_cleanly() {
        let size = SurfaceSize::new(64.0, 64.0);
        let mut effect = RevealEffect::new(
            RasterSurface::new(size),
            HeadlessScheduler::default(),
            RevealConfig::default(),
            5,
        )
        .unwrap();
        assert_eq!(effect.surface().width(), 64);
        for _ in 0..20 {
            assert!(effect.on_frame());
        }
        assert!(effect.surface().painted_pixels() > 0);

        effect.dispose();
        effect.dispose();
        assert_eq!(effect.scheduler().pending(), None);
        assert!(effect.surface().is_released());
    }

    #[test]
    fn resize_reallocates_backing_and_regrows_grid() {
        let size = SurfaceSize::new(32.0, 32.0);
        let mut effect = RevealEffect::new(
            RasterSurface::new(size),
            HeadlessScheduler::default(),
            RevealConfig::default(),
            5,
        )
        .unwrap();
        effect
            .surface_mut()
            .set_size(SurfaceSize::with_pixel_ratio(48.0, 16.0, 2.0));
        effect.on_surface_resize();
        assert_eq!((effect.surface().width(), effect.surface().height()), (96, 32));
        assert_eq!(effect.engine().particles().len(), 12 * 4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fill_circle_stays_inside_disc_and_buffer(
                x in -50.0_f64..100.0,
                y in -50.0_f64..100.0,
                radius in 0.0_f64..40.0,
                ratio in 0.5_f64..3.0,
            ) {
                let mut s = surface(40.0, 30.0, ratio);
                let len = s.data().len();
                s.fill_circle(x, y, radius, Rgb::CYAN, 1.0);
                prop_assert_eq!(s.data().len(), len);

                let (cx, cy, r) = (x * ratio, y * ratio, radius * ratio);
                for py in 0..s.height() {
                    for px in 0..s.width() {
                        if s.pixel(px, py).map_or(0, |p| p[3]) == 0 {
                            continue;
                        }
                        let dx = f64::from(px) + 0.5 - cx;
                        let dy = f64::from(py) + 0.5 - cy;
                        prop_assert!(
                            dx * dx + dy * dy <= r * r + 1e-9,
                            "pixel ({px}, {py}) painted outside disc at ({cx}, {cy}) r={r}"
                        );
                    }
                }
            }
        }
    }
}
