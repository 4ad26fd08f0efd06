//! Particle grid generation and the per-particle reveal law.
//!
//! The surface is tiled in square cells of [`CELL_SIZE`] CSS pixels with one
//! particle at each cell origin. A particle's reveal threshold grows with its
//! distance from the surface center, so the grid materializes outward.

use crate::config::RevealConfig;
use crate::prng::Xorshift64;
use crate::surface::SurfaceSize;
use glam::DVec2;

/// Edge length of one grid cell.
pub const CELL_SIZE: f64 = 4.0;
/// Threshold contribution per unit of distance from the center.
const DISTANCE_DELAY: f64 = 0.01;
/// Threshold contribution of a jitter of 1.0.
const JITTER_DELAY: f64 = 0.15;
/// Time a particle holds before it starts fading.
pub const FADE_DELAY: f64 = 0.1;
/// Fade-out slope; the fade lasts `1 / FADE_RATE` time units.
pub const FADE_RATE: f64 = 1.25;

/// One dot of the reveal grid. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: DVec2,
    pub radius: f64,
    pub distance_from_center: f64,
    /// Random reveal offset in [0, 1).
    pub reveal_jitter: f64,
    pub color_index: usize,
    pub opacity_index: usize,
}

impl Particle {
    /// Clock value after which this particle is visible.
    pub fn reveal_threshold(&self) -> f64 {
        self.distance_from_center * DISTANCE_DELAY + self.reveal_jitter * JITTER_DELAY
    }

    /// Opacity multiplier at `time`, in [0, 1]. Zero before the reveal and after the fade.
    ///
    /// Holds at 1 for [`FADE_DELAY`] after the threshold, then falls linearly
    /// to 0 over `1 / FADE_RATE`.
    pub fn fade_factor(&self, time: f64) -> f64 {
        let threshold = self.reveal_threshold();
        if time <= threshold {
            return 0.0;
        }
        (1.0 - (time - threshold - FADE_DELAY) * FADE_RATE).clamp(0.0, 1.0)
    }

    /// True while the particle should be drawn.
    pub fn is_drawn(&self, time: f64) -> bool {
        self.fade_factor(time) > 0.0
    }
}

/// Number of grid columns and rows covering `size`.
pub fn grid_dimensions(size: SurfaceSize) -> (usize, usize) {
    if size.is_empty() {
        return (0, 0);
    }
    (
        (size.width / CELL_SIZE).ceil() as usize,
        (size.height / CELL_SIZE).ceil() as usize,
    )
}

/// Builds a fresh grid for `size`, drawing jitter and palette indices from `rng`.
///
/// Layout depends only on `size`; jitter and palette indices are new on every call.
/// Returns an empty grid for an empty size or an empty palette.
pub fn generate_grid(size: SurfaceSize, config: &RevealConfig, rng: &mut Xorshift64) -> Vec<Particle> {
    let (cols, rows) = grid_dimensions(size);
    let center = DVec2::new(size.width / 2.0, size.height / 2.0);
    let mut particles = Vec::with_capacity(cols.saturating_mul(rows));

    for i in 0..cols {
        for j in 0..rows {
            let position = DVec2::new(i as f64 * CELL_SIZE, j as f64 * CELL_SIZE);
            let reveal_jitter = rng.next_f64();
            let (Some(color_index), Some(opacity_index)) = (
                rng.next_index(config.colors.len()),
                rng.next_index(config.opacities.len()),
            ) else {
                return Vec::new();
            };
            particles.push(Particle {
                position,
                radius: config.dot_size,
                distance_from_center: position.distance(center),
                reveal_jitter,
                color_index,
                opacity_index,
            });
        }
    }
    particles
}
