//! The reveal engine: particle grid, logical clock, and per-frame drawing.
//!
//! [`RevealEngine`] owns all animation state for one effect instance. It knows
//! nothing about frame scheduling; [`RevealEffect`](crate::effect::RevealEffect)
//! binds it to a surface and a scheduler.

use crate::color::Rgb;
use crate::config::RevealConfig;
use crate::error::EngineError;
use crate::particle::{generate_grid, Particle};
use crate::prng::Xorshift64;
use crate::surface::{RenderSurface, SurfaceSize};
use glam::DVec2;
use serde_json::{json, Value};

/// Clock advance per frame at `animation_speed = 1`, one 60 Hz refresh.
pub const NOMINAL_FRAME_INTERVAL: f64 = 0.016;

/// Object-safe view of a frame-stepped animation engine.
pub trait Engine {
    /// Advance the logical clock by one frame.
    fn step(&mut self);

    /// Current logical clock value.
    fn time(&self) -> f64;

    /// Particles the engine currently draws from.
    fn particles(&self) -> &[Particle];

    /// Current configuration and clock as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing every configuration field.
    fn param_schema(&self) -> Value {
        RevealConfig::schema()
    }
}

/// A dot the engine would draw at the current clock value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub position: DVec2,
    pub radius: f64,
    pub color: Rgb,
    pub opacity: f64,
}

/// Particle reveal engine state for a single effect instance.
#[derive(Debug, Clone)]
pub struct RevealEngine {
    config: RevealConfig,
    size: SurfaceSize,
    time: f64,
    frames: u64,
    particles: Vec<Particle>,
    rng: Xorshift64,
}

impl RevealEngine {
    /// Creates an engine for a surface of `size` and generates its first grid.
    ///
    /// Returns `EngineError::InvalidConfig` if `config` fails validation. An empty
    /// `size` is not an error; the engine simply has no particles.
    pub fn new(size: SurfaceSize, config: RevealConfig, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        let mut engine = Self {
            config,
            size,
            time: 0.0,
            frames: 0,
            particles: Vec::new(),
            rng: Xorshift64::new(seed),
        };
        engine.regenerate_grid(size);
        Ok(engine)
    }

    /// Rebuilds the particle grid for `size`.
    ///
    /// Layout and count depend only on `size`; jitter and palette indices are
    /// re-randomized on every call, restarting the sweep pattern.
    pub fn regenerate_grid(&mut self, size: SurfaceSize) {
        self.size = size;
        self.particles = generate_grid(size, &self.config, &mut self.rng);
        log::debug!(
            "regenerated {} particles for {}x{} surface",
            self.particles.len(),
            size.width,
            size.height
        );
    }

    /// Advances the clock by `animation_speed * NOMINAL_FRAME_INTERVAL`.
    pub fn advance_clock(&mut self) {
        self.time += self.config.animation_speed * NOMINAL_FRAME_INTERVAL;
        self.frames += 1;
    }

    /// Advances the clock one frame and draws the result onto `surface`.
    pub fn advance_frame<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        self.advance_clock();
        self.render(surface);
    }

    /// Clears `surface` and draws every dot visible at the current clock.
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        for dot in self.visible_dots() {
            surface.fill_circle(dot.position.x, dot.position.y, dot.radius, dot.color, dot.opacity);
        }
    }

    /// Dots drawn at the current clock, in grid order.
    pub fn visible_dots(&self) -> impl Iterator<Item = Dot> + '_ {
        let time = self.time;
        self.particles.iter().filter_map(move |p| {
            let fade = p.fade_factor(time);
            if fade <= 0.0 {
                return None;
            }
            let color = *self.config.colors.get(p.color_index)?;
            let level = *self.config.opacities.get(p.opacity_index)?;
            Some(Dot {
                position: p.position,
                radius: p.radius,
                color,
                opacity: level * fade,
            })
        })
    }

    /// The validated configuration this engine draws with.
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Surface size the current grid was generated for.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Frames advanced since creation.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Current logical clock value; starts at 0 and only grows.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The current grid, column-major from the top-left cell.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

impl Engine for RevealEngine {
    fn step(&mut self) {
        self.advance_clock();
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn params(&self) -> Value {
        json!({
            "animation_speed": self.config.animation_speed,
            "opacities": self.config.opacities,
            "colors": self.config.colors,
            "dot_size": self.config.dot_size,
            "show_gradient": self.config.show_gradient,
            "time": self.time,
            "particles": self.particles.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records draw calls instead of rasterizing.
    #[derive(Default)]
    struct RecordingSurface {
        clears: usize,
        circles: Vec<(f64, f64, f64, Rgb, f64)>,
    }

    impl RenderSurface for RecordingSurface {
        fn size(&self) -> SurfaceSize {
            SurfaceSize::new(400.0, 400.0)
        }

        fn resize_backing(&mut self, _size: SurfaceSize) -> Result<(), EngineError> {
            Ok(())
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.circles.clear();
        }

        fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64) {
            self.circles.push((x, y, radius, color, alpha));
        }
    }

    fn engine(w: f64, h: f64, speed: f64) -> RevealEngine {
        let config = RevealConfig {
            animation_speed: speed,
            ..RevealConfig::default()
        };
        RevealEngine::new(SurfaceSize::new(w, h), config, 42).unwrap()
    }

    #[test]
    fn four_hundred_square_has_ten_thousand_particles() {
        assert_eq!(engine(400.0, 400.0, 1.0).particles().len(), 10_000);
    }

    #[test]
    fn empty_colors_fail_construction() {
        let config = RevealConfig {
            colors: vec![],
            ..RevealConfig::default()
        };
        let result = RevealEngine::new(SurfaceSize::new(400.0, 400.0), config, 1);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn zero_area_surface_has_no_particles() {
        let mut e = engine(0.0, 300.0, 1.0);
        assert!(e.particles().is_empty());
        let mut surface = RecordingSurface::default();
        e.advance_frame(&mut surface);
        assert!(surface.circles.is_empty());
        assert_eq!(surface.clears, 1);
    }

    #[test]
    fn advance_clock_uses_speed_and_nominal_interval() {
        let mut e = engine(40.0, 40.0, 0.4);
        e.advance_clock();
        assert!((e.time() - 0.4 * 0.016).abs() < 1e-12);
        e.advance_clock();
        assert!((e.time() - 2.0 * 0.4 * 0.016).abs() < 1e-12);
        assert_eq!(e.frame_count(), 2);
    }

    #[test]
    fn regenerate_same_size_keeps_layout_but_rerolls() {
        let mut e = engine(120.0, 80.0, 1.0);
        let before = e.particles().to_vec();
        e.regenerate_grid(e.size());
        let after = e.particles();
        assert_eq!(before.len(), after.len());
        assert!(before
            .iter()
            .zip(after)
            .all(|(a, b)| a.position == b.position && a.distance_from_center == b.distance_from_center));
        assert!(before
            .iter()
            .zip(after)
            .any(|(a, b)| a.reveal_jitter != b.reveal_jitter));
    }

    #[test]
    fn regenerate_for_new_size_changes_cardinality() {
        let mut e = engine(40.0, 40.0, 1.0);
        e.regenerate_grid(SurfaceSize::new(80.0, 41.0));
        assert_eq!(e.particles().len(), 20 * 11);
        assert_eq!(e.size(), SurfaceSize::new(80.0, 41.0));
    }

    #[test]
    fn distances_do_not_change_across_frames() {
        let mut e = engine(64.0, 64.0, 1.0);
        let before: Vec<f64> = e.particles().iter().map(|p| p.distance_from_center).collect();
        let mut surface = RecordingSurface::default();
        for _ in 0..30 {
            e.advance_frame(&mut surface);
        }
        let after: Vec<f64> = e.particles().iter().map(|p| p.distance_from_center).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn center_particle_visible_on_first_frame_and_gone_by_point_nine() {
        let mut e = engine(400.0, 400.0, 1.0);
        let center = e
            .particles
            .iter()
            .position(|p| p.distance_from_center == 0.0)
            .unwrap();
        e.particles[center].reveal_jitter = 0.0;
        let at_center = |e: &RevealEngine| e.visible_dots().any(|d| d.position == DVec2::new(200.0, 200.0));

        e.advance_clock();
        assert!(at_center(&e), "center dot should draw at t={}", e.time());

        while e.time() < 0.9 {
            e.advance_clock();
        }
        assert!(!at_center(&e), "center dot still drawn at t={}", e.time());
    }

    #[test]
    fn drawn_opacity_is_level_times_fade() {
        let mut e = engine(200.0, 200.0, 1.0);
        for _ in 0..20 {
            e.advance_clock();
        }
        let t = e.time();
        let mut checked = 0;
        for dot in e.visible_dots() {
            let p = e
                .particles()
                .iter()
                .find(|p| p.position == dot.position)
                .unwrap();
            let expected = e.config().opacities[p.opacity_index] * p.fade_factor(t);
            assert!((dot.opacity - expected).abs() < 1e-12);
            assert!(dot.opacity > 0.0 && dot.opacity <= 1.0);
            assert_eq!(dot.color, Rgb::CYAN);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn render_clears_then_draws_visible_dots() {
        let mut e = engine(100.0, 100.0, 1.0);
        let mut surface = RecordingSurface::default();
        for _ in 0..10 {
            e.advance_frame(&mut surface);
        }
        assert_eq!(surface.clears, 10);
        assert_eq!(surface.circles.len(), e.visible_dots().count());
        assert!(surface.circles.iter().all(|c| (c.2 - 3.0).abs() < f64::EPSILON));
    }

    #[test]
    fn sweep_eventually_ends() {
        let mut e = engine(40.0, 40.0, 1.0);
        // farthest threshold is under 0.45; everything has faded by 1.5
        while e.time() < 1.5 {
            e.advance_clock();
        }
        assert_eq!(e.visible_dots().count(), 0);
    }

    #[test]
    fn engines_do_not_share_state() {
        let mut a = engine(40.0, 40.0, 1.0);
        let b = engine(40.0, 40.0, 1.0);
        a.advance_clock();
        a.regenerate_grid(SurfaceSize::new(8.0, 8.0));
        assert!(b.time().abs() < f64::EPSILON);
        assert_eq!(b.particles().len(), 100);
    }

    #[test]
    fn params_report_config_and_clock() {
        let mut e = engine(40.0, 40.0, 0.5);
        Engine::step(&mut e);
        let params = Engine::params(&e);
        assert_eq!(params["animation_speed"], 0.5);
        assert_eq!(params["particles"], 100);
        assert!(params["time"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn engine_trait_is_object_safe() {
        let boxed: Box<dyn Engine> = Box::new(engine(8.0, 8.0, 1.0));
        assert_eq!(boxed.particles().len(), 4);
        assert!(boxed.param_schema().get("dot_size").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clock_strictly_increases(speed in 0.001_f64..10.0, frames in 1_usize..200) {
                let mut e = engine(8.0, 8.0, speed);
                for _ in 0..frames {
                    let before = e.time();
                    e.advance_clock();
                    prop_assert!(e.time() > before);
                }
            }
        }
    }
}
