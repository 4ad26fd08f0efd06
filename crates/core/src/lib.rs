#![deny(unsafe_code)]
//! Core types for dot-reveal, a particle reveal animation.
//!
//! A [`RevealEngine`] tiles a surface with dots and advances a logical clock;
//! each dot appears once the clock passes a threshold that grows with its
//! distance from the center, then fades out. [`RevealEffect`] binds an engine
//! to a [`RenderSurface`] and a [`FrameScheduler`] and owns the frame loop.

pub mod color;
pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod particle;
pub mod prng;
pub mod surface;

pub use color::Rgb;
pub use config::RevealConfig;
pub use effect::{FrameHandle, FrameScheduler, RevealEffect};
pub use engine::{Dot, Engine, RevealEngine};
pub use error::EngineError;
pub use particle::Particle;
pub use prng::Xorshift64;
pub use surface::{RenderSurface, SurfaceSize};
