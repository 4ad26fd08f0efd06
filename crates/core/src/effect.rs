//! A reveal engine bound to a host surface and frame scheduler.
//!
//! [`RevealEffect`] runs an explicit scheduling loop: each frame callback
//! first checks the loop state and returns at once if the effect was stopped
//! or disposed; otherwise it clears its pending handle, draws, and requests
//! the next frame. After [`RevealEffect::dispose`] no further frame is
//! requested. A callback already queued by the host when `dispose` runs may
//! still be delivered; it returns without drawing.

use crate::config::RevealConfig;
use crate::engine::RevealEngine;
use crate::error::EngineError;
use crate::surface::RenderSurface;

/// Opaque id of a requested frame, as returned by the host.
pub type FrameHandle = i32;

/// Host hook for "call me on the next display refresh".
pub trait FrameScheduler {
    /// Asks the host to deliver one frame callback; returns its handle.
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError>;

    /// Cancels a pending request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Running { pending: Option<FrameHandle> },
    Stopped,
    Disposed,
}

/// A reveal engine drawing onto `S`, driven by frames from `F`.
pub struct RevealEffect<S: RenderSurface, F: FrameScheduler> {
    engine: RevealEngine,
    surface: S,
    scheduler: F,
    state: LoopState,
}

impl<S: RenderSurface, F: FrameScheduler> RevealEffect<S, F> {
    /// Validates `config`, sizes the surface, generates the grid and requests the first frame.
    ///
    /// Configuration errors are reported before the surface is touched. A
    /// failure to size the surface or schedule the first frame releases the
    /// surface and is returned; no per-frame errors are ever raised.
    pub fn new(mut surface: S, scheduler: F, config: RevealConfig, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        let size = surface.size();
        if let Err(e) = surface.resize_backing(size) {
            surface.release();
            return Err(e);
        }
        let engine = RevealEngine::new(size, config, seed)?;
        let mut effect = Self {
            engine,
            surface,
            scheduler,
            state: LoopState::Running { pending: None },
        };
        match effect.scheduler.request_frame() {
            Ok(handle) => effect.state = LoopState::Running { pending: Some(handle) },
            Err(e) => {
                effect.dispose();
                return Err(e);
            }
        }
        log::info!(
            "reveal effect started with {} particles",
            effect.engine.particles().len()
        );
        Ok(effect)
    }

    /// Frame callback: advance and draw, then request the next frame unless disposed.
    ///
    /// Returns whether a further frame was scheduled.
    pub fn on_frame(&mut self) -> bool {
        if !matches!(self.state, LoopState::Running { .. }) {
            return false;
        }
        self.state = LoopState::Running { pending: None };
        self.engine.advance_frame(&mut self.surface);

        match self.scheduler.request_frame() {
            Ok(handle) => {
                self.state = LoopState::Running { pending: Some(handle) };
                true
            }
            Err(e) => {
                log::warn!("stopping reveal loop, next frame could not be scheduled: {e}");
                self.state = LoopState::Stopped;
                false
            }
        }
    }

    /// Host resize notification: resize the backing store and regenerate the grid.
    ///
    /// Ignored after disposal. Errors from the surface are logged and the grid is
    /// still regenerated for the new content size.
    pub fn on_surface_resize(&mut self) {
        if self.state == LoopState::Disposed {
            return;
        }
        let size = self.surface.size();
        if let Err(e) = self.surface.resize_backing(size) {
            log::warn!("failed to resize reveal surface: {e}");
        }
        self.engine.regenerate_grid(size);
    }

    /// Regenerates the grid for the surface's current size without resizing the backing store.
    pub fn regenerate_grid(&mut self) {
        let size = self.surface.size();
        self.engine.regenerate_grid(size);
    }

    /// Cancels any pending frame and releases the surface. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        match self.state {
            LoopState::Disposed => return,
            LoopState::Running {
                pending: Some(handle),
            } => self.scheduler.cancel_frame(handle),
            LoopState::Running { pending: None } | LoopState::Stopped => {}
        }
        self.state = LoopState::Disposed;
        self.surface.release();
        log::info!("reveal effect disposed after {} frames", self.engine.frame_count());
    }

    /// True while frames are being scheduled.
    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// True once [`RevealEffect::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.state == LoopState::Disposed
    }

    /// Handle of the frame currently requested from the host, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        match self.state {
            LoopState::Running { pending } => pending,
            _ => None,
        }
    }

    /// The engine driven by this effect.
    pub fn engine(&self) -> &RevealEngine {
        &self.engine
    }

    /// The bound render surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the bound render surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The host frame scheduler.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }
}
