//! [`FrameScheduler`] backed by `requestAnimationFrame`.

use dot_reveal_core::{EngineError, FrameHandle, FrameScheduler};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::surface::js_error;

/// Slot holding the frame callback. Filled once the effect it drives exists.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

pub struct AnimationFrameScheduler {
    window: Window,
    callback: FrameCallback,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window, callback: FrameCallback) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, EngineError> {
        let slot = self.callback.borrow();
        let callback = slot
            .as_ref()
            .ok_or_else(|| EngineError::Scheduler("frame callback not installed".into()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| EngineError::Scheduler(js_error(&e)))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame({handle}) failed: {}", js_error(&e));
        }
    }
}
