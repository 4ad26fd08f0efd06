#![deny(unsafe_code)]
//! Browser bindings for dot-reveal.
//!
//! ```js
//! const effect = new CanvasRevealEffect(container, JSON.stringify({ animationSpeed: 0.6 }));
//! // ...
//! effect.dispose();
//! ```
//!
//! The effect lives in an `Rc<RefCell<_>>` shared by the animation-frame
//! callback and the window resize listener. Both hold only weak references,
//! so dropping the JS handle tears everything down.

mod scheduler;
mod surface;

pub use scheduler::{AnimationFrameScheduler, FrameCallback};
pub use surface::Canvas2dSurface;

use dot_reveal_core::{EngineError, RevealConfig, RevealEffect, Xorshift64};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, Window};

use crate::surface::js_error;

type BrowserEffect = RevealEffect<Canvas2dSurface, AnimationFrameScheduler>;
type SharedEffect = Rc<RefCell<Option<BrowserEffect>>>;

/// Runs `f` on the effect if it is still alive and not already borrowed.
fn with_effect(weak: &Weak<RefCell<Option<BrowserEffect>>>, f: impl FnOnce(&mut BrowserEffect)) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut slot) = shared.try_borrow_mut() else {
        log::warn!("reveal effect busy, skipping callback");
        return;
    };
    if let Some(effect) = slot.as_mut() {
        f(effect);
    }
}

/// Dot-grid reveal animation drawn on a canvas laid over `container`.
#[wasm_bindgen]
pub struct CanvasRevealEffect {
    window: Window,
    effect: SharedEffect,
    frame: FrameCallback,
    resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl CanvasRevealEffect {
    /// Creates the canvas, starts the animation loop and listens for window resizes.
    ///
    /// `options` is an optional JSON object with any of `animationSpeed`,
    /// `opacities`, `colors`, `dotSize`, `showGradient`. Invalid options throw
    /// before any canvas is created.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, options: Option<String>) -> Result<CanvasRevealEffect, JsError> {
        let config = parse_options(options.as_deref())?;
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;

        let effect: SharedEffect = Rc::new(RefCell::new(None));
        let frame: FrameCallback = Rc::new(RefCell::new(None));

        let weak = Rc::downgrade(&effect);
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            with_effect(&weak, |e| {
                e.on_frame();
            });
        }) as Box<dyn FnMut()>));

        let surface = Canvas2dSurface::attach(window.clone(), container)?;
        let scheduler = AnimationFrameScheduler::new(window.clone(), frame.clone());
        let seed = Xorshift64::from_unit_f64(js_sys::Math::random()).next_u64();
        *effect.borrow_mut() = Some(RevealEffect::new(surface, scheduler, config, seed)?);

        let weak = Rc::downgrade(&effect);
        let resize = Closure::wrap(Box::new(move || {
            with_effect(&weak, BrowserEffect::on_surface_resize);
        }) as Box<dyn FnMut()>);
        let mut handle = CanvasRevealEffect {
            window,
            effect,
            frame,
            resize: None,
        };
        handle
            .window
            .add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
            .map_err(|e| {
                handle.dispose();
                JsError::new(&js_error(&e))
            })?;
        handle.resize = Some(resize);
        Ok(handle)
    }

    /// Stops the animation, removes the canvas and the resize listener. Safe to call twice.
    pub fn dispose(&mut self) {
        if let Some(resize) = self.resize.take() {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
            {
                log::warn!("failed to remove resize listener: {}", js_error(&e));
            }
        }
        if let Ok(mut slot) = self.effect.try_borrow_mut() {
            if let Some(effect) = slot.as_mut() {
                effect.dispose();
            }
        }
        self.frame.borrow_mut().take();
    }

    /// Current value of the logical clock.
    pub fn time(&self) -> f64 {
        self.effect
            .borrow()
            .as_ref()
            .map_or(0.0, |e| e.engine().time())
    }

    #[wasm_bindgen(js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.effect
            .borrow()
            .as_ref()
            .map_or(0, |e| e.engine().particles().len())
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.effect.borrow().as_ref().is_some_and(|e| e.is_running())
    }
}

impl Drop for CanvasRevealEffect {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Parses the JSON options string; `None` or an empty string means defaults.
fn parse_options(options: Option<&str>) -> Result<RevealConfig, EngineError> {
    match options.map(str::trim) {
        None | Some("") => Ok(RevealConfig::default()),
        Some(json) => {
            let value: serde_json::Value = serde_json::from_str(json)
                .map_err(|e| EngineError::config("options", e.to_string()))?;
            RevealConfig::from_json(&value)
        }
    }
}
