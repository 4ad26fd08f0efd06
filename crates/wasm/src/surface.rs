//! [`RenderSurface`] over an HTML canvas and its 2D context.

use dot_reveal_core::{EngineError, RenderSurface, Rgb, SurfaceSize};
use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Window};

/// Renders a JS exception or value for an error message.
pub(crate) fn js_error(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{value:?}"))
}

/// A canvas overlaid on a container element, sized to the container's content box.
pub struct Canvas2dSurface {
    window: Window,
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    drawn_size: SurfaceSize,
}

impl Canvas2dSurface {
    /// Creates an absolutely positioned, click-through canvas and appends it to `container`.
    pub fn attach(window: Window, container: HtmlElement) -> Result<Self, EngineError> {
        let surface_err = |e: JsValue| EngineError::Surface(js_error(&e));
        let document = window
            .document()
            .ok_or_else(|| EngineError::Surface("window has no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(surface_err)?
            .dyn_into()
            .map_err(|_| EngineError::Surface("created element is not a canvas".into()))?;

        let style = canvas.style();
        for (name, value) in [
            ("position", "absolute"),
            ("top", "0"),
            ("left", "0"),
            ("width", "100%"),
            ("height", "100%"),
            ("pointer-events", "none"),
        ] {
            style.set_property(name, value).map_err(surface_err)?;
        }

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(surface_err)?
            .ok_or_else(|| EngineError::Surface("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| EngineError::Surface("2d context has unexpected type".into()))?;

        container
            .append_child(&canvas)
            .map_err(surface_err)?;

        Ok(Self {
            window,
            container,
            canvas,
            ctx,
            drawn_size: SurfaceSize::new(0.0, 0.0),
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl RenderSurface for Canvas2dSurface {
    fn size(&self) -> SurfaceSize {
        let rect = self.container.get_bounding_client_rect();
        SurfaceSize::with_pixel_ratio(rect.width(), rect.height(), self.window.device_pixel_ratio())
    }

    fn resize_backing(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        let (width, height) = size.backing_dimensions()?;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        let css = |v: f64| format!("{}px", if size.is_empty() { 0.0 } else { v });
        style
            .set_property("width", &css(size.width))
            .and_then(|_| style.set_property("height", &css(size.height)))
            .map_err(|e| EngineError::Surface(js_error(&e)))?;
        // setting the backing size resets the transform; draw in CSS pixels from here on
        self.ctx
            .set_transform(size.pixel_ratio, 0.0, 0.0, size.pixel_ratio, 0.0, 0.0)
            .map_err(|e| EngineError::Surface(js_error(&e)))?;
        self.drawn_size = size;
        Ok(())
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.drawn_size.width, self.drawn_size.height);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, alpha: f64) {
        self.ctx.set_fill_style_str(&color.css_rgba(alpha));
        self.ctx.begin_path();
        if self.ctx.arc(x, y, radius, 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn release(&mut self) {
        self.canvas.remove();
    }
}
