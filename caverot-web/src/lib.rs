/// Caverot Web - canvas survey viewer for the browser
///
/// The page owns the animation loop: it calls `frame` from
/// `requestAnimationFrame` with the callback timestamp and forwards keyboard,
/// mouse and resize events.
use std::path::Path;
use std::time::Duration;

use caverot_core::{parse_survey, Drag, EngineConfig, FrameOutcome, Surface, View};
use tracing::info;
use wasm_bindgen::prelude::*;

mod canvas;
mod keys;

pub use canvas::CanvasSurface;

/// Wheel delta per degree of tilt.
const WHEEL_PER_DEGREE: f64 = 12.0;

#[wasm_bindgen]
pub struct WebViewer {
    view: View,
    surface: CanvasSurface,
}

#[wasm_bindgen]
impl WebViewer {
    /// Attach a viewer to the canvas with the given element id.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebViewer, JsValue> {
        let surface = CanvasSurface::from_element_id(canvas_id)?;
        let view = View::new(EngineConfig::default(), surface.size());
        Ok(WebViewer { view, surface })
    }

    /// Add a survey from its text; `name` is used in error messages.
    pub fn load_survey(&mut self, name: &str, text: &str) -> Result<(), JsValue> {
        let survey = parse_survey(Path::new(name), text)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        info!(name, legs = survey.leg_count(), "survey loaded");
        self.view.add_survey(survey);
        Ok(())
    }

    /// Draw if anything changed. Returns true when the canvas was redrawn.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let outcome = self.view.request_frame(&mut self.surface, from_millis(now_ms));
        outcome != FrameOutcome::Idle
    }

    /// Forward a `keydown`; returns true when the key was used.
    pub fn key(&mut self, key: &str, shift: bool, ctrl: bool, now_ms: f64) -> bool {
        keys::handle_key(&mut self.view, key, shift, ctrl, from_millis(now_ms))
    }

    /// Left-button drag: turn and tilt.
    pub fn drag_rotate(&mut self, dx: f64, dy: f64) {
        self.view.drag(Drag::TiltRotate, dx, dy);
    }

    /// Right-button drag: pan.
    pub fn drag_translate(&mut self, dx: f64, dy: f64) {
        self.view.drag(Drag::Translate, dx, dy);
    }

    /// Middle-button drag: zoom, dragging down zooms in.
    pub fn drag_scale(&mut self, dy: f64) {
        self.view.drag(Drag::Scale, 0.0, dy);
    }

    pub fn wheel(&mut self, delta: f64) {
        self.view.tilt(-delta / WHEEL_PER_DEGREE);
    }

    pub fn toggle_rotation(&mut self, now_ms: f64) {
        self.view.toggle_rotation(from_millis(now_ms));
    }

    pub fn is_rotating(&self) -> bool {
        self.view.is_rotating()
    }

    pub fn bearing(&self) -> f64 {
        self.view.state().bearing()
    }

    pub fn inclination(&self) -> f64 {
        self.view.state().inclination()
    }
}

/// `requestAnimationFrame` timestamps are milliseconds since page load.
fn from_millis(now_ms: f64) -> Duration {
    if now_ms.is_finite() && now_ms > 0.0 {
        Duration::from_secs_f64(now_ms / 1000.0)
    } else {
        Duration::ZERO
    }
}
