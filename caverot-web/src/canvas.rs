//! HTML canvas 2D drawing surface.

use caverot_core::{Ink, Rgb, Segment2D, Surface, TextMetrics};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const FONT_PX: i32 = 12;
const LINE_HEIGHT: i32 = FONT_PX + 2;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Attach to the canvas element with the given id.
    pub fn from_element_id(id: &str) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{id}`")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("`{id}` is not a canvas")))?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        context.set_font(&format!("{FONT_PX}px monospace"));
        context.set_text_baseline("top");
        Ok(Self { canvas, context })
    }

    fn stroke(&self, colour: &str, lines: impl IntoIterator<Item = ((i32, i32), (i32, i32))>) {
        self.context.set_stroke_style_str(colour);
        self.context.begin_path();
        for (from, to) in lines {
            // half-pixel offset keeps one-pixel lines crisp
            self.context
                .move_to(from.0 as f64 + 0.5, from.1 as f64 + 0.5);
            self.context.line_to(to.0 as f64 + 0.5, to.1 as f64 + 0.5);
        }
        self.context.stroke();
    }
}

impl TextMetrics for CanvasSurface {
    fn text_width(&self, text: &str) -> i32 {
        match self.context.measure_text(text) {
            Ok(metrics) => metrics.width().ceil() as i32,
            Err(_) => text.chars().count() as i32 * FONT_PX * 3 / 5,
        }
    }

    fn text_height(&self) -> i32 {
        LINE_HEIGHT
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.context.set_fill_style_str("black");
        self.context.fill_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn draw_segments(&mut self, (r, g, b): Rgb, segments: &[Segment2D]) {
        self.stroke(
            &format!("rgb({r},{g},{b})"),
            segments.iter().map(|s| ((s.x1, s.y1), (s.x2, s.y2))),
        );
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), ink: Ink) {
        self.stroke(ink_colour(ink), [(from, to)]);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, ink: Ink) {
        self.context.set_fill_style_str(ink_colour(ink));
        // a failed fill only loses this label
        let _ = self.context.fill_text(text, x as f64, y as f64);
    }

    /// The browser composites once the animation frame callback returns.
    fn present(&mut self) {}
}

fn ink_colour(ink: Ink) -> &'static str {
    match ink {
        Ink::Cross => "white",
        Ink::Label => "lightgrey",
        Ink::Indicator => "darkcyan",
        Ink::Status => "yellow",
    }
}
