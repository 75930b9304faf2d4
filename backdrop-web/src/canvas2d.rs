//! 2D canvas drawing surface
//!
//! Paints background draw calls onto an HTML canvas. A canvas without a 2D
//! context reports itself unavailable and frames are skipped.

use backdrop::{ClientRect, Point, Rgba, Size, Surface};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Canvas-backed [`Surface`]
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    width: f64,
    height: f64,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let ctx = context_2d(&canvas);
        let width = f64::from(canvas.width());
        let height = f64::from(canvas.height());
        Self {
            canvas,
            ctx,
            width,
            height,
        }
    }

    /// Size the canvas backing store to its parent's box
    ///
    /// Returns `None` when the canvas is detached from the document.
    pub fn fit_to_parent(&mut self) -> Option<Size> {
        let parent = self.canvas.parent_element()?;
        let rect = parent.get_bounding_client_rect();
        let width = rect.width().max(0.0).floor();
        let height = rect.height().max(0.0).floor();

        // Only touch the canvas when the size changed; resetting it clears the bitmap
        if self.canvas.width() != width as u32 || self.canvas.height() != height as u32 {
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
        }
        self.width = width;
        self.height = height;

        Some(Size::new(width as f32, height as f32))
    }

    /// Current bounding rectangle of the canvas in client coordinates
    pub fn client_rect(&self) -> ClientRect {
        let rect = self.canvas.get_bounding_client_rect();
        ClientRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

impl Surface for Canvas2dSurface {
    fn is_available(&self) -> bool {
        self.ctx.is_some()
    }

    fn clear(&mut self) {
        if let Some(ctx) = &self.ctx {
            ctx.clear_rect(0.0, 0.0, self.width, self.height);
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f32) {
        let Some(ctx) = &self.ctx else { return };
        ctx.set_stroke_style_str(&color.to_string());
        ctx.set_line_width(f64::from(width));
        ctx.begin_path();
        ctx.move_to(f64::from(from.x), f64::from(from.y));
        ctx.line_to(f64::from(to.x), f64::from(to.y));
        ctx.stroke();
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, color: Rgba, width: f32) {
        let Some(ctx) = &self.ctx else { return };
        ctx.set_stroke_style_str(&color.to_string());
        ctx.set_line_width(f64::from(width));
        ctx.begin_path();
        ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius.max(0.0)),
            0.0,
            std::f64::consts::TAU,
        )
        .ok();
        ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        let Some(ctx) = &self.ctx else { return };
        ctx.set_fill_style_str(&color.to_string());
        ctx.begin_path();
        ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius.max(0.0)),
            0.0,
            std::f64::consts::TAU,
        )
        .ok();
        ctx.fill();
    }
}
