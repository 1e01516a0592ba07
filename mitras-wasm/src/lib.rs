//! WebAssembly bindings: a graphing session that returns SVG markup.

use mitras_core::expr::{ExprId, ExprKind, ExprList, ExprRecord};
use mitras_core::scene::Scene;
use mitras_graphics::canvas::Canvas;
use mitras_graphics::surface::Surface;
use mitras_graphics::types::{Color, Point, Vec2};
use mitras_graphics::viewport::Viewport;
use mitras_svg::{RenderOptions, render_to_string, to_data_url};
use wasm_bindgen::prelude::*;

/// An expression list drawn on a canvas with its own pan and zoom.
#[wasm_bindgen]
pub struct GraphSession {
    list: ExprList,
    viewport: Viewport,
    canvas: Canvas,
    scene: Scene,
    animating: bool,
}

#[wasm_bindgen]
impl GraphSession {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            list: ExprList::new(),
            viewport: Viewport::new(width, height),
            canvas: Canvas::new(width, height),
            scene: Scene::default(),
            animating: false,
        }
    }

    /// Replace the expressions, one per line (`%` starts a comment), and
    /// return one `id: evaluated` line per math record.
    #[wasm_bindgen(js_name = setExpressions)]
    pub fn set_expressions(&mut self, text: &str) -> String {
        let records = text
            .lines()
            .zip(0..)
            .map(|(line, id)| match line.trim().strip_prefix('%') {
                Some(comment) => ExprRecord::new(ExprId(id), ExprKind::Comment, comment.trim()),
                None => ExprRecord::new(ExprId(id), ExprKind::Math, line.trim()),
            })
            .collect();
        self.list.load(records);
        self.list
            .records()
            .iter()
            .filter(|r| !r.is_comment())
            .map(|r| format!("{}: {}", r.id(), r.analysis.evaluated_tex))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ask for an animation of the expression with this id; it starts on
    /// the next [`GraphSession::render`].
    #[wasm_bindgen(js_name = requestAnimation)]
    pub fn request_animation(&mut self, id: u64) -> bool {
        self.list.request_animation(ExprId(id))
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(Vec2::new(dx, dy));
    }

    /// Apply a wheel event at canvas position `(x, y)`.
    pub fn zoom(&mut self, delta_y: f64, x: f64, y: f64) {
        self.viewport.zoom(delta_y, Point::new(x, y));
    }

    pub fn center(&mut self) {
        self.viewport.center();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.resize(width, height);
        self.canvas.resize(width, height);
    }

    /// Redraw everything, starting pending animations.
    pub fn render(&mut self) -> String {
        self.animating = self.scene.draw(
            &mut self.canvas,
            &self.viewport,
            self.list.records_mut(),
            true,
        );
        render_to_string(&self.canvas, &RenderOptions::default())
    }

    /// Advance running animations to host time `now_ms` (e.g. the
    /// `requestAnimationFrame` timestamp) and return the new frame.
    pub fn tick(&mut self, now_ms: f64) -> String {
        self.animating = self.scene.tick(
            &mut self.canvas,
            &self.viewport,
            self.list.records_mut(),
            now_ms,
        );
        render_to_string(&self.canvas, &RenderOptions::default())
    }

    /// Whether another [`GraphSession::tick`] is needed.
    #[wasm_bindgen(getter)]
    pub fn animating(&self) -> bool {
        self.animating
    }

    /// The current drawing on an opaque white background, as a data URL.
    #[wasm_bindgen(js_name = exportDataUrl)]
    pub fn export_data_url(&self) -> String {
        let mut canvas = self.canvas.clone();
        canvas.paint_background(Color::WHITE);
        to_data_url(&canvas, &RenderOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_expressions_reports_evaluations() {
        let mut session = GraphSession::new(400.0, 300.0);
        let report = session.set_expressions("a=2\n% note\na+1");
        assert_eq!(report, "0: 2\n2: 3");
    }

    #[test]
    fn render_returns_svg() {
        let mut session = GraphSession::new(400.0, 300.0);
        session.set_expressions(r"\begin{bmatrix}1\\1\end{bmatrix}");
        let svg = session.render();
        assert!(svg.contains("<svg"), "missing SVG root");
        assert!(svg.contains("path"), "missing rendered path");
        assert!(!session.animating());
    }

    #[test]
    fn animation_ticks_until_done() {
        let mut session = GraphSession::new(400.0, 300.0);
        session.set_expressions(r"\begin{bmatrix}0&-1\\1&0\end{bmatrix}");
        assert!(session.request_animation(0));
        session.render();
        assert!(session.animating());
        session.tick(0.0);
        assert!(session.animating());
        session.tick(5000.0);
        assert!(!session.animating());
    }

    #[test]
    fn export_is_base64_svg() {
        let session = GraphSession::new(100.0, 100.0);
        assert!(
            session
                .export_data_url()
                .starts_with("data:image/svg+xml;base64,")
        );
    }
}
