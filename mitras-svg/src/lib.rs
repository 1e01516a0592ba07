//! SVG backend for recorded `mitras` canvases.
//!
//! Replays a [`Canvas`] display list into an SVG [`Document`] using the
//! `svg` crate. Canvas coordinates are already absolute pixels with Y
//! pointing down, so they map one to one onto the SVG user space.
//!
//! - Path data is built as raw `d` strings to keep `f64` precision (the
//!   `svg` crate's `Data` builder uses `f32`).
//! - [`to_data_url`] is the pixel-to-data-URL export of the live canvas.

use std::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use svg::Document;
use svg::node::element::{Group, Path, Rectangle, Text as SvgText};

use mitras_graphics::canvas::{Canvas, FillObject, GraphicsObject, StrokeObject, TextObject};
use mitras_graphics::surface::{Surface, TextAlign, TextBaseline};
use mitras_graphics::types::{Color, Point, Scalar};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Options controlling SVG output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Number of decimal places for coordinates. Default: 2.
    pub precision: usize,
    /// Opaque background painted behind everything. Default: none, so the
    /// drawing stays transparent like the live canvas.
    pub background: Option<Color>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            precision: 2,
            background: None,
        }
    }
}

/// Render a [`Canvas`] to an SVG [`Document`] the size of the canvas.
#[must_use]
pub fn render(canvas: &Canvas, opts: &RenderOptions) -> Document {
    let size = canvas.size();
    let width = fmt_scalar(size.width, opts.precision);
    let height = fmt_scalar(size.height, opts.precision);

    let mut doc = Document::new()
        .set("xmlns", "http://www.w3.org/2000/svg")
        .set("viewBox", format!("0 0 {width} {height}"))
        .set("width", width.as_str())
        .set("height", height.as_str());

    if let Some(color) = opts.background {
        doc = doc.add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", color_to_svg(color)),
        );
    }

    doc.add(render_objects(canvas.objects(), opts))
}

/// Render a [`Canvas`] to an SVG string.
#[must_use]
pub fn render_to_string(canvas: &Canvas, opts: &RenderOptions) -> String {
    render(canvas, opts).to_string()
}

/// Render a [`Canvas`] to a `data:image/svg+xml;base64,…` URL.
#[must_use]
pub fn to_data_url(canvas: &Canvas, opts: &RenderOptions) -> String {
    let encoded = STANDARD.encode(render_to_string(canvas, opts));
    format!("data:image/svg+xml;base64,{encoded}")
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

fn render_objects(objects: &[GraphicsObject], opts: &RenderOptions) -> Group {
    objects.iter().fold(Group::new(), |group, obj| match obj {
        GraphicsObject::Stroke(stroke) => group.add(render_stroke(stroke, opts)),
        GraphicsObject::Fill(fill) => group.add(render_fill(fill, opts)),
        GraphicsObject::Text(text) => group.add(render_text(text, opts)),
    })
}

fn render_stroke(stroke: &StrokeObject, opts: &RenderOptions) -> Path {
    Path::new()
        .set("d", points_to_d(&stroke.points, stroke.closed, opts.precision))
        .set("fill", "none")
        .set("stroke", color_to_svg(stroke.style.color))
        .set("stroke-width", fmt_scalar(stroke.style.width, opts.precision))
}

fn render_fill(fill: &FillObject, opts: &RenderOptions) -> Path {
    let el = Path::new()
        .set("d", points_to_d(&fill.points, true, opts.precision))
        .set("fill", color_to_svg(fill.style.color))
        .set("stroke", "none");
    if fill.style.alpha < 1.0 {
        el.set("fill-opacity", fmt_scalar(fill.style.alpha, opts.precision))
    } else {
        el
    }
}

fn render_text(text: &TextObject, opts: &RenderOptions) -> SvgText {
    let style = &text.style;
    let anchor = match style.align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    };
    let el = SvgText::new(text.text.as_ref())
        .set("x", fmt_scalar(text.at.x, opts.precision))
        .set("y", fmt_scalar(text.at.y, opts.precision))
        .set("font-family", style.font_family.as_str())
        .set("font-size", fmt_scalar(style.font_size, opts.precision))
        .set("fill", color_to_svg(style.color))
        .set("text-anchor", anchor);
    match style.baseline {
        TextBaseline::Middle => el.set("dominant-baseline", "middle"),
        TextBaseline::Alphabetic => el,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `M x,y L x,y …` with an optional closing `Z`.
fn points_to_d(points: &[Point], closed: bool, precision: usize) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        d.push(if i == 0 { 'M' } else { 'L' });
        write_point(&mut d, p.x, p.y, precision);
    }
    if closed && !points.is_empty() {
        d.push('Z');
    }
    d
}

/// Write "x,y" to the string with the given precision.
///
/// Normalizes negative zero to positive zero for cleaner output.
fn write_point(d: &mut String, x: Scalar, y: Scalar, precision: usize) {
    let x = if x == 0.0 { 0.0 } else { x };
    let y = if y == 0.0 { 0.0 } else { y };
    let _ = write!(d, "{x:.precision$},{y:.precision$}");
}

fn color_to_svg(c: Color) -> String {
    match c.to_rgb8() {
        [0, 0, 0] => "black".to_owned(),
        [255, 255, 255] => "white".to_owned(),
        _ => c.to_hex(),
    }
}

/// Format a scalar to the given precision, stripping trailing zeros.
fn fmt_scalar(v: Scalar, precision: usize) -> String {
    let s = format!("{v:.precision$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" { "0" } else { trimmed }.to_owned()
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use mitras_graphics::surface::{FillStyle, StrokeStyle, TextStyle};

    use super::*;

    fn canvas() -> Canvas {
        let mut canvas = Canvas::new(200.0, 100.0);
        canvas.set_origin(Point::new(100.0, 50.0));
        canvas
    }

    #[test]
    fn points_to_d_open_and_closed() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.5, -2.0)];
        assert_eq!(points_to_d(&pts, false, 2), "M0.00,0.00L10.50,-2.00");
        assert_eq!(points_to_d(&pts, true, 1), "M0.0,0.0L10.5,-2.0Z");
        assert_eq!(points_to_d(&[], true, 2), "");
    }

    #[test]
    fn negative_zero_is_normalized() {
        let mut d = String::new();
        write_point(&mut d, -0.0, -0.0, 1);
        assert_eq!(d, "0.0,0.0");
        assert_eq!(fmt_scalar(-0.001, 2), "0");
    }

    #[test]
    fn colors() {
        assert_eq!(color_to_svg(Color::BLACK), "black");
        assert_eq!(color_to_svg(Color::WHITE), "white");
        assert_eq!(color_to_svg(Color::new(1.0, 0.0, 0.0)), "#ff0000");
    }

    #[test]
    fn fmt_scalar_trailing_zeros() {
        assert_eq!(fmt_scalar(1.0, 4), "1");
        assert_eq!(fmt_scalar(1.5, 4), "1.5");
        assert_eq!(fmt_scalar(400.0, 2), "400");
    }

    #[test]
    fn document_matches_canvas_size() {
        let s = render_to_string(&canvas(), &RenderOptions::default());
        assert!(s.contains("viewBox=\"0 0 200 100\""), "{s}");
        assert!(s.contains("width=\"200\""), "{s}");
        assert!(!s.contains("<rect"), "no background by default: {s}");
    }

    #[test]
    fn strokes_use_absolute_coordinates() {
        let mut c = canvas();
        c.stroke_line(
            Point::ZERO,
            Point::new(10.0, 0.0),
            StrokeStyle::new(Color::BLACK, 3.0),
        );
        let s = render_to_string(&c, &RenderOptions::default());
        assert!(s.contains("d=\"M100.00,50.00L110.00,50.00\""), "{s}");
        assert!(s.contains("stroke-width=\"3\""), "{s}");
        assert!(s.contains("fill=\"none\""), "{s}");
    }

    #[test]
    fn translucent_fill() {
        let mut c = canvas();
        c.fill_polygon(
            &[Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            FillStyle {
                color: Color::new(1.0, 0.0, 0.0),
                alpha: 0.4,
            },
        );
        let s = render_to_string(&c, &RenderOptions::default());
        assert!(s.contains("fill=\"#ff0000\""), "{s}");
        assert!(s.contains("fill-opacity=\"0.4\""), "{s}");
    }

    #[test]
    fn text_anchor_and_baseline() {
        let mut c = canvas();
        let style = TextStyle {
            align: TextAlign::Right,
            baseline: TextBaseline::Middle,
            ..TextStyle::default()
        };
        c.fill_text("-1", Point::new(-16.0, 0.0), &style);
        let s = render_to_string(&c, &RenderOptions::default());
        assert!(s.contains("text-anchor=\"end\""), "{s}");
        assert!(s.contains("dominant-baseline=\"middle\""), "{s}");
        assert!(s.contains("<text"), "{s}");
        assert!(s.contains("-1"), "{s}");
    }

    #[test]
    fn background_rect() {
        let opts = RenderOptions {
            background: Some(Color::WHITE),
            ..RenderOptions::default()
        };
        let s = render_to_string(&canvas(), &opts);
        assert!(s.contains("<rect"), "{s}");
        assert!(s.contains("fill=\"white\""), "{s}");
    }

    #[test]
    fn data_url_is_base64_svg() {
        let url = to_data_url(&canvas(), &RenderOptions::default());
        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert!(String::from_utf8(decoded).unwrap().starts_with("<svg"));
    }
}
