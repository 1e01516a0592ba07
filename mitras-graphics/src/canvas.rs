//! A recording [`Surface`] that keeps a display list.
//!
//! Drawing calls are stored as [`GraphicsObject`]s in absolute pixel
//! coordinates (the origin in effect at call time is already applied), so
//! a backend can replay them without knowing about pans. Clearing a region
//! drops every object that touches it; clearing the whole backing area
//! drops everything, including shapes that ran off-screen.

use std::sync::Arc;

use crate::surface::{
    FillStyle, StrokeStyle, Surface, TextAlign, TextBaseline, TextMetrics, TextStyle,
};
use crate::types::{Color, Point, Rect, Scalar, Size};

/// Average advance of a glyph as a fraction of the font size.
const GLYPH_ADVANCE: Scalar = 0.55;
/// Ascent of digits as a fraction of the font size.
const GLYPH_ASCENT: Scalar = 0.72;
/// Descent below the baseline as a fraction of the font size.
const GLYPH_DESCENT: Scalar = 0.2;

// ---------------------------------------------------------------------------
// Display list
// ---------------------------------------------------------------------------

/// A stroked polyline or polygon outline.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeObject {
    pub points: Vec<Point>,
    pub closed: bool,
    pub style: StrokeStyle,
}

/// A filled polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct FillObject {
    pub points: Vec<Point>,
    pub style: FillStyle,
}

/// A text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    pub text: Arc<str>,
    pub at: Point,
    pub style: TextStyle,
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsObject {
    Stroke(StrokeObject),
    Fill(FillObject),
    Text(TextObject),
}

impl GraphicsObject {
    /// Axis-aligned bounds in absolute pixels (text uses its anchor).
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Stroke(s) => points_bounds(&s.points),
            Self::Fill(f) => points_bounds(&f.points),
            Self::Text(t) => Rect::from_points(t.at, t.at),
        }
    }
}

fn points_bounds(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// In-memory drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: Size,
    origin: Point,
    objects: Vec<GraphicsObject>,
}

impl Canvas {
    /// Create an empty canvas with the origin in the top-left corner.
    #[must_use]
    pub const fn new(width: Scalar, height: Scalar) -> Self {
        Self {
            size: Size::new(width, height),
            origin: Point::ZERO,
            objects: Vec::new(),
        }
    }

    /// Recorded objects, in painting order.
    #[must_use]
    pub fn objects(&self) -> &[GraphicsObject] {
        &self.objects
    }

    /// Change the backing size; like an HTML canvas this clears everything.
    pub fn resize(&mut self, width: Scalar, height: Scalar) {
        self.size = Size::new(width, height);
        self.objects.clear();
    }

    fn absolute(&self, points: &[Point]) -> Vec<Point> {
        let offset = self.origin.to_vec2();
        points.iter().map(|p| *p + offset).collect()
    }
}

impl Surface for Canvas {
    fn size(&self) -> Size {
        self.size
    }

    fn origin(&self) -> Point {
        self.origin
    }

    fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    fn clear_rect(&mut self, rect: Rect) {
        let rect = rect + self.origin.to_vec2();
        let covers_all = rect.x0 <= 0.0
            && rect.y0 <= 0.0
            && rect.x1 >= self.size.width
            && rect.y1 >= self.size.height;
        if covers_all {
            self.objects.clear();
            return;
        }
        self.objects.retain(|obj| {
            let b = obj.bounds();
            b.x1 < rect.x0 || b.x0 > rect.x1 || b.y1 < rect.y0 || b.y0 > rect.y1
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], style: StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        let points = self.absolute(points);
        self.objects.push(GraphicsObject::Stroke(StrokeObject {
            points,
            closed: false,
            style,
        }));
    }

    fn stroke_polygon(&mut self, points: &[Point], style: StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        let points = self.absolute(points);
        self.objects.push(GraphicsObject::Stroke(StrokeObject {
            points,
            closed: true,
            style,
        }));
    }

    fn fill_polygon(&mut self, points: &[Point], style: FillStyle) {
        if points.len() < 3 {
            return;
        }
        let points = self.absolute(points);
        self.objects
            .push(GraphicsObject::Fill(FillObject { points, style }));
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.objects.push(GraphicsObject::Text(TextObject {
            text: Arc::from(text),
            at: at + self.origin.to_vec2(),
            style: style.clone(),
        }));
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "label lengths are tiny compared to f64 mantissa"
    )]
    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let width = text.chars().count() as Scalar * GLYPH_ADVANCE * style.font_size;
        let (left, right) = match style.align {
            TextAlign::Left => (0.0, width),
            TextAlign::Center => (width / 2.0, width / 2.0),
            TextAlign::Right => (width, 0.0),
        };
        let ascent = GLYPH_ASCENT * style.font_size;
        let descent = GLYPH_DESCENT * style.font_size;
        let (ascent, descent) = match style.baseline {
            TextBaseline::Alphabetic => (ascent, descent),
            TextBaseline::Middle => {
                let half = (ascent + descent) / 2.0;
                (half, half)
            }
        };
        TextMetrics {
            left,
            right,
            ascent,
            descent,
        }
    }

    fn paint_background(&mut self, color: Color) {
        let full = Rect::from_origin_size(Point::ZERO, self.size);
        let corners = vec![
            Point::new(full.x0, full.y0),
            Point::new(full.x1, full.y0),
            Point::new(full.x1, full.y1),
            Point::new(full.x0, full.y1),
        ];
        // Behind existing content, like `destination-over` compositing.
        self.objects.insert(
            0,
            GraphicsObject::Fill(FillObject {
                points: corners,
                style: FillStyle::solid(color),
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
