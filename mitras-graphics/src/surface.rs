//! The abstract 2-D drawing surface.
//!
//! A surface has a pixel size and a movable origin. All drawing calls take
//! coordinates relative to the current origin, in canvas orientation
//! (Y down). Any backend that provides these primitives can host the grid
//! and expression drawings; [`crate::canvas::Canvas`] is the recording one.

use crate::types::{Color, Point, Rect, Scalar, Size};

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Stroke color and width in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: Scalar,
}

impl StrokeStyle {
    #[must_use]
    pub const fn new(color: Color, width: Scalar) -> Self {
        Self { color, width }
    }
}

/// Fill color with opacity in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub color: Color,
    pub alpha: Scalar,
}

impl FillStyle {
    #[must_use]
    pub const fn solid(color: Color) -> Self {
        Self { color, alpha: 1.0 }
    }
}

/// Horizontal text anchoring relative to the given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchoring relative to the given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
}

/// Font and placement of a text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub font_family: String,
    pub font_size: Scalar,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            font_family: "calibri".to_owned(),
            font_size: 16.0,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Extents of rendered text around its anchor point, all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub left: Scalar,
    pub right: Scalar,
    pub ascent: Scalar,
    pub descent: Scalar,
}

// ---------------------------------------------------------------------------
// Visible bounds
// ---------------------------------------------------------------------------

/// Visible extents of a surface, relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: Scalar,
    pub bottom: Scalar,
    pub left: Scalar,
    pub right: Scalar,
}

impl Bounds {
    /// Compute the bounds of a `size` canvas whose origin sits at `origin`.
    #[must_use]
    pub fn of(size: Size, origin: Point) -> Self {
        Self {
            top: -origin.y,
            bottom: size.height - origin.y,
            left: -origin.x,
            right: size.width - origin.x,
        }
    }

    /// Largest distance from the origin to any edge.
    #[must_use]
    pub fn max(&self) -> Scalar {
        [self.top, self.bottom, self.left, self.right]
            .into_iter()
            .map(Scalar::abs)
            .fold(0.0, Scalar::max)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    #[must_use]
    pub const fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }
}

// ---------------------------------------------------------------------------
// Surface trait
// ---------------------------------------------------------------------------

/// A 2-D drawing surface with a settable origin.
pub trait Surface {
    /// Pixel size of the backing area.
    fn size(&self) -> Size;

    /// Current origin in absolute pixels.
    fn origin(&self) -> Point;

    /// Move the origin (the viewport pan position).
    fn set_origin(&mut self, origin: Point);

    /// Erase everything inside `rect`.
    fn clear_rect(&mut self, rect: Rect);

    /// Stroke an open polyline.
    fn stroke_polyline(&mut self, points: &[Point], style: StrokeStyle);

    /// Stroke a closed polygon outline.
    fn stroke_polygon(&mut self, points: &[Point], style: StrokeStyle);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], style: FillStyle);

    /// Draw a text label anchored at `at`.
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);

    /// Measure a label as [`Surface::fill_text`] would draw it.
    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Paint an opaque background behind everything already drawn.
    fn paint_background(&mut self, color: Color);

    /// Stroke a single segment.
    fn stroke_line(&mut self, from: Point, to: Point, style: StrokeStyle) {
        self.stroke_polyline(&[from, to], style);
    }

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, style: FillStyle) {
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        self.fill_polygon(&corners, style);
    }

    /// Visible extents relative to the current origin.
    fn visible_bounds(&self) -> Bounds {
        Bounds::of(self.size(), self.origin())
    }

    /// Erase the currently visible region (not the whole backing store).
    fn clear_visible(&mut self) {
        let rect = self.visible_bounds().to_rect();
        self.clear_rect(rect);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
