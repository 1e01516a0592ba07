//! Adaptive coordinate grid.
//!
//! Lines and labels are laid out in unscaled graph pixels (Y up), pushed
//! through the caller's linear map and then flipped onto the canvas. With
//! the identity map this is the base grid; with a matrix it shows where
//! the base grid lands under that linear transformation.

use crate::surface::{FillStyle, StrokeStyle, Surface, TextAlign, TextBaseline, TextStyle};
use crate::types::{Affine, Color, DrawOptions, Point, Rect, Scalar};
use crate::viewport::Step;

/// Distance of axis labels from the axis they annotate: a sixth of
/// [`crate::viewport::MIN_STEP_PX`], rounded down.
pub const LABEL_OFFSET: Scalar = 16.0;

/// Padding around the white label background.
const LABEL_PADDING: Scalar = 2.0;

/// Map a graph-pixel point (Y up) onto the canvas (Y down).
#[inline]
fn to_canvas(transform: Affine, p: Point) -> Point {
    let q = transform * p;
    Point::new(q.x, -q.y)
}

/// Draw a label with a white background box, skipping it when its anchor
/// is outside the visible region.
pub fn draw_label<S: Surface + ?Sized>(surface: &mut S, text: &str, at: Point, style: &TextStyle) {
    if !surface.visible_bounds().contains(at) {
        return;
    }
    let m = surface.measure_text(text, style);
    let background = Rect::new(
        at.x - m.left - LABEL_PADDING,
        at.y - m.ascent - LABEL_PADDING,
        at.x + m.right + LABEL_PADDING,
        at.y + m.descent + LABEL_PADDING,
    );
    surface.fill_rect(background, FillStyle::solid(Color::WHITE));
    surface.fill_text(text, at, style);
}

/// Draw grid lines, axes and labels.
///
/// `step_px` is the on-screen distance between major lines and `step` the
/// value they stand for. `transform` acts on graph pixels; pass
/// [`Affine::IDENTITY`] for the plain grid.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "visible extent over a positive step is a small non-negative count"
)]
pub fn draw_grid<S: Surface + ?Sized>(
    surface: &mut S,
    step: Step,
    step_px: Scalar,
    transform: Affine,
    options: &DrawOptions,
) {
    if !options.visible || step_px <= 0.0 {
        return;
    }
    let sub_steps = step.sub_steps();
    let px_per_sub_step = (step_px / Scalar::from(sub_steps)).floor();
    let max_steps = (surface.visible_bounds().max() / step_px).floor() as u64 + 1;
    #[expect(clippy::cast_precision_loss, reason = "step count is small")]
    let max_coord = max_steps as Scalar * step_px;
    log::trace!("grid: step {step} at {step_px} px, {max_steps} steps each way");

    let axis = StrokeStyle::new(options.color, 1.0);
    let major = StrokeStyle::new(options.color.shade(0.5), 1.0);
    let minor = StrokeStyle::new(options.color.shade(0.9), 1.0);

    let horizontal = |surface: &mut S, y: Scalar, style: StrokeStyle| {
        surface.stroke_line(
            to_canvas(transform, Point::new(-max_coord, y)),
            to_canvas(transform, Point::new(max_coord, y)),
            style,
        );
    };
    let vertical = |surface: &mut S, x: Scalar, style: StrokeStyle| {
        surface.stroke_line(
            to_canvas(transform, Point::new(x, -max_coord)),
            to_canvas(transform, Point::new(x, max_coord)),
            style,
        );
    };
    let label = |surface: &mut S, text: &str, x: Scalar, y: Scalar, align: TextAlign| {
        let style = TextStyle {
            color: options.color,
            align,
            baseline: TextBaseline::Middle,
            ..TextStyle::default()
        };
        draw_label(surface, text, to_canvas(transform, Point::new(x, y)), &style);
    };

    for i in 0..=max_steps {
        #[expect(clippy::cast_precision_loss, reason = "step count is small")]
        let d = i as Scalar * step_px;

        if options.show_minor && i < max_steps {
            for j in 1..sub_steps {
                let offset = d + Scalar::from(j) * px_per_sub_step;
                horizontal(surface, offset, minor);
                horizontal(surface, -offset, minor);
                vertical(surface, offset, minor);
                vertical(surface, -offset, minor);
            }
        }

        // i == 0 is the main axis, drawn last
        if i == 0 {
            continue;
        }
        horizontal(surface, d, major);
        horizontal(surface, -d, major);
        vertical(surface, d, major);
        vertical(surface, -d, major);

        if options.show_coords {
            let coord = step.label(i);
            let negative = format!("-{coord}");
            label(surface, &negative, -LABEL_OFFSET, -d, TextAlign::Right);
            label(surface, &coord, -LABEL_OFFSET, d, TextAlign::Right);
            label(surface, &coord, d, -LABEL_OFFSET, TextAlign::Center);
            label(surface, &negative, -d, -LABEL_OFFSET, TextAlign::Center);
        }
    }

    if options.show_coords {
        label(surface, "0", -LABEL_OFFSET, -LABEL_OFFSET, TextAlign::Right);
    }
    horizontal(surface, 0.0, axis);
    vertical(surface, 0.0, axis);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
