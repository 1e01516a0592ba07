//! Geometric primitives for evaluated expressions.
//!
//! Inputs are graph-space values (Y up) already converted to `kurbo`
//! types; every routine scales them by the viewport's pixels per unit and
//! flips Y onto the canvas.

use std::f64::consts::FRAC_PI_6;

use crate::grid::draw_grid;
use crate::surface::{FillStyle, StrokeStyle, Surface};
use crate::types::{Affine, DrawOptions, Point, Scalar, Vec2};
use crate::viewport::Viewport;

/// Arrowheads are 15 px long unless the arrow is shorter than this.
const SHORT_ARROW_PX: Scalar = 20.0;
const HEAD_LENGTH_PX: Scalar = 15.0;
/// Fraction of a short arrow taken up by its head.
const SHORT_HEAD_RATIO: Scalar = 0.75;
/// Opening of the head relative to the shaft, in radians.
const HEAD_SQUISH: Scalar = 0.9;

const SHAFT_WIDTH: Scalar = 3.0;
const OUTLINE_WIDTH: Scalar = 1.0;
/// Opacity of the determinant area.
const AREA_ALPHA: Scalar = 0.4;
/// Closest spacing between neighbouring eigenvector rays.
const MIN_RAY_SPACING_PX: Scalar = 1.0;

/// Graph-space point to canvas pixels.
#[inline]
fn project(v: Vec2, px_per_unit: Scalar) -> Point {
    Point::new(v.x * px_per_unit, -v.y * px_per_unit)
}

// ---------------------------------------------------------------------------
// Vectors
// ---------------------------------------------------------------------------

/// Head corners `[left, tip, right]` of an arrow from `tail` to `tip`.
#[must_use]
pub fn arrow_head(tail: Point, tip: Point) -> [Point; 3] {
    let shaft = tip - tail;
    let length = shaft.hypot();
    let head = if length < SHORT_ARROW_PX {
        length * SHORT_HEAD_RATIO
    } else {
        HEAD_LENGTH_PX
    };
    let angle = shaft.atan2();
    let right = tip - Vec2::from_angle(angle + HEAD_SQUISH - FRAC_PI_6) * head;
    let left = tip - Vec2::from_angle(angle - HEAD_SQUISH + FRAC_PI_6) * head;
    [left, tip, right]
}

/// Draw an arrow from the origin to `to` (graph units).
pub fn draw_vector<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    to: Vec2,
    options: &DrawOptions,
) {
    if !options.visible {
        return;
    }
    let tip = project(to, viewport.px_per_unit());
    let head = arrow_head(Point::ZERO, tip);
    surface.stroke_line(
        Point::ZERO,
        tip,
        StrokeStyle::new(options.color, SHAFT_WIDTH),
    );
    surface.stroke_polygon(&head, StrokeStyle::new(options.color, OUTLINE_WIDTH));
    surface.fill_polygon(&head, FillStyle::solid(options.color));
}

// ---------------------------------------------------------------------------
// Matrices
// ---------------------------------------------------------------------------

/// Draw the grid as mapped by the linear transformation `matrix`.
pub fn draw_transformation<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    matrix: Affine,
    options: &DrawOptions,
) {
    draw_grid(surface, viewport.step, viewport.step_px, matrix, options);
}

/// Canvas corners of the unit square mapped by `matrix`, starting at the
/// origin.
#[must_use]
pub fn determinant_corners(matrix: Affine, px_per_unit: Scalar) -> [Point; 4] {
    let corner = |x: Scalar, y: Scalar| {
        let p = matrix * Point::new(x, y);
        project(p.to_vec2(), px_per_unit)
    };
    [
        Point::ZERO,
        corner(1.0, 0.0),
        corner(1.0, 1.0),
        corner(0.0, 1.0),
    ]
}

/// Draw the image of the unit square, whose area is the determinant.
pub fn draw_determinant<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    matrix: Affine,
    options: &DrawOptions,
) {
    if !options.visible {
        return;
    }
    let corners = determinant_corners(matrix, viewport.px_per_unit());
    surface.stroke_polygon(&corners, StrokeStyle::new(options.color, OUTLINE_WIDTH));
    surface.fill_polygon(
        &corners,
        FillStyle {
            color: options.color,
            alpha: AREA_ALPHA,
        },
    );
}

// ---------------------------------------------------------------------------
// Eigenvectors
// ---------------------------------------------------------------------------

/// Multiples `±i · v / zoom` along an eigenvector that reach the visible
/// edge, positive then negative for each `i`.
///
/// `max_coord` is the graph-space extent of the drawn grid. Multiples
/// closer than one pixel apart are thinned so that neighbouring rays stay
/// at least a pixel apart. A zero vector yields no rays.
#[must_use]
pub fn eigen_rays(
    v: Vec2,
    max_coord: Scalar,
    zoom_factor: Scalar,
    px_per_unit: Scalar,
) -> Vec<Vec2> {
    let largest = v.x.abs().max(v.y.abs());
    if largest == 0.0 || !largest.is_finite() || zoom_factor <= 0.0 || px_per_unit <= 0.0 {
        log::debug!("no rays for eigenvector {v:?} at zoom {zoom_factor}");
        return Vec::new();
    }
    let count = max_coord / largest * zoom_factor + 1.0;
    let unit = v / zoom_factor;
    let stride = (MIN_RAY_SPACING_PX / (unit.hypot() * px_per_unit))
        .ceil()
        .max(1.0);
    let mut rays = Vec::new();
    let mut i = stride;
    while i < count {
        rays.push(unit * i);
        rays.push(-unit * i);
        i += stride;
    }
    rays
}

/// Draw repeated arrows along both eigenvector columns.
pub fn draw_eigenvectors<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    columns: [Vec2; 2],
    options: &DrawOptions,
) {
    if !options.visible {
        return;
    }
    let steps = (surface.visible_bounds().max() / viewport.step_px).floor() + 1.0;
    let max_coord = steps * viewport.step.value();
    for column in columns {
        for ray in eigen_rays(column, max_coord, viewport.zoom_factor, viewport.px_per_unit()) {
            draw_vector(surface, viewport, ray, options);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, GraphicsObject};
    use crate::types::linear_map;
    use crate::viewport::Step;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn identity_determinant_is_unit_square() {
        let corners = determinant_corners(Affine::IDENTITY, 100.0);
        let expected = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, -100.0),
            Point::new(0.0, -100.0),
        ];
        for (c, e) in corners.iter().zip(expected) {
            assert!(close(*c, e), "corner {c:?} != {e:?}");
        }
    }

    #[test]
    fn determinant_follows_step() {
        // Step 2 over 100 px is 50 px per unit
        let vp = Viewport {
            step: Step::new(2, 0).unwrap(),
            ..Viewport::new(400.0, 400.0)
        };
        let corners = determinant_corners(linear_map(2.0, 0.0, 0.0, 3.0), vp.px_per_unit());
        assert!(close(corners[2], Point::new(100.0, -150.0)));
    }

    #[test]
    fn determinant_draws_outline_and_translucent_fill() {
        let mut canvas = Canvas::new(200.0, 200.0);
        let vp = Viewport::new(200.0, 200.0);
        draw_determinant(&mut canvas, &vp, Affine::IDENTITY, &DrawOptions::default());
        assert_eq!(canvas.objects().len(), 2);
        match &canvas.objects()[1] {
            GraphicsObject::Fill(f) => assert_eq!(f.style.alpha, 0.4),
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn short_arrows_get_proportional_heads() {
        let [left, tip, right] = arrow_head(Point::ZERO, Point::new(10.0, 0.0));
        assert_eq!(tip, Point::new(10.0, 0.0));
        // Head length 7.5 px: corners sit at most that far from the tip
        assert!((left - tip).hypot() <= 7.5 + 1e-9);
        assert!((right - tip).hypot() <= 7.5 + 1e-9);
        // Symmetric about the shaft
        assert!((left.y + right.y).abs() < 1e-9);
    }

    #[test]
    fn long_arrows_get_fixed_heads() {
        let [left, tip, _] = arrow_head(Point::ZERO, Point::new(0.0, -200.0));
        assert!(((left - tip).hypot() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn vector_points_up_on_canvas() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let vp = Viewport::new(100.0, 100.0);
        draw_vector(&mut canvas, &vp, Vec2::new(0.0, 1.0), &DrawOptions::default());
        match &canvas.objects()[0] {
            GraphicsObject::Stroke(s) => {
                assert_eq!(s.style.width, 3.0);
                assert!(close(s.points[1], Point::new(0.0, -100.0)));
            }
            other => panic!("expected stroke, got {other:?}"),
        }
    }

    #[test]
    fn eigen_rays_are_symmetric() {
        let rays = eigen_rays(Vec2::new(1.0, 0.5), 5.0, 1.0, 100.0);
        let positive = rays.iter().filter(|r| r.x > 0.0).count();
        let negative = rays.iter().filter(|r| r.x < 0.0).count();
        assert_eq!(positive, negative);
        assert_eq!(positive, 5);
    }

    #[test]
    fn eigen_rays_scale_with_zoom() {
        // Zoomed in twice: half-length rays, twice as many
        let rays = eigen_rays(Vec2::new(1.0, 0.0), 3.0, 2.0, 100.0);
        assert_eq!(rays.len(), 2 * 6);
        assert_eq!(rays[0], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn zero_eigenvector_draws_nothing() {
        assert!(eigen_rays(Vec2::ZERO, 5.0, 1.0, 100.0).is_empty());
    }

    #[test]
    fn tiny_eigenvectors_are_thinned_to_a_pixel() {
        // 1/1024 unit at 64 px per unit is 1/16 px: every 16th multiple survives
        let rays = eigen_rays(Vec2::new(1.0 / 1024.0, 0.0), 4.0, 1.0, 64.0);
        assert_eq!(rays.len(), 2 * 256);
        assert_eq!(rays[0], Vec2::new(1.0 / 64.0, 0.0));
        assert_eq!(rays[1], Vec2::new(-1.0 / 64.0, 0.0));
        assert_eq!(rays[rays.len() - 2], Vec2::new(4.0, 0.0));
        for pair in rays.chunks(2).collect::<Vec<_>>().windows(2) {
            let spacing_px = (pair[1][0].x - pair[0][0].x) * 64.0;
            assert_eq!(spacing_px, 1.0);
        }
    }

    #[test]
    fn tiny_eigenvectors_stay_bounded_on_canvas() {
        let mut canvas = Canvas::new(400.0, 300.0);
        canvas.set_origin(Point::new(200.0, 150.0));
        let vp = Viewport::new(400.0, 300.0);
        let columns = [Vec2::new(1e-10, 0.0), Vec2::new(0.0, 1e-10)];
        draw_eigenvectors(&mut canvas, &vp, columns, &DrawOptions::default());
        let objects = canvas.objects().len();
        assert!(objects > 0);
        assert!(objects < 20_000, "{objects} objects drawn");
    }

    #[test]
    fn hidden_primitives_draw_nothing() {
        let mut canvas = Canvas::new(100.0, 100.0);
        let vp = Viewport::new(100.0, 100.0);
        let hidden = DrawOptions {
            visible: false,
            ..DrawOptions::default()
        };
        draw_vector(&mut canvas, &vp, Vec2::new(1.0, 1.0), &hidden);
        draw_determinant(&mut canvas, &vp, Affine::IDENTITY, &hidden);
        draw_eigenvectors(&mut canvas, &vp, [Vec2::new(1.0, 0.0); 2], &hidden);
        draw_transformation(&mut canvas, &vp, Affine::IDENTITY, &hidden);
        assert!(canvas.objects().is_empty());
    }
}
