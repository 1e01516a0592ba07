//! Drawing an expression list onto a surface.
//!
//! Every pass is a full redraw: clear the visible region, draw the base
//! grid, then each record. A record whose animation is running is drawn by
//! [`Scene::tick`] on top of everything else.

use nalgebra::DMatrix;

use mitras_graphics::primitives::{
    draw_determinant, draw_eigenvectors, draw_transformation, draw_vector,
};
use mitras_graphics::grid::draw_grid;
use mitras_graphics::surface::Surface;
use mitras_graphics::types::{Affine, DrawOptions, Vec2, linear_map};
use mitras_graphics::viewport::Viewport;

use crate::analyze::Analysis;
use crate::animation::Tween;
use crate::expr::ExprRecord;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Figures
// ---------------------------------------------------------------------------

/// How an evaluated expression is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    /// Rays along both columns of an `eigenvectors` result.
    Eigenvectors(DMatrix<f64>),
    /// The grid mapped by a 2×2 matrix.
    Transformation(DMatrix<f64>),
    /// An arrow from the origin.
    Arrow(Vec2),
    /// The unit square mapped by the argument of `det`.
    Determinant(DMatrix<f64>),
}

fn is_2x2(m: &DMatrix<f64>) -> bool {
    m.shape() == (2, 2)
}

impl Figure {
    /// Pick a drawing strategy, or `None` for shapes with no geometric
    /// meaning.
    #[must_use]
    pub fn of(analysis: &Analysis) -> Option<Self> {
        let primary = analysis.primary_function.as_str();
        match analysis.value.as_ref()? {
            Value::Matrix(m) if is_2x2(m) && primary == "eigenvectors" => {
                Some(Self::Eigenvectors(m.clone()))
            }
            Value::Matrix(m) if is_2x2(m) => Some(Self::Transformation(m.clone())),
            Value::Vector(v) if v.len() == 2 && primary != "eigenvalues" => {
                Some(Self::Arrow(Vec2::new(v[0], v[1])))
            }
            Value::Number(_) if primary == "det" => match analysis.primary_args.first() {
                Some(Value::Matrix(m)) if is_2x2(m) => Some(Self::Determinant(m.clone())),
                _ => None,
            },
            _ => None,
        }
    }

    /// The matrix an animation runs from and the one it ends at, for
    /// figures that animate.
    #[must_use]
    pub fn tween(&self, duration_ms: f64) -> Option<Tween> {
        match self {
            Self::Eigenvectors(m) => Some(Tween::new(normalize_columns(m), m.clone(), duration_ms)),
            Self::Transformation(m) | Self::Determinant(m) => Some(Tween::new(
                DMatrix::identity(2, 2),
                m.clone(),
                duration_ms,
            )),
            Self::Arrow(_) => None,
        }
    }

    /// Draw the figure, substituting `frame` for its matrix when animating.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: &Viewport,
        frame: Option<&DMatrix<f64>>,
        options: &DrawOptions,
    ) {
        match self {
            Self::Arrow(v) => draw_vector(surface, viewport, *v, options),
            Self::Eigenvectors(m) => {
                let m = frame.unwrap_or(m);
                let columns = [Vec2::new(m[(0, 0)], m[(1, 0)]), Vec2::new(m[(0, 1)], m[(1, 1)])];
                draw_eigenvectors(surface, viewport, columns, options);
            }
            Self::Transformation(m) => {
                draw_transformation(surface, viewport, to_affine(frame.unwrap_or(m)), options);
            }
            Self::Determinant(m) => {
                draw_determinant(surface, viewport, to_affine(frame.unwrap_or(m)), options);
            }
        }
    }
}

/// Divide each column by its length; zero columns stay zero.
fn normalize_columns(m: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = m.clone();
    for mut column in out.column_iter_mut() {
        let norm = column.norm();
        if norm > 0.0 {
            column /= norm;
        }
    }
    out
}

fn to_affine(m: &DMatrix<f64>) -> Affine {
    linear_map(m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)])
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Draws the base grid and an expression list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scene {
    /// Options for the base grid.
    pub grid: DrawOptions,
}

impl Scene {
    #[must_use]
    pub const fn new(grid: DrawOptions) -> Self {
        Self { grid }
    }

    /// Full redraw of every record.
    ///
    /// With `animate` set, pending animation requests start here; without
    /// it they stay pending and the record is drawn at rest. Records whose
    /// animation already runs are skipped until the next tick. Returns
    /// whether any animation is running afterwards.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: &Viewport,
        records: &mut [ExprRecord],
        animate: bool,
    ) -> bool {
        self.begin(surface, viewport);
        for record in records.iter_mut() {
            draw_record(surface, viewport, record, animate);
        }
        records.iter().any(|r| r.animation.is_running())
    }

    /// Advance running animations to `now_ms` and redraw: records at rest
    /// first, then each animation frame on top.
    ///
    /// Returns whether any animation still runs. Nothing is drawn when none
    /// was running.
    pub fn tick<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: &Viewport,
        records: &mut [ExprRecord],
        now_ms: f64,
    ) -> bool {
        if !records.iter().any(|r| r.animation.is_running()) {
            return false;
        }
        self.begin(surface, viewport);
        for record in records.iter_mut().filter(|r| !r.animation.is_running()) {
            draw_record(surface, viewport, record, false);
        }

        let mut running = false;
        for record in records.iter_mut() {
            let Some(tick) = record.animation.tick(now_ms) else {
                continue;
            };
            running |= !tick.is_finished();
            if let Some(figure) = Figure::of(&record.analysis)
                && record.is_drawable()
            {
                figure.draw(surface, viewport, Some(tick.matrix()), &record.options);
            }
        }
        running
    }

    fn begin<S: Surface + ?Sized>(&self, surface: &mut S, viewport: &Viewport) {
        surface.set_origin(viewport.origin);
        surface.clear_visible();
        draw_grid(
            surface,
            viewport.step,
            viewport.step_px,
            Affine::IDENTITY,
            &self.grid,
        );
    }
}

/// Draw one record at rest, or start its pending animation.
///
/// A running record is left to the frames drawn by [`Scene::tick`].
fn draw_record<S: Surface + ?Sized>(
    surface: &mut S,
    viewport: &Viewport,
    record: &mut ExprRecord,
    animate: bool,
) {
    if !record.is_drawable() || record.animation.is_running() {
        return;
    }
    let Some(figure) = Figure::of(&record.analysis) else {
        log::trace!("expression {} has nothing to draw", record.id());
        return;
    };

    if record.animation.is_requested() && animate {
        match figure.tween(record.animation_duration_ms) {
            Some(tween) => {
                let initial = tween.initial.clone();
                record.animation.start(tween);
                figure.draw(surface, viewport, Some(&initial), &record.options);
                return;
            }
            None => {
                log::debug!("expression {} cannot animate", record.id());
                record.animation.cancel_request();
            }
        }
    }
    figure.draw(surface, viewport, None, &record.options);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use mitras_graphics::canvas::{Canvas, GraphicsObject};
    use mitras_graphics::types::Point;

    use super::*;
    use crate::animation::AnimationState;
    use crate::expr::{ExprId, ExprKind, ExprList};

    fn list_of(sources: &[&str]) -> ExprList {
        let mut list = ExprList::new();
        list.load(
            sources
                .iter()
                .zip(0..)
                .map(|(source, id)| ExprRecord::new(ExprId(id), ExprKind::Math, *source))
                .collect(),
        );
        list
    }

    fn figure(source: &str) -> Option<Figure> {
        let list = list_of(&[source]);
        Figure::of(&list.records()[0].analysis)
    }

    fn setup() -> (Canvas, Viewport) {
        (Canvas::new(400.0, 300.0), Viewport::new(400.0, 300.0))
    }

    #[test]
    fn figures_by_classification() {
        assert!(matches!(
            figure(r"\begin{bmatrix}1\\2\end{bmatrix}"),
            Some(Figure::Arrow(v)) if v == Vec2::new(1.0, 2.0)
        ));
        assert!(matches!(
            figure(r"\begin{bmatrix}0&-1\\1&0\end{bmatrix}"),
            Some(Figure::Transformation(_))
        ));
        assert!(matches!(
            figure(r"\operatorname{eigenvectors}(\begin{bmatrix}2&1\\1&2\end{bmatrix})"),
            Some(Figure::Eigenvectors(_))
        ));
        assert!(matches!(
            figure(r"\det(\begin{bmatrix}2&0\\0&3\end{bmatrix})"),
            Some(Figure::Determinant(_))
        ));
    }

    #[test]
    fn shapes_without_geometry_draw_nothing() {
        assert_eq!(figure("3"), None);
        assert_eq!(figure(r"\begin{bmatrix}1\\2\\3\end{bmatrix}"), None);
        assert_eq!(
            figure(r"\operatorname{eigenvalues}(\begin{bmatrix}2&0\\0&3\end{bmatrix})"),
            None
        );
        assert_eq!(figure(r"\det(5)"), None);
    }

    #[test]
    fn draw_clears_then_draws_grid_and_records() {
        let (mut canvas, viewport) = setup();
        let mut list = list_of(&[r"\begin{bmatrix}1\\1\end{bmatrix}"]);
        let scene = Scene::default();

        scene.draw(&mut canvas, &viewport, list.records_mut(), false);
        let first = canvas.objects().len();
        scene.draw(&mut canvas, &viewport, list.records_mut(), false);
        // Second pass replaces the first rather than stacking on it
        assert_eq!(canvas.objects().len(), first);

        // Arrow head fill is the last object
        assert!(matches!(canvas.objects().last(), Some(GraphicsObject::Fill(_))));
    }

    #[test]
    fn surface_origin_follows_viewport() {
        let (mut canvas, mut viewport) = setup();
        viewport.pan(Vec2::new(10.0, -5.0));
        let mut list = list_of(&[]);
        Scene::default().draw(&mut canvas, &viewport, list.records_mut(), false);
        assert_eq!(canvas.origin(), Point::new(210.0, 145.0));
    }

    #[test]
    fn animation_runs_to_final_matrix() {
        let (mut canvas, viewport) = setup();
        let mut list = list_of(&[r"\begin{bmatrix}2&0\\0&2\end{bmatrix}"]);
        list.set_animation_duration(ExprId(0), 100.0).unwrap();
        list.request_animation(ExprId(0));
        let scene = Scene::default();

        assert!(scene.draw(&mut canvas, &viewport, list.records_mut(), true));
        let mut now = 0.0;
        while scene.tick(&mut canvas, &viewport, list.records_mut(), now) {
            now += 16.0;
        }
        assert_eq!(list.records()[0].animation, AnimationState::Paused);
        assert!(now >= 100.0);

        // The final frame matches a plain static draw
        let animated = canvas.objects().to_vec();
        scene.draw(&mut canvas, &viewport, list.records_mut(), true);
        assert_eq!(canvas.objects(), animated.as_slice());
    }

    #[test]
    fn arrows_cannot_animate() {
        let (mut canvas, viewport) = setup();
        let mut list = list_of(&[r"\begin{bmatrix}1\\1\end{bmatrix}"]);
        list.request_animation(ExprId(0));
        let running = Scene::default().draw(&mut canvas, &viewport, list.records_mut(), true);
        assert!(!running);
        assert_eq!(list.records()[0].animation, AnimationState::Paused);
    }

    #[test]
    fn pending_request_waits_for_animating_pass() {
        let (mut canvas, viewport) = setup();
        let source = r"\begin{bmatrix}0&-1\\1&0\end{bmatrix}";
        let mut list = list_of(&[source]);
        list.request_animation(ExprId(0));
        Scene::default().draw(&mut canvas, &viewport, list.records_mut(), false);
        assert!(list.records()[0].animation.is_requested());

        // Still drawn at rest while it waits
        let mut at_rest = Canvas::new(400.0, 300.0);
        Scene::default().draw(&mut at_rest, &viewport, list_of(&[source]).records_mut(), false);
        assert_eq!(canvas.objects(), at_rest.objects());
    }

    #[test]
    fn redraw_mid_animation_leaves_running_record_to_ticks() {
        let (mut canvas, viewport) = setup();
        let source = r"\begin{bmatrix}2&0\\0&2\end{bmatrix}";
        let mut list = list_of(&[source]);
        list.set_animation_duration(ExprId(0), 1000.0).unwrap();
        list.request_animation(ExprId(0));
        let scene = Scene::default();

        assert!(scene.draw(&mut canvas, &viewport, list.records_mut(), true));
        assert!(scene.tick(&mut canvas, &viewport, list.records_mut(), 0.0));
        assert!(scene.tick(&mut canvas, &viewport, list.records_mut(), 500.0));
        assert!(list.records()[0].animation.is_running());

        // A pan or zoom redraw between frames
        assert!(scene.draw(&mut canvas, &viewport, list.records_mut(), true));
        let redrawn = canvas.objects().to_vec();

        let mut at_target = Canvas::new(400.0, 300.0);
        scene.draw(&mut at_target, &viewport, list_of(&[source]).records_mut(), false);
        assert_ne!(redrawn.as_slice(), at_target.objects());

        let mut grid_only = Canvas::new(400.0, 300.0);
        scene.draw(&mut grid_only, &viewport, list_of(&[]).records_mut(), false);
        assert_eq!(redrawn.as_slice(), grid_only.objects());

        // The next tick puts the frame back
        assert!(scene.tick(&mut canvas, &viewport, list.records_mut(), 600.0));
        assert!(canvas.objects().len() > grid_only.objects().len());
    }

    #[test]
    fn tick_without_animation_draws_nothing() {
        let (mut canvas, viewport) = setup();
        let mut list = list_of(&["1"]);
        assert!(!Scene::default().tick(&mut canvas, &viewport, list.records_mut(), 0.0));
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn normalized_columns_have_unit_length() {
        let m = DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 4.0, 0.0]);
        let n = normalize_columns(&m);
        assert_eq!(n[(0, 0)], 0.6);
        assert_eq!(n[(1, 0)], 0.8);
        assert_eq!(n[(0, 1)], 0.0);
    }
}
