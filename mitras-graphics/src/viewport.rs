//! Pan and zoom state of the graph.
//!
//! The distance between two major grid lines is a [`Step`]: a "nice"
//! number `m · 10^k` with `m` in {1, 2, 5}. Zooming slides `step_px`
//! between [`MIN_STEP_PX`] and `MIN_STEP_PX · factor`; crossing either end
//! moves the step one notch along the 1-2-5 ladder. Steps are kept in
//! mantissa/exponent form so labels never accumulate float drift.

use std::fmt;

use crate::surface::Bounds;
use crate::types::{Point, Scalar, Size, Vec2};

/// Minimum pixels per major step; below this the step gets coarser.
pub const MIN_STEP_PX: Scalar = 100.0;

/// Magnitude at which axis labels switch to exponent notation.
const LABEL_UPPER_EXP: i32 = 5;
const LABEL_LOWER_EXP: i32 = -5;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// A grid step value `mantissa · 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    mantissa: u8,
    exponent: i32,
}

impl Step {
    pub const ONE: Self = Self {
        mantissa: 1,
        exponent: 0,
    };

    /// Build a step; `None` unless `mantissa` is 1, 2 or 5.
    #[must_use]
    pub const fn new(mantissa: u8, exponent: i32) -> Option<Self> {
        match mantissa {
            1 | 2 | 5 => Some(Self { mantissa, exponent }),
            _ => None,
        }
    }

    #[must_use]
    pub const fn mantissa(self) -> u8 {
        self.mantissa
    }

    #[must_use]
    pub const fn exponent(self) -> i32 {
        self.exponent
    }

    /// Numeric value of the step.
    #[must_use]
    pub fn value(self) -> Scalar {
        Scalar::from(self.mantissa) * 10f64.powi(self.exponent)
    }

    /// Whether the step is an even integer (`step mod 2 == 0`).
    #[must_use]
    pub const fn is_even(self) -> bool {
        self.exponent >= 1 || (self.exponent == 0 && self.mantissa == 2)
    }

    /// Number of minor subdivisions per step: 4 for even steps, 5 otherwise,
    /// so sub-step marks land on round fractions.
    #[must_use]
    pub const fn sub_steps(self) -> u32 {
        if self.is_even() { 4 } else { 5 }
    }

    /// Next smaller step and the factor it divides by (1 → 0.5 → 0.2 → 0.1).
    #[must_use]
    pub const fn finer(self) -> (Self, Scalar) {
        match self.mantissa {
            1 => (Self::with(5, self.exponent - 1), 2.0),
            2 => (Self::with(1, self.exponent), 2.0),
            _ => (Self::with(2, self.exponent), 2.5),
        }
    }

    /// Next larger step and the factor it multiplies by (1 → 2 → 5 → 10).
    #[must_use]
    pub const fn coarser(self) -> (Self, Scalar) {
        match self.mantissa {
            1 => (Self::with(2, self.exponent), 2.0),
            2 => (Self::with(5, self.exponent), 2.5),
            _ => (Self::with(1, self.exponent + 1), 2.0),
        }
    }

    const fn with(mantissa: u8, exponent: i32) -> Self {
        Self { mantissa, exponent }
    }

    /// Exact label for `multiple · step`.
    ///
    /// Uses exponent notation (`1e+5`, `2.5e-6`) once the magnitude reaches
    /// 1e5 or drops below 1e-5, plain decimals otherwise.
    #[must_use]
    pub fn label(self, multiple: u64) -> String {
        let mut digits = u128::from(multiple) * u128::from(self.mantissa);
        if digits == 0 {
            return "0".to_owned();
        }
        let mut exponent = self.exponent;
        while digits % 10 == 0 {
            digits /= 10;
            exponent += 1;
        }
        let digits = digits.to_string();
        let len = i32::try_from(digits.len()).unwrap_or(i32::MAX);
        let sci_exponent = len - 1 + exponent;

        if !(LABEL_LOWER_EXP..LABEL_UPPER_EXP).contains(&sci_exponent) {
            let (lead, rest) = digits.split_at(1);
            let sign = if sci_exponent < 0 { '-' } else { '+' };
            let mut s = lead.to_owned();
            if !rest.is_empty() {
                s.push('.');
                s.push_str(rest);
            }
            return format!("{s}e{sign}{}", sci_exponent.unsigned_abs());
        }

        if exponent >= 0 {
            let zeros = "0".repeat(exponent.unsigned_abs() as usize);
            return format!("{digits}{zeros}");
        }
        let int_len = len + exponent;
        if int_len > 0 {
            let (int, frac) = digits.split_at(int_len.unsigned_abs() as usize);
            format!("{int}.{frac}")
        } else {
            let zeros = "0".repeat(int_len.unsigned_abs() as usize);
            format!("0.{zeros}{digits}")
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(1))
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Canvas size, pan position and zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas size in pixels.
    pub size: Size,
    /// Position of graph (0, 0) in canvas pixels.
    pub origin: Point,
    /// Value between two major grid lines.
    pub step: Step,
    /// Pixels between two major grid lines.
    pub step_px: Scalar,
    /// Accumulated zoom relative to the initial step.
    pub zoom_factor: Scalar,
}

impl Viewport {
    /// A viewport centered on the origin at the default zoom.
    #[must_use]
    pub fn new(width: Scalar, height: Scalar) -> Self {
        Self {
            size: Size::new(width, height),
            origin: Point::new(width / 2.0, height / 2.0),
            step: Step::ONE,
            step_px: MIN_STEP_PX,
            zoom_factor: 1.0,
        }
    }

    /// Pixels per graph unit.
    #[must_use]
    pub fn px_per_unit(&self) -> Scalar {
        self.step_px / self.step.value()
    }

    /// Visible extents relative to the origin.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::of(self.size, self.origin)
    }

    /// Move the origin by a drag delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.origin += delta;
    }

    /// Put graph (0, 0) back in the middle of the canvas.
    pub fn center(&mut self) {
        self.origin = Point::new(self.size.width / 2.0, self.size.height / 2.0);
    }

    /// Change the canvas size, keeping the pan position.
    pub fn resize(&mut self, width: Scalar, height: Scalar) {
        self.size = Size::new(width, height);
    }

    /// Apply a wheel event: negative `delta_y` zooms in.
    ///
    /// The graph point under `anchor` (canvas pixels) stays put.
    pub fn zoom(&mut self, delta_y: Scalar, anchor: Point) {
        let scroll = -delta_y * 0.1;
        let zooming_in = scroll > 0.0;
        let mut next_step_px = self.step_px + scroll;
        let mut next_step = self.step;

        if zooming_in {
            let (finer, factor) = self.step.finer();
            let max_step_px = MIN_STEP_PX * factor;
            if next_step_px >= max_step_px {
                next_step_px = wrap(next_step_px, MIN_STEP_PX, max_step_px);
                next_step = finer;
                self.zoom_factor *= factor;
            }
        } else {
            let (coarser, factor) = self.step.coarser();
            let max_step_px = MIN_STEP_PX * factor;
            if next_step_px < MIN_STEP_PX {
                next_step_px = wrap(next_step_px, MIN_STEP_PX, max_step_px);
                next_step = coarser;
                self.zoom_factor /= factor;
            }
        }

        let unit_px = self.px_per_unit();
        let next_unit_px = next_step_px / next_step.value();
        let scale = (next_unit_px - unit_px) / unit_px;
        self.origin -= (anchor - self.origin) * scale;
        self.step = next_step;
        self.step_px = next_step_px;
    }
}

/// Wrap `x` into `[min, max)`.
fn wrap(x: Scalar, min: Scalar, max: Scalar) -> Scalar {
    (x - min).rem_euclid(max - min) + min
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn step(m: u8, e: i32) -> Step {
        Step::new(m, e).unwrap()
    }

    #[test]
    fn parity_picks_subdivisions() {
        assert_eq!(step(1, 0).sub_steps(), 5);
        assert_eq!(step(2, 0).sub_steps(), 4);
        assert_eq!(step(5, 0).sub_steps(), 5);
        assert_eq!(step(1, 1).sub_steps(), 4);
        assert_eq!(step(5, -1).sub_steps(), 5);
        assert_eq!(step(2, -1).sub_steps(), 5);
    }

    #[test]
    fn ladder_is_one_two_five() {
        let mut s = Step::ONE;
        let mut seen = Vec::new();
        for _ in 0..4 {
            s = s.finer().0;
            seen.push(s.to_string());
        }
        assert_eq!(seen, ["0.5", "0.2", "0.1", "0.05"]);

        let mut s = Step::ONE;
        let mut seen = Vec::new();
        for _ in 0..4 {
            s = s.coarser().0;
            seen.push(s.to_string());
        }
        assert_eq!(seen, ["2", "5", "10", "20"]);
    }

    #[test]
    fn ladder_roundtrips() {
        for m in [1, 2, 5] {
            let s = step(m, 3);
            assert_eq!(s.finer().0.coarser().0, s);
            assert_eq!(s.finer().1, s.finer().0.coarser().1);
        }
    }

    #[test]
    fn labels_are_exact() {
        assert_eq!(step(1, -1).label(3), "0.3");
        assert_eq!(step(2, -1).label(7), "1.4");
        assert_eq!(step(5, -3).label(1), "0.005");
        assert_eq!(step(5, 0).label(4), "20");
        assert_eq!(step(1, 0).label(0), "0");
    }

    #[test]
    fn labels_switch_to_exponent_notation() {
        assert_eq!(step(1, 4).label(9), "90000");
        assert_eq!(step(1, 5).label(1), "1e+5");
        assert_eq!(step(5, 4).label(3), "1.5e+5");
        assert_eq!(step(1, -5).label(1), "0.00001");
        assert_eq!(step(5, -6).label(1), "5e-6");
        assert_eq!(step(5, -7).label(5), "2.5e-6");
    }

    #[test]
    fn zoom_in_crosses_to_finer_step() {
        let mut vp = Viewport::new(800.0, 600.0);
        let center = vp.origin;
        // 110 px of scroll pushes step_px past 200 (factor 2 from a 1-step)
        vp.zoom(-1100.0, center);
        assert_eq!(vp.step, step(5, -1));
        assert_eq!(vp.zoom_factor, 2.0);
        assert!((vp.step_px - 110.0).abs() < 1e-9);
        // Zooming about the origin leaves it in place
        assert_eq!(vp.origin, center);
    }

    #[test]
    fn zoom_out_crosses_to_coarser_step() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom(100.0, vp.origin);
        assert_eq!(vp.step, step(2, 0));
        assert_eq!(vp.zoom_factor, 0.5);
        // 90 px wraps into [100, 200)
        assert!((vp.step_px - 190.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = Viewport::new(800.0, 600.0);
        let anchor = Point::new(600.0, 100.0);
        let before = (anchor - vp.origin) / vp.px_per_unit();
        vp.zoom(-300.0, anchor);
        let after = (anchor - vp.origin) / vp.px_per_unit();
        assert!((before - after).hypot() < 1e-9);
    }

    #[test]
    fn pan_and_center() {
        let mut vp = Viewport::new(200.0, 100.0);
        vp.pan(Vec2::new(30.0, -10.0));
        assert_eq!(vp.origin, Point::new(130.0, 40.0));
        assert_eq!(vp.bounds().left, -130.0);
        vp.center();
        assert_eq!(vp.origin, Point::new(100.0, 50.0));
    }
}
