//! Per-expression animation state machine.
//!
//! `Paused → Requested` on a user request, `Requested → Running` when a draw
//! pass picks the request up, and `Running → Paused` once the duration has
//! elapsed. Every frame is a full redraw; the state only remembers the two
//! matrices, the duration and when the first frame ran.

use nalgebra::DMatrix;

/// Animation length used when a record doesn't set its own.
pub const DEFAULT_DURATION_MS: f64 = 2000.0;

/// Cubic ease-in-out on `[0, 1]`.
#[must_use]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0f64).mul_add(t, 2.0).powi(3) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Interpolation between two matrices of equal shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub initial: DMatrix<f64>,
    pub target: DMatrix<f64>,
    pub duration_ms: f64,
    started_at: Option<f64>,
}

/// One sampled animation frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// An intermediate frame; more follow.
    Frame(DMatrix<f64>),
    /// The last frame, exactly at the target.
    Finished(DMatrix<f64>),
}

impl Tick {
    #[must_use]
    pub const fn matrix(&self) -> &DMatrix<f64> {
        match self {
            Self::Frame(m) | Self::Finished(m) => m,
        }
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

impl Tween {
    #[must_use]
    pub const fn new(initial: DMatrix<f64>, target: DMatrix<f64>, duration_ms: f64) -> Self {
        Self {
            initial,
            target,
            duration_ms,
            started_at: None,
        }
    }

    /// Sample at host time `now_ms`. The first call fixes the start time.
    pub fn sample(&mut self, now_ms: f64) -> Tick {
        let start = *self.started_at.get_or_insert(now_ms);
        let elapsed = now_ms - start;
        if elapsed >= self.duration_ms {
            return Tick::Finished(self.target.clone());
        }
        let eased = ease_in_out_cubic((elapsed / self.duration_ms).clamp(0.0, 1.0));
        Tick::Frame(&self.initial + (&self.target - &self.initial) * eased)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnimationState {
    #[default]
    Paused,
    Requested,
    Running(Tween),
}

impl AnimationState {
    /// Ask for an animation. Ignored while one is already running; returns
    /// whether the state changed.
    pub fn request(&mut self) -> bool {
        match self {
            Self::Running(_) => false,
            Self::Requested => true,
            Self::Paused => {
                *self = Self::Requested;
                true
            }
        }
    }

    /// Begin running `tween` if a request is pending.
    pub fn start(&mut self, tween: Tween) -> bool {
        if matches!(self, Self::Requested) {
            log::info!("animation started ({} ms)", tween.duration_ms);
            *self = Self::Running(tween);
            true
        } else {
            false
        }
    }

    /// Drop a pending request that cannot be honored.
    pub fn cancel_request(&mut self) {
        if matches!(self, Self::Requested) {
            *self = Self::Paused;
        }
    }

    /// Advance a running animation. Returns `None` unless running; the
    /// finishing tick flips the state back to paused.
    pub fn tick(&mut self, now_ms: f64) -> Option<Tick> {
        let Self::Running(tween) = self else {
            return None;
        };
        let tick = tween.sample(now_ms);
        log::trace!("animation tick at {now_ms} ms");
        if tick.is_finished() {
            log::info!("animation finished");
            *self = Self::Paused;
        }
        Some(tick)
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    #[must_use]
    pub const fn is_requested(&self) -> bool {
        matches!(self, Self::Requested)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
