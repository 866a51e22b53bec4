//! Frame-driven spin animation.
//!
//! The animator is cooperative: the host calls [`Animator::tick`] once per
//! frame with the current instant, and the animator reports back through a
//! [`SpinObserver`]. The spinning flag is the only guard against overlapping
//! spins.

use std::time::Instant;

use crate::angle::index_under_pointer;
use crate::error::{Result, WheelError};
use crate::target::SpinPlan;

/// Cubic ease-out: fast start, zero velocity at `t = 1`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Side channels of a running spin.
pub trait SpinObserver {
    /// Called once per tick with the interpolated rotation.
    fn on_frame(&mut self, _angle: f64) {}

    /// Called when the wedge under the pointer changes (and on the first frame).
    fn on_segment_crossed(&mut self, _index: usize) {}

    /// Called exactly once, when the spin reaches its target.
    fn on_complete(&mut self, _index: usize) {}
}

impl SpinObserver for () {}

#[derive(Debug, Clone)]
struct ActiveSpin {
    plan: SpinPlan,
    segment_count: usize,
    started_at: Instant,
    last_index: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Animator {
    rotation: f64,
    active: Option<ActiveSpin>,
}

impl Animator {
    pub fn new(rotation: f64) -> Self {
        Self {
            rotation,
            active: None,
        }
    }

    /// Current rotation in radians. Accumulates across spins and is never wrapped.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.active.is_some()
    }

    pub fn plan(&self) -> Option<&SpinPlan> {
        self.active.as_ref().map(|spin| &spin.plan)
    }

    /// Start animating `plan`. Rejected while another spin is running.
    pub fn begin(&mut self, plan: SpinPlan, segment_count: usize, now: Instant) -> Result<()> {
        if self.active.is_some() {
            return Err(WheelError::AlreadySpinning);
        }
        if segment_count == 0 {
            return Err(WheelError::EmptyWheel);
        }
        self.rotation = plan.start_angle;
        self.active = Some(ActiveSpin {
            plan,
            segment_count,
            started_at: now,
            last_index: None,
        });
        Ok(())
    }

    /// Fraction of the running spin elapsed at `now`, if spinning.
    pub fn progress(&self, now: Instant) -> Option<f64> {
        self.active.as_ref().map(|spin| elapsed_fraction(spin, now))
    }

    /// Advance to `now`. Returns the index under the pointer when this tick
    /// finished the spin.
    pub fn tick<O: SpinObserver + ?Sized>(&mut self, now: Instant, observer: &mut O) -> Option<usize> {
        let spin = self.active.as_mut()?;

        let t = elapsed_fraction(spin, now);
        let eased = ease_out_cubic(t);
        let angle = if t >= 1.0 {
            spin.plan.target_angle
        } else {
            lerp(spin.plan.start_angle, spin.plan.target_angle, eased)
        };
        self.rotation = angle;
        observer.on_frame(angle);

        let index = index_under_pointer(angle, spin.segment_count);
        if spin.last_index != Some(index) {
            spin.last_index = Some(index);
            observer.on_segment_crossed(index);
        }

        if t < 1.0 {
            return None;
        }

        self.active = None;
        tracing::debug!(index, rotation = angle, "spin finished");
        observer.on_complete(index);
        Some(index)
    }
}

fn elapsed_fraction(spin: &ActiveSpin, now: Instant) -> f64 {
    let duration = spin.plan.duration.as_secs_f64();
    if duration <= 0.0 {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(spin.started_at).as_secs_f64();
    (elapsed / duration).clamp(0.0, 1.0)
}
