//! Target resolution: which wedge wins, and how far the wheel has to turn.
//!
//! The winner is chosen first (forced label or a uniform draw), then solved
//! into an absolute rotation so that the winner's wedge centre, nudged by a
//! small jitter, lands on the pointer after a few extra full turns.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::Rng;

use crate::angle::{wedge_angle, wedge_center, wrap_angle};
use crate::config::SpinConfig;
use crate::error::{Result, WheelError};

/// What to do when a forced label is not on the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingForced {
    /// Refuse the spin with [`WheelError::ForcedNotFound`].
    #[default]
    Reject,
    /// Append the label to the wheel and let it win. Applied by
    /// [`crate::Wheel`], which owns the label list; the resolver itself
    /// treats it like `Reject`.
    Append,
    /// Ignore the request and pick uniformly.
    Random,
}

impl std::str::FromStr for MissingForced {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "append" | "add" => Ok(Self::Append),
            "random" | "ignore" => Ok(Self::Random),
            other => Err(format!("unknown missing-forced policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub winning_index: usize,
    pub target_angle: f64,
}

/// Everything the animator needs for one spin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinPlan {
    pub winning_index: usize,
    pub start_angle: f64,
    pub target_angle: f64,
    pub duration: Duration,
}

/// Position of the first label equal to `needle`, ignoring case and
/// surrounding whitespace.
pub fn find_label<S: AsRef<str>>(labels: &[S], needle: &str) -> Option<usize> {
    let needle = needle.trim().to_lowercase();
    labels
        .iter()
        .position(|label| label.as_ref().trim().to_lowercase() == needle)
}

/// Uniform index in `[0, segment_count)`, `floor(u * n)` for one draw `u`.
pub fn pick_uniform<R: Rng + ?Sized>(segment_count: usize, rng: &mut R) -> usize {
    let u: f64 = rng.random();
    ((u * segment_count as f64).floor() as usize).min(segment_count.saturating_sub(1))
}

/// Absolute rotation that parks wedge `index` under the pointer.
///
/// Draws the jitter and then the revolution count from `rng`.
pub fn target_angle_for<R: Rng + ?Sized>(
    index: usize,
    segment_count: usize,
    current_angle: f64,
    spin: &SpinConfig,
    rng: &mut R,
) -> f64 {
    let theta = wedge_angle(segment_count);
    let jitter_fraction = spin.jitter_fraction.clamp(0.0, 0.999);
    let u: f64 = rng.random();
    let jitter = (u - 0.5) * jitter_fraction * theta;
    let landing = wedge_center(index, segment_count) + jitter;

    let (lo, hi) = ordered(spin.revolutions.0, spin.revolutions.1);
    let span = (hi - lo) as f64 + 1.0;
    let u: f64 = rng.random();
    let revolutions = (lo + (u * span).floor() as u32).min(hi);

    // (target + landing) ≡ 0 (mod 2π)
    let mut delta = wrap_angle(-(current_angle + landing)) + revolutions as f64 * TAU;
    if delta <= 0.0 {
        delta += TAU;
    }
    current_angle + delta
}

/// Pick the winner and solve its rotation.
///
/// With a non-blank `forced` label the first case-insensitive match wins; a
/// missing label is handled per `policy`. Without one the winner is the first
/// uniform draw from `rng`.
pub fn resolve_target<S: AsRef<str>, R: Rng + ?Sized>(
    labels: &[S],
    forced: Option<&str>,
    policy: MissingForced,
    current_angle: f64,
    spin: &SpinConfig,
    rng: &mut R,
) -> Result<Target> {
    if labels.is_empty() {
        return Err(WheelError::EmptyWheel);
    }
    let segment_count = labels.len();

    let forced = forced.map(str::trim).filter(|f| !f.is_empty());
    let winning_index = match forced {
        Some(label) => match find_label(labels, label) {
            Some(index) => index,
            None => match policy {
                MissingForced::Random => {
                    tracing::warn!("forced entry {label:?} not found, picking at random");
                    pick_uniform(segment_count, rng)
                }
                MissingForced::Reject | MissingForced::Append => {
                    return Err(WheelError::ForcedNotFound(label.to_string()));
                }
            },
        },
        None => pick_uniform(segment_count, rng),
    };

    let target_angle = target_angle_for(winning_index, segment_count, current_angle, spin, rng);
    tracing::debug!(
        winning_index,
        segment_count,
        current_angle,
        target_angle,
        "resolved spin target"
    );

    Ok(Target {
        winning_index,
        target_angle,
    })
}

/// Resolve a target and draw the animation length.
pub fn plan_spin<S: AsRef<str>, R: Rng + ?Sized>(
    labels: &[S],
    forced: Option<&str>,
    policy: MissingForced,
    current_angle: f64,
    spin: &SpinConfig,
    rng: &mut R,
) -> Result<SpinPlan> {
    let target = resolve_target(labels, forced, policy, current_angle, spin, rng)?;
    let (lo, hi) = ordered(spin.duration_ms.0.max(0.0), spin.duration_ms.1.max(0.0));
    let u: f64 = rng.random();
    let duration_ms = lo + (hi - lo) * u;

    Ok(SpinPlan {
        winning_index: target.winning_index,
        start_angle: current_angle,
        target_angle: target.target_angle,
        duration: Duration::from_micros((duration_ms * 1000.0).round() as u64),
    })
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
