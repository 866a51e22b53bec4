//! The wheel itself: labels, rotation and the running spin, owned together so
//! that several wheels can exist side by side and be driven without a window.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::angle::index_under_pointer;
use crate::animation::{Animator, SpinObserver};
use crate::config::SpinConfig;
use crate::entries;
use crate::error::{Result, WheelError};
use crate::target::{find_label, plan_spin, MissingForced, SpinPlan};

/// Reported once per completed spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinOutcome {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Wheel<R = StdRng> {
    labels: Vec<String>,
    animator: Animator,
    spin: SpinConfig,
    missing_forced: MissingForced,
    rng: R,
}

impl Wheel<StdRng> {
    pub fn new(labels: Vec<String>) -> Self {
        Self::with_rng(labels, StdRng::from_os_rng())
    }

    pub fn seeded(labels: Vec<String>, seed: u64) -> Self {
        Self::with_rng(labels, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Wheel<R> {
    pub fn with_rng(labels: Vec<String>, rng: R) -> Self {
        Self {
            labels,
            animator: Animator::default(),
            spin: SpinConfig::default(),
            missing_forced: MissingForced::default(),
            rng,
        }
    }

    pub fn with_spin_config(mut self, spin: SpinConfig) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_missing_forced(mut self, policy: MissingForced) -> Self {
        self.missing_forced = policy;
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn segment_count(&self) -> usize {
        self.labels.len()
    }

    pub fn rotation(&self) -> f64 {
        self.animator.rotation()
    }

    pub fn is_spinning(&self) -> bool {
        self.animator.is_spinning()
    }

    pub fn missing_forced(&self) -> MissingForced {
        self.missing_forced
    }

    pub fn set_missing_forced(&mut self, policy: MissingForced) {
        self.missing_forced = policy;
    }

    pub fn spin_config(&self) -> &SpinConfig {
        &self.spin
    }

    /// Index under the pointer at the current rotation, if the wheel has entries.
    pub fn index_under_pointer(&self) -> Option<usize> {
        if self.labels.is_empty() {
            return None;
        }
        Some(index_under_pointer(self.rotation(), self.labels.len()))
    }

    pub fn label_under_pointer(&self) -> Option<&str> {
        self.index_under_pointer()
            .map(|index| self.labels[index].as_str())
    }

    /// Replace the entries. Refused mid-spin so the wedge layout cannot change
    /// under a running animation.
    pub fn set_labels(&mut self, labels: Vec<String>) -> Result<()> {
        self.ensure_idle()?;
        self.labels = labels;
        Ok(())
    }

    pub fn push_label(&mut self, label: impl Into<String>) -> Result<()> {
        self.ensure_idle()?;
        self.labels.push(label.into());
        Ok(())
    }

    pub fn shuffle(&mut self) -> Result<()> {
        self.ensure_idle()?;
        entries::shuffle_entries(&mut self.labels, &mut self.rng);
        Ok(())
    }

    pub fn sort(&mut self) -> Result<()> {
        self.ensure_idle()?;
        entries::sort_entries(&mut self.labels);
        Ok(())
    }

    /// Plan a spin and start animating it from `now`.
    ///
    /// Under [`MissingForced::Append`] an unknown forced label is added to
    /// the wheel first and then wins like any other forced label.
    pub fn spin(&mut self, forced: Option<&str>, now: Instant) -> Result<SpinPlan> {
        self.ensure_idle()?;
        if self.labels.is_empty() || entries::is_placeholder(&self.labels) {
            return Err(WheelError::EmptyWheel);
        }

        let forced = forced.map(str::trim).filter(|f| !f.is_empty());
        if let Some(label) = forced {
            if self.missing_forced == MissingForced::Append
                && find_label(&self.labels, label).is_none()
            {
                tracing::info!("adding forced entry {label:?} to the wheel");
                self.labels.push(label.to_string());
            }
        }

        let current = self.rotation();
        let plan = plan_spin(
            &self.labels,
            forced,
            self.missing_forced,
            current,
            &self.spin,
            &mut self.rng,
        )?;
        self.animator.begin(plan.clone(), self.labels.len(), now)?;
        tracing::info!(
            segments = self.labels.len(),
            duration_ms = plan.duration.as_millis() as u64,
            "spin started"
        );
        Ok(plan)
    }

    /// Advance the running spin to `now`. Returns the outcome on the frame the
    /// spin finishes.
    pub fn advance<O: SpinObserver + ?Sized>(
        &mut self,
        now: Instant,
        observer: &mut O,
    ) -> Option<SpinOutcome> {
        let index = self.animator.tick(now, observer)?;
        let label = self.labels.get(index).cloned().unwrap_or_default();
        tracing::info!(index, label = label.as_str(), "spin result");
        Some(SpinOutcome { index, label })
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_spinning() {
            Err(WheelError::AlreadySpinning)
        } else {
            Ok(())
        }
    }
}
