//! Allocator hyper-parameters.

use rq_core::{CoreError, CoreResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AllocatorConfig {
    /// Seed of the allocator's own RNG (table initialization and
    /// exploration).
    pub seed: u64,

    /// Training episodes per call.  Default: 5000.
    pub episodes: usize,

    pub learning_rate:   f64,
    pub discount_factor: f64,

    /// Starting exploration rate, decayed once per episode and carried
    /// across the whole run.
    pub epsilon:       f64,
    pub epsilon_decay: f64,
    pub epsilon_min:   f64,

    /// Residual supply or demand must exceed this to count as active.
    /// Default: 0.1.
    pub active_threshold: f64,

    /// Allocation cells at or below this are dropped.  Default: 1e-6.
    pub min_quantity: f64,

    /// Sources + destinations above which the exponential state space is
    /// reported.  Default: 20.
    pub state_space_warning: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            seed:                0xa110c,
            episodes:            5000,
            learning_rate:       0.1,
            discount_factor:     0.9,
            epsilon:             1.0,
            epsilon_decay:       0.995,
            epsilon_min:         0.01,
            active_threshold:    0.1,
            min_quantity:        1e-6,
            state_space_warning: 20,
        }
    }
}

impl AllocatorConfig {
    pub fn validate(&self) -> CoreResult<()> {
        for (name, v) in [
            ("learning_rate", self.learning_rate),
            ("discount_factor", self.discount_factor),
            ("epsilon", self.epsilon),
            ("epsilon_decay", self.epsilon_decay),
            ("epsilon_min", self.epsilon_min),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CoreError::Config(format!("{name} must lie in [0, 1], got {v}")));
            }
        }
        if self.episodes == 0 {
            return Err(CoreError::Config("episodes must be positive".into()));
        }
        if !(self.active_threshold.is_finite() && self.active_threshold >= 0.0) {
            return Err(CoreError::Config(format!(
                "active_threshold must be non-negative, got {}",
                self.active_threshold
            )));
        }
        if !(self.min_quantity.is_finite() && self.min_quantity >= 0.0) {
            return Err(CoreError::Config(format!(
                "min_quantity must be non-negative, got {}",
                self.min_quantity
            )));
        }
        Ok(())
    }
}
