//! Agent hyper-parameters.

use rq_core::{CoreError, CoreResult};

/// Hyper-parameters of a [`ValueAgent`](crate::ValueAgent).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// Step size of the TD(0) update.  Default: 0.1.
    pub learning_rate: f64,

    /// Weight of the best next-state value.  Default: 0.9.
    pub discount_factor: f64,

    /// Initial exploration probability.  Default: 1.0.
    pub epsilon: f64,

    /// Multiplier applied by [`decay_epsilon`](crate::ValueAgent::decay_epsilon).
    /// Default: 0.995.
    pub epsilon_decay: f64,

    /// Floor for `epsilon` under decay.  Default: 0.01.
    pub epsilon_min: f64,

    /// Replay buffer capacity; the oldest experience is dropped on overflow.
    pub replay_capacity: usize,

    /// Default replay batch size.  Default: 32.
    pub batch_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate:   0.1,
            discount_factor: 0.9,
            epsilon:         1.0,
            epsilon_decay:   0.995,
            epsilon_min:     0.01,
            replay_capacity: 1000,
            batch_size:      32,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let unit = |name: &str, v: f64| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(CoreError::Config(format!("{name} must lie in [0, 1], got {v}")))
            }
        };
        unit("learning_rate", self.learning_rate)?;
        unit("discount_factor", self.discount_factor)?;
        unit("epsilon", self.epsilon)?;
        unit("epsilon_decay", self.epsilon_decay)?;
        unit("epsilon_min", self.epsilon_min)?;
        if self.replay_capacity == 0 {
            return Err(CoreError::Config("replay_capacity must be positive".into()));
        }
        if self.batch_size == 0 || self.batch_size > self.replay_capacity {
            return Err(CoreError::Config(format!(
                "batch_size must lie in 1..={}, got {}",
                self.replay_capacity, self.batch_size
            )));
        }
        Ok(())
    }
}
