//! Planner configuration.
//!
//! Every constant of the routing heuristics lives here with its default so a
//! deployment can retune budgets without touching code.  Loaded from JSON by
//! the application crate when the `serde` feature is on.

use rq_agent::AgentConfig;
use rq_core::{CoreError, CoreResult};

/// Episode budgets and early-stopping policy for per-pair training.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainingConfig {
    /// Lower episode budget before graph-size scaling.  Default: 1000.
    pub min_episodes: usize,

    /// Upper episode budget before graph-size scaling.  Default: 3000.
    pub max_episodes: usize,

    /// Success rate that ends training once `min_episodes` have run.
    pub success_threshold: f64,

    /// Exploration rate set on the agent for the duration of one pair's
    /// training; the previous rate is restored afterwards.  Default: 0.9.
    pub training_epsilon: f64,

    /// Softmax temperature for policy moves.  Default: 1.0.
    pub temperature: f64,

    /// Candidate (start, end) node pairs tried per query.  Default: 9.
    pub max_candidate_pairs: usize,

    /// Seconds between progress reports inside one training run.
    pub report_interval_secs: u64,

    /// Wall-clock soft stop: abandon a run older than this many seconds if
    /// it has also stagnated for `soft_stop_stagnation` episodes.
    pub soft_stop_secs: u64,

    pub soft_stop_stagnation: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            min_episodes:         1000,
            max_episodes:         3000,
            success_threshold:    0.7,
            training_epsilon:     0.9,
            temperature:          1.0,
            max_candidate_pairs:  9,
            report_interval_secs: 30,
            soft_stop_secs:       300,
            soft_stop_stagnation: 200,
        }
    }
}

/// Top-level planner configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Master RNG seed.  The same seed, graph, and config always produce
    /// identical routes.
    pub seed: u64,

    pub agent: AgentConfig,

    pub training: TrainingConfig,

    /// Length multiplier for edges already driven by earlier multi-stop
    /// segments.  Default: 5.0.
    pub traversed_penalty: f64,

    /// Length multiplier for every edge of an already visited street.
    /// Default: 2.0.
    pub visited_street_penalty: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed:                   0x5eed,
            agent:                  AgentConfig::default(),
            training:               TrainingConfig::default(),
            traversed_penalty:      5.0,
            visited_street_penalty: 2.0,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> CoreResult<()> {
        self.agent.validate()?;
        let t = &self.training;
        if t.min_episodes == 0 || t.min_episodes > t.max_episodes {
            return Err(CoreError::Config(format!(
                "episode budget must satisfy 0 < min <= max, got {}..{}",
                t.min_episodes, t.max_episodes
            )));
        }
        if !(0.0..=1.0).contains(&t.success_threshold) {
            return Err(CoreError::Config(format!(
                "success_threshold must lie in [0, 1], got {}",
                t.success_threshold
            )));
        }
        if !(0.0..=1.0).contains(&t.training_epsilon) {
            return Err(CoreError::Config(format!(
                "training_epsilon must lie in [0, 1], got {}",
                t.training_epsilon
            )));
        }
        if !(t.temperature.is_finite() && t.temperature > 0.0) {
            return Err(CoreError::Config(format!("temperature must be positive, got {}", t.temperature)));
        }
        if t.max_candidate_pairs == 0 {
            return Err(CoreError::Config("max_candidate_pairs must be positive".into()));
        }
        for (name, v) in [
            ("traversed_penalty", self.traversed_penalty),
            ("visited_street_penalty", self.visited_street_penalty),
        ] {
            if !(v.is_finite() && v >= 1.0) {
                return Err(CoreError::Config(format!("{name} must be >= 1, got {v}")));
            }
        }
        Ok(())
    }
}
