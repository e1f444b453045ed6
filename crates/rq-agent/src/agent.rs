//! Tabular action-value agent.
//!
//! # Action selection
//!
//! ```text
//! training && u < epsilon  → uniform random action
//! training                 → softmax sample over Q(s, ·)
//! otherwise                → greedy argmax (first maximum in action order)
//! ```
//!
//! Softmax subtracts the maximum value before dividing by the temperature
//! and clips the exponent argument to `[-20, 20]`.  If the weights collapse
//! (zero sum, NaN, or Inf) the agent falls back to a uniform draw or the
//! greedy action; numerical trouble is never surfaced as an error.

use std::hash::Hash;

use rand::distributions::{Distribution, WeightedIndex};
use rustc_hash::FxHashMap;

use rq_core::SeededRng;

use crate::{AgentConfig, AgentError, AgentResult, Experience, ReplayBuffer};

/// Values are clipped to `[-VALUE_CLIP, VALUE_CLIP]` after every update.
pub const VALUE_CLIP: f64 = 1000.0;

const EXPONENT_CLIP: f64 = 20.0;

/// Action-value table over hashable states and actions.  Unseen pairs have
/// value 0.
#[derive(Clone, Debug)]
pub struct ValueAgent<S, A> {
    table:  FxHashMap<S, FxHashMap<A, f64>>,
    replay: ReplayBuffer<S, A>,

    pub learning_rate:   f64,
    pub discount_factor: f64,
    pub epsilon:         f64,
    pub epsilon_decay:   f64,
    pub epsilon_min:     f64,
    pub batch_size:      usize,
}

impl<S, A> ValueAgent<S, A>
where
    S: Hash + Eq + Clone,
    A: Hash + Eq + Clone,
{
    pub fn new(config: &AgentConfig) -> AgentResult<Self> {
        config.validate()?;
        Ok(Self {
            table:           FxHashMap::default(),
            replay:          ReplayBuffer::new(config.replay_capacity),
            learning_rate:   config.learning_rate,
            discount_factor: config.discount_factor,
            epsilon:         config.epsilon,
            epsilon_decay:   config.epsilon_decay,
            epsilon_min:     config.epsilon_min,
            batch_size:      config.batch_size,
        })
    }

    // ── Value table ───────────────────────────────────────────────────────

    #[inline]
    pub fn value(&self, state: &S, action: &A) -> f64 {
        self.table
            .get(state)
            .and_then(|row| row.get(action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of distinct states with at least one stored value.
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    pub fn replay_len(&self) -> usize {
        self.replay.len()
    }

    /// Highest value among `actions` in `state`, or 0 if `actions` is empty.
    pub fn max_value(&self, state: &S, actions: &[A]) -> f64 {
        actions
            .iter()
            .map(|a| self.value(state, a))
            .max_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    // ── Action selection ──────────────────────────────────────────────────

    /// Pick an action from `actions` for `state`.
    ///
    /// Fails only when `actions` is empty.
    pub fn choose_action(
        &self,
        state:       &S,
        actions:     &[A],
        training:    bool,
        temperature: f64,
        rng:         &mut SeededRng,
    ) -> AgentResult<A> {
        if actions.is_empty() {
            return Err(AgentError::NoActions);
        }
        if training && rng.unit() < self.epsilon {
            return Ok(actions[rng.gen_range(0..actions.len())].clone());
        }

        let values: Vec<f64> = actions.iter().map(|a| self.value(state, a)).collect();
        let greedy = argmax(&values);
        if !training {
            return Ok(actions[greedy].clone());
        }
        if !(temperature.is_finite() && temperature > 0.0) {
            return Ok(actions[greedy].clone());
        }

        let max = values[greedy];
        let weights: Vec<f64> = values
            .iter()
            .map(|v| ((v - max) / temperature).clamp(-EXPONENT_CLIP, EXPONENT_CLIP).exp())
            .collect();
        let sum: f64 = weights.iter().sum();
        if sum.is_nan() || weights.iter().any(|w| !w.is_finite()) {
            return Ok(actions[greedy].clone());
        }
        if sum <= 0.0 {
            return Ok(actions[rng.gen_range(0..actions.len())].clone());
        }

        match WeightedIndex::new(&weights) {
            Ok(dist) => Ok(actions[dist.sample(rng.inner())].clone()),
            Err(_) => Ok(actions[greedy].clone()),
        }
    }

    // ── Learning ──────────────────────────────────────────────────────────

    /// One-step TD(0) update:
    ///
    /// ```text
    /// Q(s,a) ← clip(Q(s,a) + lr · (r + γ · max_a' Q(s',a') − Q(s,a)))
    /// ```
    ///
    /// The max term is 0 when `next_actions` is empty.  A NaN result leaves
    /// the table unchanged.
    pub fn update(&mut self, state: &S, action: &A, reward: f64, next_state: &S, next_actions: &[A]) {
        let next_value = self.max_value(next_state, next_actions);
        let current = self.value(state, action);
        let target = reward + self.discount_factor * next_value;
        let updated = (current + self.learning_rate * (target - current)).clamp(-VALUE_CLIP, VALUE_CLIP);
        if updated.is_nan() {
            return;
        }
        self.table
            .entry(state.clone())
            .or_default()
            .insert(action.clone(), updated);
    }

    pub fn store_experience(&mut self, experience: Experience<S, A>) {
        self.replay.push(experience);
    }

    /// Re-apply [`update`](Self::update) to `batch_size` experiences drawn
    /// without replacement.  No-op (returns 0) if the buffer is too small.
    pub fn experience_replay(&mut self, batch_size: usize, rng: &mut SeededRng) -> usize {
        let Some(batch) = self.replay.sample(batch_size, rng) else {
            return 0;
        };
        for e in &batch {
            self.update(&e.state, &e.action, e.reward, &e.next_state, &e.next_actions);
        }
        batch.len()
    }

    // ── Exploration ───────────────────────────────────────────────────────

    /// `epsilon ← max(epsilon_min, epsilon × epsilon_decay)`.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
    }

    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

/// Index of the first maximum under `total_cmp`.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if v.total_cmp(&values[best]).is_gt() {
            best = i;
        }
    }
    best
}
