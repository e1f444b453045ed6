//! Bounded FIFO experience buffer.

use std::collections::VecDeque;

use rand::seq::index;

use rq_core::SeededRng;

/// One transition `(s, a, r, s', actions(s'))`.
#[derive(Clone, Debug, PartialEq)]
pub struct Experience<S, A> {
    pub state:        S,
    pub action:       A,
    pub reward:       f64,
    pub next_state:   S,
    /// Actions available in `next_state`; empty for a terminal transition.
    pub next_actions: Vec<A>,
}

/// Capacity-bounded buffer; pushing onto a full buffer drops the oldest entry.
#[derive(Clone, Debug)]
pub struct ReplayBuffer<S, A> {
    buffer:   VecDeque<Experience<S, A>>,
    capacity: usize,
}

impl<S: Clone, A: Clone> ReplayBuffer<S, A> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, experience: Experience<S, A>) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    /// `batch_size` distinct experiences drawn uniformly without
    /// replacement, or `None` if the buffer holds fewer than that.
    pub fn sample(&self, batch_size: usize, rng: &mut SeededRng) -> Option<Vec<Experience<S, A>>> {
        if batch_size == 0 || self.buffer.len() < batch_size {
            return None;
        }
        let picked = index::sample(rng.inner(), self.buffer.len(), batch_size);
        Some(picked.iter().map(|i| self.buffer[i].clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Oldest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Experience<S, A>> + '_ {
        self.buffer.iter()
    }
}
