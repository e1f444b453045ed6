//! Edge-length overrides layered over a shared network.
//!
//! Multi-stop planning discourages reusing segments it has already driven.
//! Instead of copying and mutating the graph, the penalties live in a
//! [`PenaltyOverlay`] and traversal code reads lengths through a
//! [`GraphView`].  The network itself is borrowed immutably, so a penalty
//! can never leak into later queries.

use rustc_hash::FxHashMap;

use rq_core::{EdgeId, NodeId};

use crate::StreetNetwork;

/// Per-edge multiplicative length penalties.
#[derive(Clone, Debug, Default)]
pub struct PenaltyOverlay {
    factors: FxHashMap<EdgeId, f64>,
}

impl PenaltyOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Penalize `edge` by `factor`.  Penalties do not compound: an edge hit
    /// twice keeps the larger factor.
    pub fn penalize(&mut self, edge: EdgeId, factor: f64) {
        let slot = self.factors.entry(edge).or_insert(1.0);
        if factor > *slot {
            *slot = factor;
        }
    }

    /// Factor for `edge` (1.0 when not penalized).
    #[inline]
    pub fn factor(&self, edge: EdgeId) -> f64 {
        self.factors.get(&edge).copied().unwrap_or(1.0)
    }
}

/// Read-only view of a network with an optional penalty overlay.
#[derive(Clone, Copy)]
pub struct GraphView<'a> {
    network: &'a StreetNetwork,
    overlay: Option<&'a PenaltyOverlay>,
}

impl<'a> GraphView<'a> {
    pub fn new(network: &'a StreetNetwork) -> Self {
        Self { network, overlay: None }
    }

    pub fn with_overlay(network: &'a StreetNetwork, overlay: Option<&'a PenaltyOverlay>) -> Self {
        Self { network, overlay }
    }

    #[inline]
    pub fn network(&self) -> &'a StreetNetwork {
        self.network
    }

    pub fn is_penalized(&self) -> bool {
        self.overlay.is_some_and(|o| !o.is_empty())
    }

    /// Length seen by searches and rewards (physical length × penalty).
    #[inline]
    pub fn length(&self, edge: EdgeId) -> f64 {
        let base = self.network.edge_length[edge.index()];
        match self.overlay {
            Some(o) => base * o.factor(edge),
            None => base,
        }
    }

    /// Travel time seen by rewards, using the penalized length.
    #[inline]
    pub fn travel_time(&self, edge: EdgeId) -> f64 {
        let i = edge.index();
        self.length(edge) / self.network.edge_speed[i] * self.network.edge_traffic[i].time_multiplier()
    }

    /// Penalized travel time of `from → to`, if the edge exists.
    pub fn step_time(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.network.edge_between(from, to).map(|e| self.travel_time(e))
    }
}
