//! Planner-owned memo tables.
//!
//! Entries are written once and never invalidated implicitly: a traffic
//! update leaves previously cached distances in place.  Callers that change
//! traffic and want fresh guidance call
//! [`RoutePlanner::clear_caches`](crate::RoutePlanner::clear_caches).

use std::sync::Arc;

use rustc_hash::FxHashMap;

use rq_core::NodeId;
use rq_network::search::{distances_to, hop_distances_to, hop_path};
use rq_network::{GraphView, StreetNetwork};

#[derive(Default, Debug)]
pub struct PlannerCaches {
    /// Fewest-hop path per node pair (`None` = unreachable).
    hop_paths:    FxHashMap<(NodeId, NodeId), Option<Arc<[NodeId]>>>,
    /// Street-pair reachability probe results.
    connectivity: FxHashMap<(String, String), bool>,
    /// Unpenalized distance-to-target fields.
    distances:    FxHashMap<NodeId, Arc<Vec<f64>>>,
    /// Hop-count-to-target fields.
    hop_fields:   FxHashMap<NodeId, Arc<Vec<Option<usize>>>>,
}

/// Entry counts, for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hop_paths:    usize,
    pub connectivity: usize,
    pub distances:    usize,
    pub hop_fields:   usize,
}

impl PlannerCaches {
    pub fn hop_path(&mut self, network: &StreetNetwork, from: NodeId, to: NodeId) -> Option<Arc<[NodeId]>> {
        self.hop_paths
            .entry((from, to))
            .or_insert_with(|| hop_path(network, from, to).map(Arc::from))
            .clone()
    }

    pub fn connectivity(&self, start: &str, end: &str) -> Option<bool> {
        self.connectivity.get(&(start.to_owned(), end.to_owned())).copied()
    }

    pub fn set_connectivity(&mut self, start: &str, end: &str, connected: bool) {
        self.connectivity.insert((start.to_owned(), end.to_owned()), connected);
    }

    /// Distance-to-`target` field seen through `view`.  Penalized views are
    /// computed fresh and never stored.
    pub fn distances(&mut self, view: GraphView<'_>, target: NodeId) -> Arc<Vec<f64>> {
        if view.is_penalized() {
            return Arc::new(distances_to(view, target));
        }
        self.distances
            .entry(target)
            .or_insert_with(|| Arc::new(distances_to(view, target)))
            .clone()
    }

    /// Hop count from every node to `target`.  Penalties never change hop
    /// counts, so every field is stored.
    pub fn hop_field(&mut self, network: &StreetNetwork, target: NodeId) -> Arc<Vec<Option<usize>>> {
        self.hop_fields
            .entry(target)
            .or_insert_with(|| Arc::new(hop_distances_to(network, target)))
            .clone()
    }

    pub fn clear(&mut self) {
        self.hop_paths.clear();
        self.connectivity.clear();
        self.distances.clear();
        self.hop_fields.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hop_paths:    self.hop_paths.len(),
            connectivity: self.connectivity.len(),
            distances:    self.distances.len(),
            hop_fields:   self.hop_fields.len(),
        }
    }
}
