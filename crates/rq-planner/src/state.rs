//! Agent state key: a coarse fingerprint of a node's neighbourhood.
//!
//! Two nodes with the same degree, bottleneck flag, and outgoing traffic
//! pattern share a key, so values learned at one intersection transfer to
//! structurally similar ones.  Node ids are deliberately absent.

use rq_core::{NodeId, TrafficState};
use rq_network::StreetNetwork;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StateKey {
    /// In-degree + out-degree.
    pub connectivity:     u32,
    /// Mean outgoing traffic ordinal in tenths (`1.25` → `13`).
    pub avg_traffic:      u8,
    pub bottleneck:       bool,
    /// Traffic state of every outgoing edge, sorted.
    pub neighbor_traffic: Vec<TrafficState>,
}

impl StateKey {
    pub fn of(network: &StreetNetwork, node: NodeId) -> Self {
        let mut neighbor_traffic: Vec<TrafficState> =
            network.out_edges(node).map(|e| network.traffic(e)).collect();
        neighbor_traffic.sort_unstable();

        let avg_traffic = if neighbor_traffic.is_empty() {
            0
        } else {
            let sum: u32 = neighbor_traffic.iter().map(|s| s.ordinal() as u32).sum();
            (sum as f64 / neighbor_traffic.len() as f64 * 10.0).round() as u8
        };

        Self {
            connectivity: network.connectivity(node),
            avg_traffic,
            bottleneck: network.is_bottleneck(node),
            neighbor_traffic,
        }
    }
}
