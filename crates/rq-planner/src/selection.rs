//! Candidate node selection and episode budgeting.

use rq_core::{NodeId, SeededRng};
use rq_network::StreetNetwork;
use rq_network::search::hop_distance;

use crate::TrainingConfig;

/// Streets with more nodes than this are reduced before pairing.
pub const LARGE_STREET: usize = 5;

/// Graph size above which episode budgets shrink proportionally.
const REFERENCE_GRAPH_SIZE: f64 = 50_000.0;

/// Path length (nodes) above which episode budgets shrink proportionally.
const REFERENCE_PATH_LENGTH: f64 = 100.0;

const MIN_EPISODE_FLOOR: usize = 100;
const EPISODE_SPREAD: usize = 500;

// ── Node reduction ────────────────────────────────────────────────────────────

/// Score used to rank a street's nodes: connectivity, doubled for
/// non-bottlenecks.
pub fn node_score(network: &StreetNetwork, node: NodeId) -> u32 {
    let factor = if network.is_bottleneck(node) { 1 } else { 2 };
    network.connectivity(node) * factor
}

/// The best [`LARGE_STREET`] nodes by [`node_score`] plus, when more were
/// offered, one random extra for diversity.
///
/// `nodes` should be in ascending id order; ties keep that order.
pub fn promising_nodes(network: &StreetNetwork, nodes: &[NodeId], rng: &mut SeededRng) -> Vec<NodeId> {
    let mut ranked = nodes.to_vec();
    ranked.sort_by_key(|&n| std::cmp::Reverse(node_score(network, n)));
    if ranked.len() <= LARGE_STREET {
        return ranked;
    }
    let extra = rng.choose(&ranked[LARGE_STREET..]).copied();
    ranked.truncate(LARGE_STREET);
    ranked.extend(extra);
    ranked
}

// ── Episode budget ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EpisodeBudget {
    pub min: usize,
    pub max: usize,
}

impl EpisodeBudget {
    /// Scale the configured budget down for large graphs and long paths.
    ///
    /// ```text
    /// factor = min(1, 50000 / |V|) × min(1, 100 / path_nodes)
    /// min'   = max(100, ⌊min × factor⌋)
    /// max'   = max(min' + 500, ⌊max × factor⌋)
    /// ```
    pub fn scaled(config: &TrainingConfig, node_count: usize, sample_path_nodes: Option<usize>) -> Self {
        let size_factor = (REFERENCE_GRAPH_SIZE / node_count.max(1) as f64).min(1.0);
        let path_factor = sample_path_nodes
            .map_or(1.0, |len| (REFERENCE_PATH_LENGTH / len.max(1) as f64).min(1.0));
        let factor = size_factor * path_factor;

        let min = ((config.min_episodes as f64 * factor) as usize).max(MIN_EPISODE_FLOOR);
        let max = ((config.max_episodes as f64 * factor) as usize).max(min + EPISODE_SPREAD);
        Self { min, max }
    }

    pub fn halved(self) -> Self {
        Self { min: (self.min / 2).max(1), max: (self.max / 2).max(1) }
    }

    /// Episodes actually run for a pair whose hop path has `path_nodes`
    /// nodes: `min(max, max(min, path_nodes × 20))`.
    pub fn episodes_for(self, path_nodes: usize) -> usize {
        self.max.min(self.min.max(path_nodes.saturating_mul(20)))
    }
}

// ── Candidate pairs ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CandidatePair {
    pub start:    NodeId,
    pub end:      NodeId,
    pub priority: f64,
}

/// Every `(start, end)` pair with `start != end`, ranked by
///
/// ```text
/// (connectivity(start) + connectivity(end)) / (hops + 1)
/// ```
///
/// or the bare connectivity sum when `end` is unreachable.  Returns at most
/// `limit` pairs, highest priority first; ties keep generation order.
pub fn candidate_pairs(
    network: &StreetNetwork,
    starts:  &[NodeId],
    ends:    &[NodeId],
    limit:   usize,
) -> Vec<CandidatePair> {
    let mut pairs = Vec::with_capacity(starts.len() * ends.len());
    for &start in starts {
        for &end in ends {
            if start == end {
                continue;
            }
            let conn = (network.connectivity(start) + network.connectivity(end)) as f64;
            let priority = match hop_distance(network, start, end) {
                Some(hops) => conn / (hops as f64 + 1.0),
                None => conn,
            };
            pairs.push(CandidatePair { start, end, priority });
        }
    }
    pairs.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    pairs.truncate(limit);
    pairs
}
