//! Classical graph searches used as guidance signals.
//!
//! None of these produce a route for the caller; the planner uses them to
//! shape rewards, size episode budgets, and bound the training search space.
//!
//! | Function             | Metric        | Direction             |
//! |----------------------|---------------|-----------------------|
//! | [`hop_path`]         | edge count    | forward               |
//! | [`hop_distances_to`] | edge count    | backward (to target)  |
//! | [`reaches_any`]      | reachability  | forward, multi-source |
//! | [`distances_to`]     | edge length   | backward (to target)  |
//! | [`shortest_distance`]| edge length   | forward, early exit   |

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use rq_core::NodeId;

use crate::{GraphView, StreetNetwork};

// ── Breadth-first searches ────────────────────────────────────────────────────

/// Fewest-edges path `from → to`, inclusive of both endpoints.
///
/// `from == to` yields `[from]`.  Ties are broken by CSR edge order, so the
/// result is deterministic.
pub fn hop_path(network: &StreetNetwork, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
    if from == to {
        return Some(vec![from]);
    }
    let n = network.node_count();
    let mut prev = vec![NodeId::INVALID; n];
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    seen[from.index()] = true;
    queue.push_back(from);

    while let Some(node) = queue.pop_front() {
        for next in network.successors(node) {
            if seen[next.index()] {
                continue;
            }
            seen[next.index()] = true;
            prev[next.index()] = node;
            if next == to {
                let mut path = vec![to];
                let mut cur = to;
                while prev[cur.index()].is_valid() {
                    cur = prev[cur.index()];
                    path.push(cur);
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// Number of edges on the fewest-edges path, if any.
pub fn hop_distance(network: &StreetNetwork, from: NodeId, to: NodeId) -> Option<usize> {
    hop_path(network, from, to).map(|p| p.len() - 1)
}

/// Fewest edges from every node **to** `target`, by BFS over incoming
/// edges.  `None` marks nodes that cannot reach `target`.  Indexed by
/// `NodeId`.
pub fn hop_distances_to(network: &StreetNetwork, target: NodeId) -> Vec<Option<usize>> {
    let mut hops = vec![None; network.node_count()];
    hops[target.index()] = Some(0);
    let mut queue = VecDeque::from([(target, 0usize)]);
    while let Some((node, h)) = queue.pop_front() {
        for prev in network.predecessors(node) {
            if hops[prev.index()].is_none() {
                hops[prev.index()] = Some(h + 1);
                queue.push_back((prev, h + 1));
            }
        }
    }
    hops
}

/// `true` if any node in `targets` is reachable from any node in `sources`.
pub fn reaches_any(network: &StreetNetwork, sources: &[NodeId], targets: &[NodeId]) -> bool {
    let n = network.node_count();
    let mut is_target = vec![false; n];
    for t in targets {
        is_target[t.index()] = true;
    }
    let mut seen = vec![false; n];
    let mut queue = VecDeque::new();
    for &s in sources {
        if is_target[s.index()] {
            return true;
        }
        if !seen[s.index()] {
            seen[s.index()] = true;
            queue.push_back(s);
        }
    }
    while let Some(node) = queue.pop_front() {
        for next in network.successors(node) {
            if is_target[next.index()] {
                return true;
            }
            if !seen[next.index()] {
                seen[next.index()] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Heap entry ordered so `BinaryHeap` pops the smallest cost first; the
/// secondary key makes tie-breaking deterministic.
#[derive(Copy, Clone, PartialEq)]
struct Candidate {
    cost: f64,
    node: NodeId,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest (view-length) distance from every node **to** `target`.
///
/// Runs Dijkstra over incoming edges.  Unreachable nodes get
/// `f64::INFINITY`.  Indexed by `NodeId`.
pub fn distances_to(view: GraphView<'_>, target: NodeId) -> Vec<f64> {
    let network = view.network();
    let mut dist = vec![f64::INFINITY; network.node_count()];
    dist[target.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(Candidate { cost: 0.0, node: target });

    while let Some(Candidate { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }
        for edge in network.in_edges(node) {
            let prev = network.edge_from[edge.index()];
            let next_cost = cost + view.length(edge);
            if next_cost < dist[prev.index()] {
                dist[prev.index()] = next_cost;
                heap.push(Candidate { cost: next_cost, node: prev });
            }
        }
    }
    dist
}

/// Shortest (view-length) distance `from → to`, or `None` if unreachable.
pub fn shortest_distance(view: GraphView<'_>, from: NodeId, to: NodeId) -> Option<f64> {
    if from == to {
        return Some(0.0);
    }
    let network = view.network();
    let mut dist = vec![f64::INFINITY; network.node_count()];
    dist[from.index()] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(Candidate { cost: 0.0, node: from });

    while let Some(Candidate { cost, node }) = heap.pop() {
        if node == to {
            return Some(cost);
        }
        if cost > dist[node.index()] {
            continue;
        }
        for edge in network.out_edges(node) {
            let next = network.edge_to[edge.index()];
            let next_cost = cost + view.length(edge);
            if next_cost < dist[next.index()] {
                dist[next.index()] = next_cost;
                heap.push(Candidate { cost: next_cost, node: next });
            }
        }
    }
    None
}
