//! Multi-stop sequencing.
//!
//! 1. Street distance matrix over `{start} ∪ destinations` (≤ 3 sampled
//!    nodes per street, minimum weighted distance, mirrored).
//! 2. Nearest-neighbour visiting order from the start street.
//! 3. One [`route_between`](RoutePlanner::route_between) per leg; from the
//!    second leg on, a [`PenaltyOverlay`] lengthens edges already driven and
//!    edges of streets already visited, except streets still to be visited.
//! 4. Legs are concatenated; ordered streets missing from the combined
//!    street path are inserted next to their neighbours in the order.

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use rq_core::{EdgeId, NodeId};
use rq_network::search::{hop_distance, shortest_distance};
use rq_network::{GraphView, PenaltyOverlay, StreetNetwork};

use crate::{PlanError, PlanResult, RoutePlanner, RouteResult, StreetRole};

/// Nodes sampled per street for the distance matrix.
pub const MATRIX_SAMPLES: usize = 3;

/// Distance assigned to street pairs with no path.
pub const MISSING_DISTANCE: f64 = 10_000.0;

/// Metres per hop when only an unweighted path is available.
const HOP_METRES: f64 = 100.0;

impl RoutePlanner {
    /// Visit every destination street starting from `start`, in
    /// nearest-neighbour order, returning one combined route.
    ///
    /// Any leg that fails fails the whole request.
    pub fn find_multi_stop_route<S: AsRef<str>>(&mut self, start: &str, destinations: &[S]) -> PlanResult<RouteResult> {
        if destinations.is_empty() {
            return Err(PlanError::EmptyDestinations);
        }
        self.require_street(start, StreetRole::Start)?;
        for d in destinations {
            self.require_street(d.as_ref(), StreetRole::Destination)?;
        }

        let mut streets: Vec<&str> = Vec::with_capacity(destinations.len() + 1);
        streets.push(start);
        streets.extend(destinations.iter().map(AsRef::as_ref));

        let samples: Vec<Vec<NodeId>> = streets
            .iter()
            .map(|s| {
                let nodes: Vec<NodeId> = self
                    .network
                    .streets()
                    .nodes(s)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default();
                self.rng.sample(&nodes, MATRIX_SAMPLES)
            })
            .collect();
        let matrix = distance_matrix(&self.network, &samples);
        let order = nearest_neighbor_order(&matrix);
        let ordered: Vec<&str> = order.iter().map(|&i| streets[i]).collect();
        info!(start, stops = destinations.len(), order = ?ordered, "multi-stop order");

        let mut legs: Vec<RouteResult> = Vec::with_capacity(ordered.len() - 1);
        for k in 0..ordered.len() - 1 {
            let (from, to) = (ordered[k], ordered[k + 1]);
            let leg = if legs.is_empty() {
                self.route_between(from, to, None)?
            } else {
                let pending: FxHashSet<&str> = ordered[k + 1..].iter().copied().collect();
                let overlay = self.leg_overlay(&legs, &pending);
                debug!(leg = k, penalized = overlay.len(), "penalizing earlier legs");
                self.route_between(from, to, Some(&overlay))?
            };
            legs.push(leg);
        }

        let mut route = concatenate(&self.network, legs);
        insert_missing_streets(&mut route.street_path, &ordered);

        let missing: Vec<&str> = ordered
            .iter()
            .copied()
            .filter(|s| !route.street_path.iter().any(|p| p == s))
            .collect();
        let in_order = order_preserved(&route.street_path, &ordered);
        info!(
            distance_m = route.total_distance,
            time_s = route.total_time,
            all_present = missing.is_empty(),
            in_order,
            "multi-stop route assembled"
        );
        Ok(route)
    }

    /// Penalties for the next leg: directly driven edges get
    /// `traversed_penalty`, every edge of a visited street gets
    /// `visited_street_penalty`.  Streets in `pending` are exempt.
    pub(crate) fn leg_overlay(&self, legs: &[RouteResult], pending: &FxHashSet<&str>) -> PenaltyOverlay {
        let network = &self.network;
        let mut overlay = PenaltyOverlay::new();

        let visited: FxHashSet<&str> = legs
            .iter()
            .flat_map(|l| l.street_path.iter().map(String::as_str))
            .filter(|s| !pending.contains(s))
            .collect();
        if !visited.is_empty() {
            for i in 0..network.edge_count() {
                let e = EdgeId(i as u32);
                if visited.contains(network.street_name(e)) {
                    overlay.penalize(e, self.config.visited_street_penalty);
                }
            }
        }

        for seg in legs.iter().flat_map(|l| &l.segments) {
            if pending.contains(seg.street.as_str()) {
                continue;
            }
            if let Some(e) = network.edge_between(seg.from, seg.to) {
                overlay.penalize(e, self.config.traversed_penalty);
            }
        }
        overlay
    }
}

// ── Distance matrix & ordering ────────────────────────────────────────────────

/// Minimum sampled distance from street `a` to street `b`.
fn street_distance(network: &StreetNetwork, a: &[NodeId], b: &[NodeId]) -> f64 {
    let view = GraphView::new(network);
    let mut best = f64::INFINITY;
    for &from in a {
        for &to in b {
            let d = shortest_distance(view, from, to)
                .or_else(|| hop_distance(network, from, to).map(|h| h as f64 * HOP_METRES));
            if let Some(d) = d {
                best = best.min(d);
            }
        }
    }
    if best.is_finite() { best } else { MISSING_DISTANCE }
}

/// Symmetric distance matrix: each `i < j` entry is computed once from
/// street `i` to street `j` and mirrored.
pub fn distance_matrix(network: &StreetNetwork, samples: &[Vec<NodeId>]) -> Vec<Vec<f64>> {
    let n = samples.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).collect();

    #[cfg(feature = "parallel")]
    let distances: Vec<f64> = {
        use rayon::prelude::*;
        pairs
            .par_iter()
            .map(|&(i, j)| street_distance(network, &samples[i], &samples[j]))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let distances: Vec<f64> = pairs
        .iter()
        .map(|&(i, j)| street_distance(network, &samples[i], &samples[j]))
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for (&(i, j), d) in pairs.iter().zip(distances) {
        matrix[i][j] = d;
        matrix[j][i] = d;
    }
    matrix
}

/// Visiting order starting at index 0: repeatedly the closest unvisited
/// index, ties to the lowest index.
pub fn nearest_neighbor_order(matrix: &[Vec<f64>]) -> Vec<usize> {
    let n = matrix.len();
    let mut order = Vec::with_capacity(n);
    let mut done = vec![false; n];
    let mut current = 0;
    order.push(current);
    done[current] = true;
    while order.len() < n {
        let mut next: Option<usize> = None;
        for j in 0..n {
            if done[j] {
                continue;
            }
            if next.is_none_or(|b| matrix[current][j] < matrix[current][b]) {
                next = Some(j);
            }
        }
        let Some(j) = next else { break };
        done[j] = true;
        order.push(j);
        current = j;
    }
    order
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Join legs into one route.  A leg starting where the previous one ended
/// shares that node; any other junction is a gap, logged and joined as is.
fn concatenate(network: &StreetNetwork, legs: Vec<RouteResult>) -> RouteResult {
    let mut path: Vec<NodeId> = Vec::new();
    let mut streets: Vec<String> = Vec::new();
    let mut segments = Vec::new();

    for (k, leg) in legs.into_iter().enumerate() {
        let mut nodes = leg.path.into_iter().peekable();
        match (path.last(), nodes.peek()) {
            (Some(&last), Some(&first)) if last == first => {
                nodes.next();
            }
            (Some(&last), Some(&first)) => {
                warn!(
                    leg = k,
                    previous_end = network.label(last),
                    next_start = network.label(first),
                    "gap between route legs"
                );
            }
            _ => {}
        }
        path.extend(nodes);

        for s in leg.street_path {
            if streets.last() != Some(&s) {
                streets.push(s);
            }
        }
        segments.extend(leg.segments);
    }
    RouteResult::from_segments(path, streets, segments)
}

/// Insert every street of `ordered` absent from `street_path`: after its
/// predecessor in the order if present, else before its successor, else at
/// the end.
pub(crate) fn insert_missing_streets(street_path: &mut Vec<String>, ordered: &[&str]) {
    for (i, &street) in ordered.iter().enumerate() {
        if street_path.iter().any(|s| s == street) {
            continue;
        }
        let path: &[String] = street_path;
        let at = if let Some(p) = i.checked_sub(1).and_then(|j| position(path, ordered[j])) {
            p + 1
        } else if let Some(p) = ordered.get(i + 1).and_then(|next| position(path, next)) {
            p
        } else {
            path.len()
        };
        debug!(street, at, "inserting missing street into street path");
        street_path.insert(at, street.to_owned());
    }
}

fn position(path: &[String], name: &str) -> Option<usize> {
    path.iter().position(|s| s == name)
}

/// `true` if the first occurrences of `ordered` appear in that order.
pub(crate) fn order_preserved(street_path: &[String], ordered: &[&str]) -> bool {
    let mut last = 0;
    for &street in ordered {
        match position(street_path, street) {
            Some(p) if p >= last => last = p,
            _ => return false,
        }
    }
    true
}
