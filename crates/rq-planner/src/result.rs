//! Route result types and their assembly from node paths.

use std::ops::Index;

use rq_core::{NodeId, TrafficState};
use rq_network::StreetNetwork;

/// One traversed edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSegment {
    pub from:           NodeId,
    pub to:             NodeId,
    pub street:         String,
    /// Metres.
    pub length:         f64,
    pub traffic:        TrafficState,
    /// Seconds: `length / speed × (1 + 0.25 × ordinal)`.
    pub estimated_time: f64,
}

/// Percentage of route distance driven in each traffic state, indexed by
/// [`TrafficState::ordinal`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficDistribution(pub [f64; 4]);

impl TrafficDistribution {
    /// Distance-weighted distribution of `segments`; all zero when the total
    /// distance is zero.
    pub fn from_segments(segments: &[RouteSegment]) -> Self {
        let mut metres = [0.0; 4];
        for s in segments {
            metres[s.traffic.ordinal() as usize] += s.length;
        }
        let total: f64 = metres.iter().sum();
        if total <= 0.0 {
            return Self::default();
        }
        Self(metres.map(|m| m / total * 100.0))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrafficState, f64)> + '_ {
        TrafficState::ALL.iter().map(|&s| (s, self.0[s.ordinal() as usize]))
    }
}

impl Index<TrafficState> for TrafficDistribution {
    type Output = f64;

    fn index(&self, state: TrafficState) -> &f64 {
        &self.0[state.ordinal() as usize]
    }
}

/// Outcome of a routing query.
///
/// A successful result always satisfies `total_time == Σ estimated_time` and
/// `total_distance == Σ length` over `segments`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    pub path:                 Vec<NodeId>,
    /// Street names along the route with consecutive repeats collapsed.
    pub street_path:          Vec<String>,
    pub total_distance:       f64,
    pub total_time:           f64,
    pub success:              bool,
    pub traffic_distribution: TrafficDistribution,
    pub segments:             Vec<RouteSegment>,
}

impl RouteResult {
    /// Failed result carrying `path` with every aggregate zeroed.
    pub fn failed(path: Vec<NodeId>) -> Self {
        Self {
            path,
            street_path:          Vec::new(),
            total_distance:       0.0,
            total_time:           0.0,
            success:              false,
            traffic_distribution: TrafficDistribution::default(),
            segments:             Vec::new(),
        }
    }

    /// Assemble a result from a node path using the network's physical edge
    /// lengths and current traffic.
    ///
    /// Paths with fewer than two nodes, or with a step that is not an edge,
    /// yield [`failed`](Self::failed).
    pub fn from_path(network: &StreetNetwork, path: &[NodeId]) -> Self {
        if path.len() <= 1 {
            return Self::failed(path.to_vec());
        }
        let mut segments = Vec::with_capacity(path.len() - 1);
        for w in path.windows(2) {
            let Some(edge) = network.edge_between(w[0], w[1]) else {
                return Self::failed(path.to_vec());
            };
            segments.push(RouteSegment {
                from:           w[0],
                to:             w[1],
                street:         network.street_name(edge).to_owned(),
                length:         network.edge_length[edge.index()],
                traffic:        network.traffic(edge),
                estimated_time: network.travel_time(edge),
            });
        }
        let street_path = collapse_streets(&segments);
        Self::from_segments(path.to_vec(), street_path, segments)
    }

    /// Successful result with aggregates recomputed from `segments`.
    pub fn from_segments(path: Vec<NodeId>, street_path: Vec<String>, segments: Vec<RouteSegment>) -> Self {
        let total_distance = segments.iter().map(|s| s.length).sum();
        let total_time = segments.iter().map(|s| s.estimated_time).sum();
        let traffic_distribution = TrafficDistribution::from_segments(&segments);
        Self {
            path,
            street_path,
            total_distance,
            total_time,
            success: true,
            traffic_distribution,
            segments,
        }
    }

    /// Node labels of the path as they appear in the source data.
    pub fn labels<'a>(&self, network: &'a StreetNetwork) -> Vec<&'a str> {
        self.path.iter().map(|&n| network.label(n)).collect()
    }

    /// Append `street` unless it is already the last entry.
    pub(crate) fn push_street(&mut self, street: &str) {
        if self.street_path.last().map(String::as_str) != Some(street) {
            self.street_path.push(street.to_owned());
        }
    }
}

fn collapse_streets(segments: &[RouteSegment]) -> Vec<String> {
    let mut streets: Vec<String> = Vec::new();
    for s in segments {
        if streets.last() != Some(&s.street) {
            streets.push(s.street.clone());
        }
    }
    streets
}
