//! Plain data row types written by output backends.

use rq_core::TrafficState;
use rq_logistics::TransportAllocation;
use rq_network::StreetNetwork;
use rq_planner::RouteResult;

/// One traversed edge of a planned route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegmentRow {
    pub route_id:         u32,
    /// Position of the segment within its route, from 0.
    pub seq:              u32,
    /// Source-data label of the segment's start node.
    pub from_node:        String,
    pub to_node:          String,
    pub street:           String,
    pub length_m:         f64,
    pub traffic:          TrafficState,
    pub estimated_time_s: f64,
}

impl RouteSegmentRow {
    /// Rows for every segment of `route`, labelled through `network`.
    pub fn from_route(route_id: u32, route: &RouteResult, network: &StreetNetwork) -> Vec<Self> {
        route
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| RouteSegmentRow {
                route_id,
                seq:              i as u32,
                from_node:        network.label(s.from).to_owned(),
                to_node:          network.label(s.to).to_owned(),
                street:           s.street.clone(),
                length_m:         s.length,
                traffic:          s.traffic,
                estimated_time_s: s.estimated_time,
            })
            .collect()
    }
}

/// One non-empty cell of an allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRow {
    pub source_street: String,
    pub dest_street:   String,
    pub quantity:      f64,
    /// Whether the quantity is a whole number of units.
    pub integral:      bool,
}

impl From<&TransportAllocation> for AllocationRow {
    fn from(a: &TransportAllocation) -> Self {
        Self {
            source_street: a.source_street.clone(),
            dest_street:   a.dest_street.clone(),
            quantity:      a.quantity.as_f64(),
            integral:      a.quantity.is_integral(),
        }
    }
}
