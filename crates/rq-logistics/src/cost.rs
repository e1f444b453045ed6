//! Street-to-street transport costs.

use tracing::debug;

use rq_planner::RoutePlanner;

/// Source of travel-time estimates between two streets.
///
/// The allocator only needs a number per street pair, so tests can price
/// pairs from a table instead of training a planner.
pub trait CostEstimator {
    /// Travel time in seconds from `source` to `destination`, or `None` if
    /// no route could be produced.
    fn route_cost(&mut self, source: &str, destination: &str) -> Option<f64>;
}

impl CostEstimator for RoutePlanner {
    fn route_cost(&mut self, source: &str, destination: &str) -> Option<f64> {
        match self.find_route(source, destination) {
            Ok(route) if route.success => Some(route.total_time),
            Ok(_) => None,
            Err(e) => {
                debug!(source, destination, error = %e, "no route; pricing pair as unreachable");
                None
            }
        }
    }
}

impl<E: CostEstimator + ?Sized> CostEstimator for &mut E {
    fn route_cost(&mut self, source: &str, destination: &str) -> Option<f64> {
        (**self).route_cost(source, destination)
    }
}
