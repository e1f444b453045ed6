//! Unit tests for rq-logistics.

use std::collections::HashMap;

use crate::{
    AllocatorConfig, CostEstimator, LogisticsDestination, LogisticsRequest, Quantity, TransportAllocation,
    TransportOptimizer,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Prices pairs from a table; unlisted pairs fall back to `default`.
/// Counts estimator calls so cache behaviour is observable.
struct TableCosts {
    costs:   HashMap<(String, String), Option<f64>>,
    default: Option<f64>,
    calls:   usize,
}

impl TableCosts {
    fn uniform(cost: f64) -> Self {
        Self { costs: HashMap::new(), default: Some(cost), calls: 0 }
    }

    fn with(mut self, source: &str, dest: &str, cost: Option<f64>) -> Self {
        self.costs.insert((source.to_owned(), dest.to_owned()), cost);
        self
    }
}

impl CostEstimator for TableCosts {
    fn route_cost(&mut self, source: &str, destination: &str) -> Option<f64> {
        self.calls += 1;
        self.costs
            .get(&(source.to_owned(), destination.to_owned()))
            .copied()
            .unwrap_or(self.default)
    }
}

fn optimizer(costs: TableCosts) -> TransportOptimizer<TableCosts> {
    TransportOptimizer::new(costs, AllocatorConfig::default()).unwrap()
}

fn shipped_to(allocs: &[TransportAllocation], dest: &str) -> f64 {
    allocs.iter().filter(|a| a.dest_street == dest).map(|a| a.quantity.as_f64()).sum()
}

fn shipped_from(allocs: &[TransportAllocation], source: &str) -> f64 {
    allocs.iter().filter(|a| a.source_street == source).map(|a| a.quantity.as_f64()).sum()
}

// ── Quantities & validation ───────────────────────────────────────────────────

#[cfg(test)]
mod quantities {
    use super::*;
    use crate::LogisticsError;

    #[test]
    fn integral_amounts_stay_integral() {
        assert_eq!(Quantity::from_f64(3.0), Quantity::Units(3));
        assert_eq!(Quantity::from_f64(2.5), Quantity::Fraction(2.5));
        assert!(!Quantity::from_f64(-1.0).is_integral());
        assert_eq!(Quantity::Units(3).to_string(), "3");
        assert_eq!(Quantity::Fraction(2.5).to_string(), "2.5000");
    }

    #[test]
    fn rejects_invalid_quantities() {
        let mut opt = optimizer(TableCosts::uniform(1.0));
        let err = opt
            .optimize_allocation(&[LogisticsRequest::new("S", -1.0)], &[LogisticsDestination::new("D", 5.0)])
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidQuantity { kind: "capacity", .. }));

        let err = opt
            .optimize_allocation(&[LogisticsRequest::new("S", 1.0)], &[LogisticsDestination::new("D", f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidQuantity { kind: "demand", .. }));
    }

    #[test]
    fn rejects_invalid_config() {
        let config = AllocatorConfig { episodes: 0, ..AllocatorConfig::default() };
        assert!(TransportOptimizer::new(TableCosts::uniform(1.0), config).is_err());
        let config = AllocatorConfig { epsilon_decay: 1.5, ..AllocatorConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_inputs_allocate_nothing() {
        let mut opt = optimizer(TableCosts::uniform(1.0));
        let none: Vec<LogisticsDestination> = Vec::new();
        let allocs = opt.optimize_allocation(&[LogisticsRequest::new("S", 10.0)], &none).unwrap();
        assert!(allocs.is_empty());
    }
}

// ── Costs ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod costs {
    use super::*;

    #[test]
    fn costs_cached_per_pair() {
        let mut opt = optimizer(TableCosts::uniform(7.0).with("S", "X", None));
        assert_eq!(opt.cost("S", "D"), 7.0);
        assert_eq!(opt.cost("S", "D"), 7.0);
        assert_eq!(opt.cost("S", "X"), f64::INFINITY);
        assert_eq!(opt.cost("S", "X"), f64::INFINITY);
        assert_eq!(opt.estimator().calls, 2);
        assert_eq!(opt.cached_costs(), 2);
    }

    #[test]
    fn route_planner_prices_pairs() {
        use rq_network::StreetNetworkBuilder;
        use rq_planner::{PlannerConfig, RoutePlanner};

        let mut b = StreetNetworkBuilder::new();
        b.add_edge("ab", "A", "B", "AB", 100.0, 10.0).unwrap();
        b.add_edge("ac", "A", "C", "AC", 100.0, 10.0).unwrap();
        b.add_edge("bd", "B", "D", "BD", 100.0, 10.0).unwrap();
        b.add_edge("cd", "C", "D", "CD", 100.0, 10.0).unwrap();
        let mut planner = RoutePlanner::new(b.build().unwrap(), PlannerConfig::default()).unwrap();

        let mut opt = TransportOptimizer::new(&mut planner, AllocatorConfig::default()).unwrap();
        let forward = opt.cost("AB", "CD");
        assert!(forward.is_finite() && forward >= 10.0);
        assert_eq!(opt.cost("CD", "AB"), f64::INFINITY);
        assert_eq!(opt.cost("Nowhere", "AB"), f64::INFINITY);
    }
}

// ── Allocation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod allocation {
    use super::*;

    #[test]
    fn excess_demand_scaled_to_supply() {
        let mut opt = optimizer(TableCosts::uniform(10.0));
        let allocs = opt
            .optimize_allocation(
                &[LogisticsRequest::new("Depot", 100.0)],
                &[LogisticsDestination::new("North", 40.0), LogisticsDestination::new("South", 80.0)],
            )
            .unwrap();

        let total: f64 = allocs.iter().map(|a| a.quantity.as_f64()).sum();
        assert!(total <= 100.0001);
        assert!((total - 100.0).abs() < 1e-6);
        assert!((shipped_to(&allocs, "North") - 100.0 / 3.0).abs() < 1e-6);
        assert!((shipped_to(&allocs, "South") - 200.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn ample_supply_meets_every_demand() {
        let mut opt = optimizer(TableCosts::uniform(25.0));
        let allocs = opt
            .optimize_allocation(
                &[LogisticsRequest::new("Depot", 100.0)],
                &[LogisticsDestination::new("North", 30.0), LogisticsDestination::new("South", 40.0)],
            )
            .unwrap();
        assert_eq!(allocs.len(), 2);
        assert_eq!(shipped_to(&allocs, "North"), 30.0);
        assert_eq!(shipped_to(&allocs, "South"), 40.0);
        assert!(allocs.iter().all(|a| a.quantity.is_integral()));
        assert!(shipped_from(&allocs, "Depot") <= 100.0);
    }

    #[test]
    fn prefers_cheap_pairs() {
        let costs = TableCosts::uniform(1000.0)
            .with("S1", "D1", Some(10.0))
            .with("S2", "D2", Some(10.0));
        let mut opt = optimizer(costs);
        let allocs = opt
            .optimize_allocation(
                &[LogisticsRequest::new("S1", 50.0), LogisticsRequest::new("S2", 50.0)],
                &[LogisticsDestination::new("D1", 50.0), LogisticsDestination::new("D2", 50.0)],
            )
            .unwrap();

        let cell = |s: &str, d: &str| TransportAllocation {
            source_street: s.to_owned(),
            dest_street:   d.to_owned(),
            quantity:      Quantity::Units(50),
        };
        assert_eq!(allocs, vec![cell("S1", "D1"), cell("S2", "D2")]);
    }

    #[test]
    fn conservation_with_unreachable_pair() {
        let costs = TableCosts::uniform(30.0).with("S1", "D2", None);
        let mut opt = optimizer(costs);
        let sources = [LogisticsRequest::new("S1", 60.0), LogisticsRequest::new("S2", 15.5)];
        let dests = [LogisticsDestination::new("D1", 20.0), LogisticsDestination::new("D2", 45.0)];
        let allocs = opt.optimize_allocation(&sources, &dests).unwrap();

        for s in &sources {
            assert!(shipped_from(&allocs, &s.source_street) <= s.capacity + 1e-9);
        }
        for d in &dests {
            assert!(shipped_to(&allocs, &d.dest_street) <= d.demand + 1e-9);
        }
        assert!(allocs.iter().all(|a| a.quantity.as_f64() > 1e-6));
    }

    #[test]
    fn same_seed_same_allocation() {
        let run = || {
            let costs = TableCosts::uniform(10.0).with("S2", "D1", Some(40.0));
            optimizer(costs)
                .optimize_allocation(
                    &[LogisticsRequest::new("S1", 30.0), LogisticsRequest::new("S2", 30.0)],
                    &[LogisticsDestination::new("D1", 25.0), LogisticsDestination::new("D2", 25.0)],
                )
                .unwrap()
        };
        assert_eq!(run(), run());
    }
}
