//! Unit tests for rq-planner.
//!
//! Fixtures use 100 m segments at 10 m/s, so every free-flow edge costs
//! 10 s, except where a test builds a longer edge to tempt the planner.

use rq_core::NodeId;
use rq_network::{StreetNetwork, StreetNetworkBuilder};

use crate::{PlanError, PlannerConfig, RoutePlanner, RouteResult, StreetRole};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Diamond: A→B, A→C, B→D, C→D on streets AB, AC, BD, CD.
fn diamond() -> StreetNetwork {
    let mut b = StreetNetworkBuilder::new();
    b.add_edge("ab", "A", "B", "AB", 100.0, 10.0).unwrap();
    b.add_edge("ac", "A", "C", "AC", 100.0, 10.0).unwrap();
    b.add_edge("bd", "B", "D", "BD", 100.0, 10.0).unwrap();
    b.add_edge("cd", "C", "D", "CD", 100.0, 10.0).unwrap();
    b.build().unwrap()
}

/// 3×3 two-way grid: horizontal streets `Row0..Row2`, vertical `Col0..Col2`.
fn grid() -> StreetNetwork {
    let mut b = StreetNetworkBuilder::new();
    for r in 0..3 {
        for c in 0..2 {
            let id = format!("h{r}{c}");
            let (a, z) = (format!("r{r}c{c}"), format!("r{r}c{}", c + 1));
            b.add_two_way(&id, &a, &z, &format!("Row{r}"), 100.0, 10.0).unwrap();
        }
    }
    for c in 0..3 {
        for r in 0..2 {
            let id = format!("v{r}{c}");
            let (a, z) = (format!("r{r}c{c}"), format!("r{}c{c}", r + 1));
            b.add_two_way(&id, &a, &z, &format!("Col{c}"), 100.0, 10.0).unwrap();
        }
    }
    b.build().unwrap()
}

fn planner(network: StreetNetwork) -> RoutePlanner {
    RoutePlanner::new(network, PlannerConfig::default()).unwrap()
}

fn node(net: &StreetNetwork, label: &str) -> NodeId {
    net.node_by_label(label).unwrap()
}

/// Aggregates must agree with the segments they summarize.
fn assert_consistent(route: &RouteResult) {
    let length: f64 = route.segments.iter().map(|s| s.length).sum();
    let time: f64 = route.segments.iter().map(|s| s.estimated_time).sum();
    assert!((route.total_distance - length).abs() < 1e-9);
    assert!((route.total_time - time).abs() < 1e-9);
    assert!((route.traffic_distribution.total() - 100.0).abs() < 1e-6);
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;
    use crate::TrainingConfig;

    #[test]
    fn default_is_valid() {
        PlannerConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_values() {
        let c = PlannerConfig { traversed_penalty: 0.5, ..PlannerConfig::default() };
        assert!(c.validate().is_err());

        let training = TrainingConfig { min_episodes: 10, max_episodes: 5, ..TrainingConfig::default() };
        let c = PlannerConfig { training, ..PlannerConfig::default() };
        assert!(c.validate().is_err());

        let training = TrainingConfig { temperature: 0.0, ..TrainingConfig::default() };
        let c = PlannerConfig { training, ..PlannerConfig::default() };
        assert!(RoutePlanner::new(diamond(), c).is_err());
    }
}

// ── Heuristics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod heuristics {
    use super::*;
    use crate::connectivity::frontiers_meet;
    use crate::selection::{EpisodeBudget, candidate_pairs};
    use crate::training::waypoints;
    use crate::{StateKey, TrainingConfig};

    #[test]
    fn budget_scales_with_graph_and_path() {
        let t = TrainingConfig::default();
        assert_eq!(EpisodeBudget::scaled(&t, 4, Some(2)), EpisodeBudget { min: 1000, max: 3000 });
        assert_eq!(EpisodeBudget::scaled(&t, 100_000, None), EpisodeBudget { min: 500, max: 1500 });
        assert_eq!(EpisodeBudget::scaled(&t, 100_000, Some(200)), EpisodeBudget { min: 250, max: 750 });
        // Floor and spread.
        assert_eq!(EpisodeBudget::scaled(&t, 10_000_000, None), EpisodeBudget { min: 100, max: 600 });
    }

    #[test]
    fn budget_halving_and_episodes() {
        let b = EpisodeBudget { min: 1000, max: 3000 };
        assert_eq!(b.halved(), EpisodeBudget { min: 500, max: 1500 });
        assert_eq!(b.episodes_for(2), 1000);
        assert_eq!(b.episodes_for(100), 2000);
        assert_eq!(b.episodes_for(1000), 3000);
    }

    #[test]
    fn candidate_pairs_ranked() {
        let net = diamond();
        let (a, b, c, d) = (node(&net, "A"), node(&net, "B"), node(&net, "C"), node(&net, "D"));
        let pairs = candidate_pairs(&net, &[a, b], &[c, d], 9);
        let order: Vec<_> = pairs.iter().map(|p| (p.start, p.end)).collect();
        // B cannot reach C, so its pair keeps the bare connectivity sum.
        assert_eq!(order, vec![(b, c), (a, c), (b, d), (a, d)]);
        assert_eq!(pairs[0].priority, 4.0);
        assert_eq!(pairs[1].priority, 2.0);

        assert_eq!(candidate_pairs(&net, &[a, b], &[c, d], 2).len(), 2);
        assert!(candidate_pairs(&net, &[a], &[a], 9).is_empty());
    }

    #[test]
    fn frontier_expansion() {
        let net = diamond();
        let (a, b, c, d) = (node(&net, "A"), node(&net, "B"), node(&net, "C"), node(&net, "D"));
        assert!(frontiers_meet(&net, &[a], &[d], 10));
        assert!(frontiers_meet(&net, &[b, c], &[c], 0));
        assert!(!frontiers_meet(&net, &[d], &[a], 10));
        assert!(!frontiers_meet(&net, &[b], &[c], 10));
    }

    #[test]
    fn short_paths_need_no_waypoints() {
        let path: Vec<NodeId> = (0..10).map(NodeId).collect();
        assert_eq!(waypoints(&path, NodeId(9)), vec![NodeId(9)]);
    }

    #[test]
    fn long_paths_split_into_fifths() {
        let path: Vec<NodeId> = (0..60).map(NodeId).collect();
        let expected: Vec<NodeId> = [12, 24, 36, 48, 59].into_iter().map(NodeId).collect();
        assert_eq!(waypoints(&path, NodeId(59)), expected);
    }

    #[test]
    fn state_keys_ignore_identity() {
        let net = diamond();
        let b = StateKey::of(&net, node(&net, "B"));
        let c = StateKey::of(&net, node(&net, "C"));
        assert_eq!(b, c);
        let a = StateKey::of(&net, node(&net, "A"));
        assert_eq!(a.connectivity, 2);
        assert_eq!(a.neighbor_traffic.len(), 2);
        assert_ne!(a, b);
    }
}

// ── Single-pair routing ───────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use super::*;

    #[test]
    fn diamond_route() {
        let mut p = planner(diamond());
        let route = p.find_route("AB", "CD").unwrap();
        assert!(route.success);
        // C lies on CD, so the one-edge hop A→C already reaches the street.
        assert_eq!(route.labels(p.network()), vec!["A", "C"]);
        assert_eq!(route.street_path, vec!["AC".to_owned(), "CD".to_owned()]);
        assert_eq!(route.total_distance, 100.0);
        assert_eq!(route.total_time, 10.0);
        assert_consistent(&route);
    }

    #[test]
    fn short_edges_beat_a_long_direct_edge() {
        let mut b = StreetNetworkBuilder::new();
        b.add_edge("s", "X", "A", "Start", 100.0, 10.0).unwrap();
        b.add_edge("d", "A", "D", "Direct", 5000.0, 10.0).unwrap();
        b.add_edge("d1", "A", "B", "Detour1", 100.0, 10.0).unwrap();
        b.add_edge("d2", "B", "D", "Detour2", 100.0, 10.0).unwrap();
        b.add_edge("f", "D", "Y", "Finish", 100.0, 10.0).unwrap();
        let mut p = planner(b.build().unwrap());

        let route = p.find_route("Start", "Finish").unwrap();
        assert!(route.success);
        assert!(route.total_distance < 1000.0, "took {:?}", route.street_path);
        assert!(route.labels(p.network()).contains(&"B"));
        assert!(!route.street_path.iter().any(|s| s == "Direct"));
        assert_eq!(route.street_path.last().map(String::as_str), Some("Finish"));
        assert_consistent(&route);
    }

    #[test]
    fn training_restores_exploration_rate() {
        let mut p = planner(grid());
        let before = p.agent().epsilon;
        assert_ne!(before, p.config().training.training_epsilon);
        p.find_route("Row0", "Row2").unwrap();
        assert_eq!(p.agent().epsilon, before);
        assert!(p.agent().state_count() > 0);
    }

    #[test]
    fn same_street_returns_first_segment() {
        let mut p = planner(diamond());
        let route = p.find_route("AB", "AB").unwrap();
        assert!(route.success);
        assert_eq!(route.labels(p.network()), vec!["A", "B"]);
        assert_eq!(route.street_path, vec!["AB".to_owned()]);
        assert_eq!(route.total_distance, 100.0);
        assert_eq!(route.total_time, 10.0);
    }

    #[test]
    fn missing_streets_are_named() {
        let mut p = planner(diamond());
        let err = p.find_route("X", "Y").unwrap_err();
        assert!(matches!(err, PlanError::StreetNotFound { role: StreetRole::Start, .. }));
        assert_eq!(err.missing_street(), Some("X"));

        let err = p.find_route("AB", "Y").unwrap_err();
        assert!(matches!(err, PlanError::StreetNotFound { role: StreetRole::End, .. }));
        assert_eq!(err.missing_street(), Some("Y"));
    }

    #[test]
    fn unreachable_streets() {
        let mut p = planner(diamond());
        let err = p.find_route("CD", "AB").unwrap_err();
        assert!(matches!(err, PlanError::Unreachable { .. }));
        assert_eq!(p.cache_stats().connectivity, 1);
    }

    #[test]
    fn batch_keeps_going_after_failure() {
        let mut p = planner(diamond());
        let results = p.find_routes(&[("AB", "CD"), ("Nope", "CD"), ("AC", "CD")]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn grid_route_reaches_end_street() {
        let mut p = planner(grid());
        let route = p.find_route("Row0", "Row2").unwrap();
        assert!(route.success);
        assert_eq!(route.street_path.last().map(String::as_str), Some("Row2"));
        for w in route.path.windows(2) {
            assert!(p.network().edge_between(w[0], w[1]).is_some());
        }
        assert_consistent(&route);
    }

    #[test]
    fn same_seed_same_route() {
        let mut p1 = planner(grid());
        let mut p2 = planner(grid());
        let r1 = p1.find_route("Row0", "Col2").unwrap();
        let r2 = p2.find_route("Row0", "Col2").unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn traffic_updates_change_estimates_not_lengths() {
        let mut p = planner(diamond());
        assert_eq!(p.update_traffic("ab", rq_core::TrafficState::Heavy), 1);
        let route = p.find_route("AB", "AB").unwrap();
        assert_eq!(route.total_distance, 100.0);
        assert!(route.total_time > 10.0);
        p.clear_caches();
        assert_eq!(p.cache_stats(), crate::CacheStats::default());
    }
}

// ── Multi-stop ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod multi_stop {
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::multi_stop::{insert_missing_streets, nearest_neighbor_order, order_preserved};

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nearest_neighbor_walk() {
        let m = vec![vec![0.0, 5.0, 1.0], vec![5.0, 0.0, 2.0], vec![1.0, 2.0, 0.0]];
        assert_eq!(nearest_neighbor_order(&m), vec![0, 2, 1]);
        let ties = vec![vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]];
        assert_eq!(nearest_neighbor_order(&ties), vec![0, 1, 2]);
    }

    #[test]
    fn missing_streets_inserted_beside_neighbors() {
        let mut path = names(&["B", "C"]);
        insert_missing_streets(&mut path, &["A", "B", "C"]);
        assert_eq!(path, names(&["A", "B", "C"]));

        let mut path = names(&["A", "X", "C"]);
        insert_missing_streets(&mut path, &["A", "B", "C"]);
        assert_eq!(path, names(&["A", "B", "X", "C"]));

        let mut path = names(&["X"]);
        insert_missing_streets(&mut path, &["A"]);
        assert_eq!(path, names(&["X", "A"]));
    }

    #[test]
    fn order_check() {
        let path = names(&["A", "X", "B", "C"]);
        assert!(order_preserved(&path, &["A", "B", "C"]));
        assert!(!order_preserved(&path, &["B", "A"]));
        assert!(!order_preserved(&path, &["A", "Z"]));
    }

    #[test]
    fn input_validation() {
        let mut p = planner(grid());
        let none: [&str; 0] = [];
        assert!(matches!(p.find_multi_stop_route("Row0", &none), Err(PlanError::EmptyDestinations)));

        let err = p.find_multi_stop_route("Row0", &["Col1", "Nowhere"]).unwrap_err();
        assert!(matches!(err, PlanError::StreetNotFound { role: StreetRole::Destination, .. }));
        assert_eq!(err.missing_street(), Some("Nowhere"));
    }

    #[test]
    fn visits_every_destination_in_order() {
        let mut p = planner(grid());
        let route = p.find_multi_stop_route("Row0", &["Col2", "Row2"]).unwrap();
        assert!(route.success);
        for street in ["Row0", "Col2", "Row2"] {
            assert!(route.street_path.iter().any(|s| s == street), "{street} missing");
        }
        assert!(order_preserved(&route.street_path, &["Row0", "Col2", "Row2"]));
        assert_consistent(&route);
        assert!(p.network().edge_length.iter().all(|&l| l == 100.0));
    }

    #[test]
    fn later_legs_avoid_earlier_ones() {
        let p = planner(grid());
        let net = p.network();
        let (c00, c01, c02, c11) = (node(net, "r0c0"), node(net, "r0c1"), node(net, "r0c2"), node(net, "r1c1"));
        let leg = RouteResult::from_path(net, &[c00, c01, c11]);
        assert_eq!(leg.street_path, names(&["Row0", "Col1"]));

        let pending: FxHashSet<&str> = ["Col1"].into_iter().collect();
        let overlay = p.leg_overlay(std::slice::from_ref(&leg), &pending);
        let factor = |a, b| overlay.factor(net.edge_between(a, b).unwrap());
        // Driven edge, then the rest of the visited street.
        assert_eq!(factor(c00, c01), 5.0);
        assert_eq!(factor(c01, c02), 2.0);
        assert_eq!(factor(c01, c00), 2.0);
        // Pending destination streets and untouched streets stay free.
        assert_eq!(factor(c01, c11), 1.0);
        assert_eq!(factor(node(net, "r1c0"), c11), 1.0);

        let all_pending: FxHashSet<&str> = ["Row0", "Col1"].into_iter().collect();
        assert!(p.leg_overlay(&[leg], &all_pending).is_empty());
    }
}
