//! [`RoutePlanner`]: owns the network, the agent, and the memo tables, and
//! answers single-pair and batch queries.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, info};

use rq_agent::ValueAgent;
use rq_core::{NodeId, SeededRng, TrafficState};
use rq_network::search::{hop_path, shortest_distance};
use rq_network::{GraphView, PenaltyOverlay, SensorReading, StreetNetwork, TrafficClassifier};

use crate::caches::{CacheStats, PlannerCaches};
use crate::connectivity::streets_connected;
use crate::selection::{EpisodeBudget, LARGE_STREET, candidate_pairs, promising_nodes};
use crate::{PlanError, PlanResult, PlannerConfig, RouteResult, StateKey, StreetRole};

/// A route within this factor of the pair's true shortest distance ends the
/// candidate search immediately.
const NEAR_SHORTEST: f64 = 1.3;

/// Successes needed, after this many attempts, to stop trying more pairs.
const ENOUGH_SUCCESSES: usize = 2;
const ENOUGH_ATTEMPTS: usize = 3;

/// Reinforcement-learning route planner.
///
/// The planner trains its agent on demand for every query; the value table
/// persists across queries, so later queries on similar neighbourhoods
/// start from learned values.
///
/// # Example
///
/// ```rust,ignore
/// let network = rq_network::load_network_csv(path)?;
/// let mut planner = RoutePlanner::new(network, PlannerConfig::default())?;
/// let route = planner.find_route("Main St", "Oak Rd")?;
/// println!("{:.0} m in {:.0} s", route.total_distance, route.total_time);
/// ```
pub struct RoutePlanner {
    pub(crate) network: StreetNetwork,
    pub(crate) agent:   ValueAgent<StateKey, NodeId>,
    pub(crate) caches:  PlannerCaches,
    pub(crate) config:  PlannerConfig,
    pub(crate) rng:     SeededRng,
}

impl RoutePlanner {
    pub fn new(network: StreetNetwork, config: PlannerConfig) -> PlanResult<Self> {
        config.validate()?;
        let agent = ValueAgent::new(&config.agent)?;
        let rng = SeededRng::new(config.seed);
        Ok(Self {
            network,
            agent,
            caches: PlannerCaches::default(),
            config,
            rng,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn network(&self) -> &StreetNetwork {
        &self.network
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn agent(&self) -> &ValueAgent<StateKey, NodeId> {
        &self.agent
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }

    // ── Traffic ───────────────────────────────────────────────────────────

    /// Set the traffic state of every edge carrying `external_id`.
    ///
    /// Cached guidance is kept; call [`clear_caches`](Self::clear_caches) to
    /// drop it.
    pub fn update_traffic(&mut self, external_id: &str, state: TrafficState) -> usize {
        self.network.update_traffic(external_id, state)
    }

    pub fn apply_readings(&mut self, readings: &[SensorReading], classifier: &TrafficClassifier) -> usize {
        self.network.apply_readings(readings, classifier)
    }

    pub fn clear_caches(&mut self) {
        self.caches.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Best trained route from `start` street to `end` street.
    pub fn find_route(&mut self, start: &str, end: &str) -> PlanResult<RouteResult> {
        self.require_street(start, StreetRole::Start)?;
        self.require_street(end, StreetRole::End)?;
        self.route_between(start, end, None)
    }

    /// Route every `(start, end)` pair independently; one failure does not
    /// stop the batch.
    pub fn find_routes<S: AsRef<str>>(&mut self, pairs: &[(S, S)]) -> Vec<PlanResult<RouteResult>> {
        pairs
            .iter()
            .map(|(start, end)| self.find_route(start.as_ref(), end.as_ref()))
            .collect()
    }

    pub(crate) fn require_street(&self, street: &str, role: StreetRole) -> PlanResult<()> {
        if self.network.streets().contains(street) {
            Ok(())
        } else {
            Err(PlanError::StreetNotFound { role, street: street.to_owned() })
        }
    }

    fn street_nodes(&self, street: &str) -> Vec<NodeId> {
        self.network
            .streets()
            .nodes(street)
            .map(|set: BTreeSet<NodeId>| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Single-pair routing over validated streets, optionally seeing edge
    /// lengths through a penalty overlay.
    pub(crate) fn route_between(
        &mut self,
        start:   &str,
        end:     &str,
        overlay: Option<&PenaltyOverlay>,
    ) -> PlanResult<RouteResult> {
        let started = Instant::now();

        if start == end {
            let (a, b) = self
                .network
                .streets()
                .first_pair(start)
                .ok_or_else(|| PlanError::Internal(format!("street {start:?} has no edges")))?;
            debug!(street = start, "start and end street coincide; returning its first edge");
            return Ok(RouteResult::from_path(&self.network, &[a, b]));
        }

        let mut start_nodes = self.street_nodes(start);
        let mut end_nodes = self.street_nodes(end);
        debug!(start, end, start_nodes = start_nodes.len(), end_nodes = end_nodes.len(), "routing");

        let connected = match self.caches.connectivity(start, end) {
            Some(c) => c,
            None => {
                let c = streets_connected(&self.network, &start_nodes, &end_nodes, &mut self.rng);
                self.caches.set_connectivity(start, end, c);
                c
            }
        };
        if !connected {
            return Err(PlanError::Unreachable { from: start.to_owned(), to: end.to_owned() });
        }

        if start_nodes.len() > LARGE_STREET || end_nodes.len() > LARGE_STREET {
            start_nodes = promising_nodes(&self.network, &start_nodes, &mut self.rng);
            end_nodes = promising_nodes(&self.network, &end_nodes, &mut self.rng);
            debug!(start_nodes = start_nodes.len(), end_nodes = end_nodes.len(), "reduced candidate nodes");
        }

        let sample_len = start_nodes
            .first()
            .zip(end_nodes.first())
            .and_then(|(&s, &e)| hop_path(&self.network, s, e))
            .map(|p| p.len());
        let budget = EpisodeBudget::scaled(&self.config.training, self.network.node_count(), sample_len);
        debug!(min = budget.min, max = budget.max, "episode budget");

        let limit = self.config.training.max_candidate_pairs.min(start_nodes.len() * end_nodes.len());
        let pairs = candidate_pairs(&self.network, &start_nodes, &end_nodes, limit);

        let mut best: Option<RouteResult> = None;
        let mut best_reward = f64::NEG_INFINITY;
        let mut successes = 0usize;

        for (i, pair) in pairs.iter().enumerate() {
            let attempt = i + 1;
            if best.is_some() && successes >= ENOUGH_SUCCESSES && attempt >= ENOUGH_ATTEMPTS {
                debug!(successes, "enough successful attempts; skipping remaining pairs");
                break;
            }

            let mut pair_budget = budget;
            if successes > 0 {
                pair_budget = pair_budget.halved();
            }
            if attempt > 2 {
                pair_budget = pair_budget.halved();
            }
            debug!(
                attempt,
                of = pairs.len(),
                from = self.network.label(pair.start),
                to = self.network.label(pair.end),
                priority = pair.priority,
                "training candidate pair"
            );

            let Some(route) = self.train_pair(pair.start, pair.end, pair_budget, overlay)? else {
                continue;
            };
            if !route.success {
                continue;
            }
            successes += 1;
            let reward = -route.total_time;
            if reward > best_reward {
                best_reward = reward;
                let near_shortest = shortest_distance(GraphView::new(&self.network), pair.start, pair.end)
                    .is_some_and(|d| route.total_distance < NEAR_SHORTEST * d);
                best = Some(route);
                if near_shortest {
                    debug!("route is close to the shortest distance; stopping");
                    break;
                }
            }
        }

        let Some(mut route) = best else {
            if successes > 0 {
                return Err(PlanError::Internal(format!(
                    "{successes} successful attempts recorded but no best route selected"
                )));
            }
            return Err(PlanError::NoRouteFound { from: start.to_owned(), to: end.to_owned() });
        };
        route.push_street(end);

        info!(
            start,
            end,
            nodes = route.path.len(),
            distance_m = route.total_distance,
            time_s = route.total_time,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "route found"
        );
        Ok(route)
    }
}
