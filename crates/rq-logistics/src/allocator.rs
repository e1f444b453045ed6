//! Q-learning transport allocator.
//!
//! # Model
//!
//! A state records which sources still have supply and which destinations
//! still have demand (residual above `active_threshold`).  An action picks
//! one active `(source, destination)` cell and moves
//! `min(residual supply, residual demand)` units along it, so every episode
//! ends after at most `sources + destinations` moves.
//!
//! ```text
//! reward = clamp(−cost × units / 100, −1000, 1000)     (−1000 when cost = ∞)
//! Q(s,a) ← Q(s,a) + lr × clamp(reward + γ·max Q(s',·) − Q(s,a), −100, 100)
//! ```
//!
//! Unseen states get a row of uniform values in `[-0.01, 0.01]`.  After
//! training, one greedy pass from the initial state yields the allocation.
//!
//! # State space
//!
//! There are up to `2^(sources + destinations)` states.  The table only
//! holds states actually visited, but large inputs are logged as a warning.

use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use rq_core::SeededRng;

use crate::{
    AllocatorConfig, CostEstimator, LogisticsDestination, LogisticsError, LogisticsRequest, LogisticsResult,
    Quantity, TransportAllocation,
};

const REWARD_CLIP: f64 = 1000.0;
const TD_CLIP: f64 = 100.0;
const REWARD_SCALE: f64 = 100.0;
const UNREACHABLE_REWARD: f64 = -1000.0;
const INIT_SPREAD: f64 = 0.01;
const PROGRESS_EVERY: usize = 1000;

/// Which sources and destinations are still active.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct AllocState {
    supply: Vec<bool>,
    demand: Vec<bool>,
}

type Cell = (usize, usize);

/// Lazily grown table of `sources × destinations` values per state.
struct QTable {
    rows:  FxHashMap<AllocState, Vec<f64>>,
    width: usize,
    cells: usize,
}

impl QTable {
    fn new(sources: usize, destinations: usize) -> Self {
        Self { rows: FxHashMap::default(), width: destinations, cells: sources * destinations }
    }

    fn ensure(&mut self, state: &AllocState, rng: &mut SeededRng) {
        if !self.rows.contains_key(state) {
            let row = (0..self.cells).map(|_| rng.gen_range(-INIT_SPREAD..=INIT_SPREAD)).collect();
            self.rows.insert(state.clone(), row);
        }
    }

    fn get(&self, state: &AllocState, (i, j): Cell) -> f64 {
        self.rows.get(state).map_or(0.0, |row| row[i * self.width + j])
    }

    fn set(&mut self, state: &AllocState, (i, j): Cell, value: f64) {
        if let Some(row) = self.rows.get_mut(state) {
            row[i * self.width + j] = value;
        }
    }

    /// First valid cell with the highest value.
    fn best(&self, state: &AllocState, valid: &[Cell]) -> Option<Cell> {
        let mut best: Option<(Cell, f64)> = None;
        for &cell in valid {
            let q = self.get(state, cell);
            if best.is_none_or(|(_, b)| q > b) {
                best = Some((cell, q));
            }
        }
        best.map(|(cell, _)| cell)
    }

    fn max_value(&self, state: &AllocState, valid: &[Cell]) -> f64 {
        valid
            .iter()
            .map(|&c| self.get(state, c))
            .fold(None, |m: Option<f64>, q| Some(m.map_or(q, |m| m.max(q))))
            .unwrap_or(0.0)
    }
}

/// Allocates supply to demand, pricing each street pair with a
/// [`CostEstimator`].
///
/// Costs are cached per `(source, destination)` street pair for the
/// optimizer's lifetime, including pairs priced as unreachable.
pub struct TransportOptimizer<E> {
    estimator: E,
    config:    AllocatorConfig,
    costs:     FxHashMap<(String, String), f64>,
    rng:       SeededRng,
}

impl<E: CostEstimator> TransportOptimizer<E> {
    pub fn new(estimator: E, config: AllocatorConfig) -> LogisticsResult<Self> {
        config.validate()?;
        let rng = SeededRng::new(config.seed);
        Ok(Self { estimator, config, costs: FxHashMap::default(), rng })
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut E {
        &mut self.estimator
    }

    pub fn into_estimator(self) -> E {
        self.estimator
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn cached_costs(&self) -> usize {
        self.costs.len()
    }

    /// Travel time from `source` to `destination`; `f64::INFINITY` when the
    /// estimator has no route.
    pub fn cost(&mut self, source: &str, destination: &str) -> f64 {
        let key = (source.to_owned(), destination.to_owned());
        if let Some(&c) = self.costs.get(&key) {
            return c;
        }
        let c = self.estimator.route_cost(source, destination).unwrap_or(f64::INFINITY);
        self.costs.insert(key, c);
        c
    }

    /// Learn an allocation of `sources` to `destinations` that keeps total
    /// travel cost low.
    ///
    /// Demands are scaled down proportionally when they exceed total supply.
    /// The result never moves more out of a source than its capacity, nor
    /// more into a destination than its (scaled) demand.
    pub fn optimize_allocation(
        &mut self,
        sources:      &[LogisticsRequest],
        destinations: &[LogisticsDestination],
    ) -> LogisticsResult<Vec<TransportAllocation>> {
        for s in sources {
            check_quantity("capacity", &s.source_street, s.capacity)?;
        }
        for d in destinations {
            check_quantity("demand", &d.dest_street, d.demand)?;
        }
        if sources.is_empty() || destinations.is_empty() {
            debug!(sources = sources.len(), destinations = destinations.len(), "nothing to allocate");
            return Ok(Vec::new());
        }

        let (n_src, n_dst) = (sources.len(), destinations.len());
        if n_src + n_dst > self.config.state_space_warning {
            warn!(
                sources = n_src,
                destinations = n_dst,
                "allocation state space grows as 2^(sources + destinations)"
            );
        }

        let mut costs = vec![0.0; n_src * n_dst];
        for (i, s) in sources.iter().enumerate() {
            for (j, d) in destinations.iter().enumerate() {
                costs[i * n_dst + j] = self.cost(&s.source_street, &d.dest_street);
            }
        }

        let capacities: Vec<f64> = sources.iter().map(|s| s.capacity).collect();
        let mut demands: Vec<f64> = destinations.iter().map(|d| d.demand).collect();
        let total_supply: f64 = capacities.iter().sum();
        let total_demand: f64 = demands.iter().sum();
        info!(sources = n_src, destinations = n_dst, total_supply, total_demand, "optimizing allocation");
        if total_supply < total_demand {
            let scale = total_supply / total_demand;
            warn!(scale, "demand exceeds supply; scaling demands down");
            for d in &mut demands {
                *d *= scale;
            }
        }

        let table = self.train(&costs, &capacities, &demands);
        let matrix = self.greedy_allocation(&table, &capacities, &demands);

        let mut allocations = Vec::new();
        for (i, s) in sources.iter().enumerate() {
            for (j, d) in destinations.iter().enumerate() {
                let amount = matrix[i * n_dst + j];
                if amount > self.config.min_quantity {
                    allocations.push(TransportAllocation {
                        source_street: s.source_street.clone(),
                        dest_street:   d.dest_street.clone(),
                        quantity:      Quantity::from_f64(amount),
                    });
                }
            }
        }
        info!(allocations = allocations.len(), states = table.rows.len(), "allocation complete");
        Ok(allocations)
    }

    fn train(&mut self, costs: &[f64], capacities: &[f64], demands: &[f64]) -> QTable {
        let cfg = &self.config;
        let rng = &mut self.rng;
        let n_dst = demands.len();
        let mut table = QTable::new(capacities.len(), n_dst);
        let mut epsilon = cfg.epsilon;

        for episode in 0..cfg.episodes {
            let mut supply = capacities.to_vec();
            let mut demand = demands.to_vec();
            let mut state = state_of(&supply, &demand, cfg.active_threshold);
            table.ensure(&state, rng);

            while supply.iter().sum::<f64>() > 0.0 && demand.iter().sum::<f64>() > 0.0 {
                let valid = valid_cells(&supply, &demand, cfg.active_threshold);
                let cell = if rng.unit() < epsilon {
                    rng.choose(&valid).copied()
                } else {
                    table.best(&state, &valid)
                };
                let Some((i, j)) = cell else { break };

                let units = supply[i].min(demand[j]);
                let cost = costs[i * n_dst + j];
                let reward = if cost.is_infinite() {
                    UNREACHABLE_REWARD
                } else {
                    (-cost * units / REWARD_SCALE).clamp(-REWARD_CLIP, REWARD_CLIP)
                };
                supply[i] -= units;
                demand[j] -= units;

                let next = state_of(&supply, &demand, cfg.active_threshold);
                table.ensure(&next, rng);
                let next_valid = valid_cells(&supply, &demand, cfg.active_threshold);
                let future = table.max_value(&next, &next_valid);

                let old = table.get(&state, (i, j));
                let td = reward + cfg.discount_factor * future - old;
                let value = if td.is_finite() {
                    old + cfg.learning_rate * td.clamp(-TD_CLIP, TD_CLIP)
                } else {
                    old + cfg.learning_rate * reward / 10.0
                };
                table.set(&state, (i, j), value);
                state = next;
            }

            epsilon = (epsilon * cfg.epsilon_decay).max(cfg.epsilon_min);
            if (episode + 1) % PROGRESS_EVERY == 0 {
                debug!(episode = episode + 1, epsilon, states = table.rows.len(), "allocator training");
            }
        }
        table
    }

    fn greedy_allocation(&self, table: &QTable, capacities: &[f64], demands: &[f64]) -> Vec<f64> {
        let threshold = self.config.active_threshold;
        let n_dst = demands.len();
        let mut matrix = vec![0.0; capacities.len() * n_dst];
        let mut supply = capacities.to_vec();
        let mut demand = demands.to_vec();

        while supply.iter().sum::<f64>() > 0.0 && demand.iter().sum::<f64>() > 0.0 {
            let state = state_of(&supply, &demand, threshold);
            if !table.rows.contains_key(&state) {
                warn!(?state, "greedy pass reached a state never seen in training; stopping");
                break;
            }
            let valid = valid_cells(&supply, &demand, threshold);
            let Some((i, j)) = table.best(&state, &valid) else { break };
            let units = supply[i].min(demand[j]);
            matrix[i * n_dst + j] += units;
            supply[i] -= units;
            demand[j] -= units;
        }
        matrix
    }
}

fn check_quantity(kind: &'static str, street: &str, value: f64) -> LogisticsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LogisticsError::InvalidQuantity { kind, street: street.to_owned(), value })
    }
}

fn state_of(supply: &[f64], demand: &[f64], threshold: f64) -> AllocState {
    AllocState {
        supply: supply.iter().map(|&s| s > threshold).collect(),
        demand: demand.iter().map(|&d| d > threshold).collect(),
    }
}

fn valid_cells(supply: &[f64], demand: &[f64], threshold: f64) -> Vec<Cell> {
    let mut cells = Vec::new();
    for (i, &s) in supply.iter().enumerate() {
        if s <= threshold {
            continue;
        }
        for (j, &d) in demand.iter().enumerate() {
            if d > threshold {
                cells.push((i, j));
            }
        }
    }
    cells
}
