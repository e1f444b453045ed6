//! Per-pair episodic training.
//!
//! # Episode
//!
//! An episode walks from the start node through each waypoint in turn.  At
//! every step it either explores (probability shrinking as the segment
//! ages) or follows the agent's softmax policy, and the agent is updated
//! with
//!
//! ```text
//! reward = −travel_time(edge)
//!        + 20 × (potential(cur) − potential(next))
//!        + terminal bonus                     (when `next` is the waypoint)
//! ```
//!
//! where `potential(n)` is the distance from `n` to the end node.  The
//! terminal bonus is 2000 for the end node and 500 for an intermediate
//! waypoint, plus 200 when the segment took fewer than 1.5 × the hop-path
//! length in steps.
//!
//! # Search space
//!
//! Moves are restricted to nodes within `min(2 × hop_nodes, 500)` hops of
//! the end node plus the hop path itself, so longer detours over short
//! edges stay reachable.  A node already visited in the episode
//! can be re-entered only after 50 steps in the current segment.
//!
//! # Stopping
//!
//! Once `budget.min` episodes have run, training ends on a high success
//! rate, on prolonged stagnation after a route is known, or on a streak of
//! 20 successes.  Several successes within 1.2 × the shortest distance end
//! it at any time, and a
//! wall-clock soft stop abandons long runs that stopped improving.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use rq_agent::Experience;
use rq_core::{NodeId, SeededRng};
use rq_network::{GraphView, PenaltyOverlay, StreetNetwork};

use crate::selection::EpisodeBudget;
use crate::{PlanError, PlanResult, RoutePlanner, RouteResult, StateKey};

// ── Reward shaping ────────────────────────────────────────────────────────────

const PROGRESS_WEIGHT: f64 = 20.0;
const FINAL_BONUS: f64 = 2000.0;
const WAYPOINT_BONUS: f64 = 500.0;
const EFFICIENCY_BONUS: f64 = 200.0;
/// Potential of a node that cannot reach the end node.
const UNREACHED_POTENTIAL: f64 = 1000.0;

// ── Search space ──────────────────────────────────────────────────────────────

const SEARCH_RADIUS_CAP: usize = 500;
const WAYPOINT_THRESHOLD: usize = 50;
const WAYPOINT_SPLIT: usize = 5;
const MIN_SEGMENT_STEPS: usize = 100;
const REVISIT_AFTER: usize = 50;
const STATE_CACHE_LIMIT: usize = 10_000;

// ── Exploration ───────────────────────────────────────────────────────────────

/// Share of exploratory moves biased toward the current waypoint.
const TARGET_BIAS: f64 = 0.7;
/// Within a biased move, chance of taking the single closest neighbour.
const CLOSEST_PICK: f64 = 0.3;
const STREAK_DECAY: f64 = 0.995;
const STREAK_FLOOR: f64 = 0.1;
const IDLE_DECAY: f64 = 0.999;
const IDLE_FLOOR: f64 = 0.2;

// ── Early stopping ────────────────────────────────────────────────────────────

const MIN_SUCCESSES: usize = 5;
const SUCCESS_STREAK: usize = 20;
const MIN_STAGNATION: usize = 100;
const NEAR_OPTIMAL_RATIO: f64 = 1.2;
const NEAR_OPTIMAL_SUCCESSES: usize = 3;

impl RoutePlanner {
    /// Train the agent on `start → end` and return the best completed path,
    /// or `None` if no episode reached `end`.
    ///
    /// The agent's exploration rate is raised for the run and restored
    /// before returning.
    pub(crate) fn train_pair(
        &mut self,
        start:   NodeId,
        end:     NodeId,
        budget:  EpisodeBudget,
        overlay: Option<&PenaltyOverlay>,
    ) -> PlanResult<Option<RouteResult>> {
        let Self { network, agent, caches, config, rng } = self;
        let network: &StreetNetwork = network;
        let training = &config.training;
        let view = GraphView::with_overlay(network, overlay);

        let Some(shortest) = caches.hop_path(network, start, end) else {
            debug!(from = network.label(start), to = network.label(end), "pair unreachable; skipped");
            return Ok(None);
        };
        let hop_nodes = shortest.len();
        let waypoints = waypoints(&shortest, end);

        let to_end = caches.distances(view, end);
        let fields: Vec<Arc<Vec<f64>>> = waypoints
            .iter()
            .map(|&w| if w == end { Arc::clone(&to_end) } else { caches.distances(view, w) })
            .collect();

        // ── Bounded search space ──────────────────────────────────────────
        let radius = (2 * hop_nodes).min(SEARCH_RADIUS_CAP);
        let hops_to_end = caches.hop_field(network, end);
        let mut in_bounds: Vec<bool> = hops_to_end.iter().map(|h| h.is_some_and(|n| n <= radius)).collect();
        for n in shortest.iter() {
            in_bounds[n.index()] = true;
        }
        let neighbors: Vec<Vec<NodeId>> = network
            .nodes()
            .map(|n| {
                if in_bounds[n.index()] {
                    network.successors(n).filter(|s| in_bounds[s.index()]).collect()
                } else {
                    Vec::new()
                }
            })
            .collect();
        let bounded = in_bounds.iter().filter(|&&b| b).count();

        let episodes = budget.episodes_for(hop_nodes);
        let max_steps = MIN_SEGMENT_STEPS.max(hop_nodes);
        let stagnation_limit = MIN_STAGNATION.max(episodes / 10);
        debug!(hop_nodes, waypoints = waypoints.len(), bounded, episodes, "training pair");

        let potential = |n: NodeId| {
            let d = to_end[n.index()];
            if d.is_finite() { d } else { UNREACHED_POTENTIAL }
        };

        let saved_epsilon = agent.epsilon;
        agent.set_epsilon(training.training_epsilon);
        let idle_floor = IDLE_FLOOR.min(training.training_epsilon);
        let streak_floor = STREAK_FLOOR.min(training.training_epsilon);

        let mut states: FxHashMap<NodeId, StateKey> = FxHashMap::default();
        let mut visited = vec![false; network.node_count()];
        let mut best: Option<Vec<NodeId>> = None;
        let mut best_reward = f64::NEG_INFINITY;
        let mut best_progress = 0.0f64;
        let mut successes = 0usize;
        let mut streak = 0usize;
        let mut stagnation = 0usize;
        let mut episodes_run = 0usize;
        let mut failure: Option<PlanError> = None;

        let report_every = Duration::from_secs(training.report_interval_secs);
        let soft_stop = Duration::from_secs(training.soft_stop_secs);
        let started = Instant::now();
        let mut last_report = started;

        'episodes: for episode in 0..episodes {
            episodes_run = episode + 1;
            let mut current = start;
            let mut path = vec![start];
            let mut total_reward = 0.0;
            let mut travelled = 0.0;
            visited[start.index()] = true;

            for (w, &target) in waypoints.iter().enumerate() {
                let field = &fields[w];
                let mut steps = 0usize;

                while current != target && steps < max_steps {
                    let state = state_of(&mut states, network, current);
                    let valid: Vec<NodeId> = neighbors[current.index()]
                        .iter()
                        .copied()
                        .filter(|n| !visited[n.index()] || steps > REVISIT_AFTER)
                        .collect();
                    if valid.is_empty() {
                        break;
                    }

                    let explore_rate = agent.epsilon * (1.0 - 0.5 * steps as f64 / max_steps as f64);
                    let next = if rng.unit() < explore_rate {
                        explore(&valid, field, rng)
                    } else {
                        match agent.choose_action(&state, &valid, true, training.temperature, rng) {
                            Ok(n) => n,
                            Err(e) => {
                                failure = Some(e.into());
                                break 'episodes;
                            }
                        }
                    };

                    let Some(edge) = network.edge_between(current, next) else {
                        failure = Some(PlanError::Internal(format!(
                            "neighbour {} of {} has no edge",
                            network.label(next),
                            network.label(current)
                        )));
                        break 'episodes;
                    };

                    let mut bonus = 0.0;
                    if next == target {
                        bonus = if target == end { FINAL_BONUS } else { WAYPOINT_BONUS };
                        if (steps as f64) < hop_nodes as f64 * 1.5 {
                            bonus += EFFICIENCY_BONUS;
                        }
                    }
                    let reward = -view.travel_time(edge)
                        + PROGRESS_WEIGHT * (potential(current) - potential(next))
                        + bonus;

                    let next_state = state_of(&mut states, network, next);
                    let next_actions = &neighbors[next.index()];
                    agent.update(&state, &next, reward, &next_state, next_actions);
                    agent.store_experience(Experience {
                        state,
                        action: next,
                        reward,
                        next_state,
                        next_actions: next_actions.clone(),
                    });
                    if episode % 5 == 0 && steps % 20 == 0 {
                        let batch = agent.batch_size;
                        agent.experience_replay(batch, rng);
                    }

                    current = next;
                    visited[current.index()] = true;
                    path.push(current);
                    total_reward += reward;
                    travelled += view.length(edge);
                    steps += 1;
                }

                if current != target {
                    break;
                }
            }

            for n in &path {
                visited[n.index()] = false;
            }

            // ── Episode bookkeeping ───────────────────────────────────────
            if current == end {
                successes += 1;
                streak += 1;
                if total_reward > best_reward {
                    best_reward = total_reward;
                    debug!(episode, nodes = path.len(), reward = total_reward, "new best path");
                    best = Some(path.clone());
                    stagnation = 0;
                } else {
                    stagnation += 1;
                }
                if travelled <= to_end[start.index()] * NEAR_OPTIMAL_RATIO
                    && successes >= NEAR_OPTIMAL_SUCCESSES
                    && streak >= NEAR_OPTIMAL_SUCCESSES
                {
                    debug!(episode, "several near-optimal paths; stopping");
                    break;
                }
            } else {
                streak = 0;
                let initial = to_end[start.index()];
                let remaining = to_end[current.index()];
                if initial.is_finite() && initial > 0.0 && remaining.is_finite() {
                    let progress = ((initial - remaining) / initial * 100.0).max(0.0);
                    if progress > best_progress {
                        best_progress = progress;
                        stagnation = 0;
                    } else {
                        stagnation += 1;
                    }
                } else {
                    stagnation += 1;
                }
            }

            if last_report.elapsed() >= report_every {
                let elapsed = started.elapsed();
                info!(
                    episode,
                    episodes,
                    success_rate = successes as f64 / episodes_run as f64,
                    elapsed_s = elapsed.as_secs_f64(),
                    "training progress"
                );
                if elapsed >= soft_stop && stagnation > training.soft_stop_stagnation {
                    info!(elapsed_s = elapsed.as_secs_f64(), stagnation, "no progress; soft stop");
                    break;
                }
                last_report = Instant::now();
            }

            agent.epsilon = if streak > 0 {
                (agent.epsilon * STREAK_DECAY).max(streak_floor)
            } else {
                (agent.epsilon * IDLE_DECAY).max(idle_floor)
            };

            if episode >= budget.min {
                let success_rate = successes as f64 / episodes_run as f64;
                if success_rate >= training.success_threshold && successes >= MIN_SUCCESSES {
                    debug!(episode, success_rate, "success rate reached; stopping");
                    break;
                }
                if best.is_some() && stagnation > stagnation_limit {
                    debug!(episode, stagnation, "stagnating with a known route; stopping");
                    break;
                }
                if streak >= SUCCESS_STREAK {
                    debug!(episode, streak, "success streak; stopping");
                    break;
                }
            }
        }

        agent.epsilon = saved_epsilon;
        if let Some(e) = failure {
            return Err(e);
        }

        debug!(
            successes,
            episodes_run,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "training finished"
        );
        Ok(best.map(|p| RouteResult::from_path(network, &p)))
    }
}

/// Sub-goals along a long hop path: every `len / 5`-th node, then `end`.
pub(crate) fn waypoints(shortest: &[NodeId], end: NodeId) -> Vec<NodeId> {
    if shortest.len() <= WAYPOINT_THRESHOLD {
        return vec![end];
    }
    let step = (shortest.len() / WAYPOINT_SPLIT).max(1);
    let mut points: Vec<NodeId> = shortest.iter().copied().step_by(step).skip(1).collect();
    if points.last() != Some(&end) {
        points.push(end);
    }
    points
}

fn state_of(cache: &mut FxHashMap<NodeId, StateKey>, network: &StreetNetwork, node: NodeId) -> StateKey {
    if let Some(s) = cache.get(&node) {
        return s.clone();
    }
    let state = StateKey::of(network, node);
    if cache.len() < STATE_CACHE_LIMIT {
        cache.insert(node, state.clone());
    }
    state
}

/// Exploratory move: usually toward the neighbours closest to the current
/// waypoint, otherwise uniform.  `valid` must be non-empty.
fn explore(valid: &[NodeId], field: &[f64], rng: &mut SeededRng) -> NodeId {
    if rng.unit() < TARGET_BIAS {
        let mut near: Vec<(NodeId, f64)> = valid
            .iter()
            .map(|&n| (n, field[n.index()]))
            .filter(|(_, d)| d.is_finite())
            .collect();
        if !near.is_empty() {
            near.sort_by(|a, b| a.1.total_cmp(&b.1));
            if rng.unit() < CLOSEST_PICK {
                return near[0].0;
            }
            let half = (near.len() / 2).max(1);
            return near[rng.gen_range(0..half)].0;
        }
    }
    valid[rng.gen_range(0..valid.len())]
}

