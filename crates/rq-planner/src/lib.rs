//! `rq-planner` — reinforcement-learning street route planner.
//!
//! # Crate layout
//!
//! | Module           | Contents                                               |
//! |------------------|--------------------------------------------------------|
//! | [`planner`]      | `RoutePlanner`: single-pair and batch queries          |
//! | [`training`]     | per-pair episodic training, waypoints, reward shaping  |
//! | [`multi_stop`]   | distance matrix, visiting order, leg assembly          |
//! | [`selection`]    | node reduction, episode budgets, candidate pairs       |
//! | [`connectivity`] | sampled street-to-street reachability probe            |
//! | [`state`]        | `StateKey` neighbourhood fingerprint                   |
//! | [`caches`]       | hop-path, connectivity, and distance memo tables       |
//! | [`result`]       | `RouteResult`, `RouteSegment`, `TrafficDistribution`   |
//! | [`config`]       | `PlannerConfig`, `TrainingConfig`                      |
//! | [`error`]        | `PlanError`, `PlanResult<T>`                           |
//!
//! # Determinism
//!
//! Every random decision draws from the planner's single [`SeededRng`]
//! (seeded from [`PlannerConfig::seed`]), so two planners built from the
//! same network and config return identical results for the same query
//! sequence.  Only the wall-clock soft stop can break this, and only on
//! runs long enough to trigger it.
//!
//! [`SeededRng`]: rq_core::SeededRng

pub mod caches;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod multi_stop;
pub mod planner;
pub mod result;
pub mod selection;
pub mod state;
pub mod training;

#[cfg(test)]
mod tests;

pub use caches::CacheStats;
pub use config::{PlannerConfig, TrainingConfig};
pub use error::{PlanError, PlanResult, StreetRole};
pub use planner::RoutePlanner;
pub use result::{RouteResult, RouteSegment, TrafficDistribution};
pub use state::StateKey;
