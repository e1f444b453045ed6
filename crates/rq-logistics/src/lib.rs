//! `rq-logistics` — transport allocation between streets.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`allocator`] | `TransportOptimizer`: cost matrix, Q-learning, greedy pass |
//! | [`cost`]      | `CostEstimator` trait, implemented by `RoutePlanner`     |
//! | [`types`]     | requests, destinations, allocations, `Quantity`          |
//! | [`config`]    | `AllocatorConfig`                                        |
//! | [`error`]     | `LogisticsError`, `LogisticsResult<T>`                   |
//!
//! # Example
//!
//! ```rust,ignore
//! let planner = RoutePlanner::new(network, PlannerConfig::default())?;
//! let mut optimizer = TransportOptimizer::new(planner, AllocatorConfig::default())?;
//! let plan = optimizer.optimize_allocation(
//!     &[LogisticsRequest::new("Depot Rd", 100.0)],
//!     &[LogisticsDestination::new("Main St", 40.0), LogisticsDestination::new("Oak Ave", 80.0)],
//! )?;
//! ```

pub mod allocator;
pub mod config;
pub mod cost;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use allocator::TransportOptimizer;
pub use config::AllocatorConfig;
pub use cost::CostEstimator;
pub use error::{LogisticsError, LogisticsResult};
pub use types::{LogisticsDestination, LogisticsRequest, Quantity, TransportAllocation};
