//! `rq-core` — foundational types for the `rq` street-routing workspace.
//!
//! Every other `rq-*` crate depends on this one.  It has no `rq-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                          |
//! |---------------|---------------------------------------------------|
//! | [`ids`]       | `NodeId`, `EdgeId`                                |
//! | [`traffic`]   | `TrafficState` ordinal congestion levels          |
//! | [`rng`]       | `SeededRng` (deterministic training randomness)   |
//! | [`error`]     | `CoreError`, `CoreResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod rng;
pub mod traffic;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{EdgeId, NodeId};
pub use rng::SeededRng;
pub use traffic::TrafficState;
