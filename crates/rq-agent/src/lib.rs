//! `rq-agent` — tabular action-value agent.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`agent`]  | `ValueAgent<S, A>`: value table, action selection, TD(0)   |
//! | [`replay`] | `Experience`, `ReplayBuffer` (bounded FIFO)                |
//! | [`config`] | `AgentConfig` hyper-parameters                             |
//! | [`error`]  | `AgentError`, `AgentResult<T>`                             |
//!
//! # Design notes
//!
//! The agent is generic over its state and action types; the route planner
//! uses a structured neighbourhood fingerprint as `S` and `NodeId` as `A`.
//! It owns no RNG: every stochastic call takes `&mut SeededRng` from the
//! caller, so a planner's single seed determines every decision.
//!
//! Exploration decay is driven by the caller through
//! [`ValueAgent::decay_epsilon`] and [`ValueAgent::set_epsilon`].

pub mod agent;
pub mod config;
pub mod error;
pub mod replay;


pub use agent::{VALUE_CLIP, ValueAgent};
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use replay::{Experience, ReplayBuffer};
