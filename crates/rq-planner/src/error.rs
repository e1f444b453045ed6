//! Planner error taxonomy.
//!
//! | Variant             | Kind                   | Retry?                      |
//! |---------------------|------------------------|-----------------------------|
//! | `StreetNotFound`    | input validation       | no                          |
//! | `EmptyDestinations` | input validation       | no                          |
//! | `Unreachable`       | connectivity probe     | no, needs different streets |
//! | `NoRouteFound`      | training convergence   | yes, with larger budgets    |
//! | `Internal`          | logic fault            | no, a defect                |
//!
//! Numerical trouble inside training never becomes an error.

use std::fmt;

use rq_agent::AgentError;
use rq_core::CoreError;
use thiserror::Error;

/// Which input a missing street came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StreetRole {
    Start,
    End,
    Destination,
}

impl fmt::Display for StreetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreetRole::Start       => "start",
            StreetRole::End         => "end",
            StreetRole::Destination => "destination",
        })
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{role} street {street:?} not found in network")]
    StreetNotFound { role: StreetRole, street: String },

    #[error("multi-stop request needs at least one destination")]
    EmptyDestinations,

    #[error("no path exists between {from:?} and {to:?}")]
    Unreachable { from: String, to: String },

    #[error("no route found between {from:?} and {to:?} within the training budget")]
    NoRouteFound { from: String, to: String },

    #[error("internal planner fault: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
}

impl PlanError {
    /// The unresolved street name, for building suggestions.
    pub fn missing_street(&self) -> Option<&str> {
        match self {
            PlanError::StreetNotFound { street, .. } => Some(street),
            _ => None,
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
