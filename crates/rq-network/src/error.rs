//! Network-subsystem error type.

use thiserror::Error;

/// Errors produced by `rq-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network has no edges")]
    Empty,

    #[error("edge {edge_id:?}: {field} must be positive and finite, got {value}")]
    InvalidAttribute {
        edge_id: String,
        field:   &'static str,
        value:   f64,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
