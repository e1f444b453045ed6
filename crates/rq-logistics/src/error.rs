use rq_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogisticsError {
    /// A capacity or demand that is negative or not finite.
    #[error("{kind} of {street:?} must be a non-negative finite number, got {value}")]
    InvalidQuantity { kind: &'static str, street: String, value: f64 },

    #[error("configuration error: {0}")]
    Config(#[from] CoreError),
}

pub type LogisticsResult<T> = Result<T, LogisticsError>;
