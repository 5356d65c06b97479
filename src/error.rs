use crate::format::Format;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("value {value} is outside the representable range of {format}")]
    Overflow { value: f64, format: Format },

    #[error("cannot encode NaN into {format}")]
    NotANumber { format: Format },

    #[error("dimension mismatch: expected {expected} initial values, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid integration step {step} (must be finite and positive)")]
    InvalidStep { step: f64 },

    #[error("invalid time interval [{start}, {end}]")]
    InvalidInterval { start: f64, end: f64 },

    #[error("initial state has not been set")]
    MissingInitialState,
}

pub type Result<T> = std::result::Result<T, Error>;
