//! Errors raised when an analysis configuration is accepted.
//!
//! Everything past configuration acceptance is infallible: missing or
//! unparseable listing fields are recovered by the normalizer, and an empty
//! pool produces empty results.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("weight `{name}` must be non-negative, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("weight `{name}` must be finite, got {value}")]
    NonFiniteWeight { name: &'static str, value: f64 },

    #[error("weights must sum to a finite value, got {total}")]
    NonFiniteWeightTotal { total: f64 },

    #[error("`{name}` must be greater than zero")]
    NonPositiveCapacity { name: &'static str },

    #[error("b-threshold {value} is outside [0, 1]")]
    ThresholdOutOfRange { value: f64 },

    #[error("competition weight {value} is outside [0, 1]")]
    InvalidCompetitionWeight { value: f64 },
}
