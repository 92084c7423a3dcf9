//! Engine Error Taxonomy
//!
//! Request-level failures are surfaced as `EngineError`. Allocation
//! infeasibility is NOT an error: it is an expected business outcome reported
//! as `AllocationStatus::Infeasible` in the result structure.
//!
//! Per-crop prediction failures (`predict::PredictionError`) are recovered
//! locally by dropping the crop; only when no crop survives does the request
//! fail with `NoScoreableCrops`.

use thiserror::Error;

/// Tolerance for weight-sum validation.
///
/// Weights that do not sum to 1.0 within this tolerance are rejected rather
/// than silently renormalized; renormalization would hide caller bugs.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Errors surfaced to the caller of the recommendation/allocation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or empty input: empty crop list, `area_ha <= 0`,
    /// out-of-range soil attributes, unknown crop ids in a filter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Criteria or score weights do not sum to 1.0 within tolerance.
    #[error("invalid weights: sum is {sum:.6}, expected 1.0 (tolerance 1e-6)")]
    InvalidWeights { sum: f64 },

    /// A water sensitivity string did not match `low|medium|high`.
    #[error("unknown water sensitivity '{0}' (expected low, medium or high)")]
    UnknownWaterSensitivity(String),

    /// A risk band string did not match `low|medium|high`.
    #[error("unknown risk band '{0}' (expected low, medium or high)")]
    UnknownRiskBand(String),

    /// Every candidate crop was dropped (prediction failures); nothing left
    /// to rank.
    #[error("no crop could be scored: {0}")]
    NoScoreableCrops(String),
}

/// Validate that `weights` sums to 1.0 within [`WEIGHT_TOLERANCE`].
pub fn validate_weight_sum(weights: &[f64]) -> Result<(), EngineError> {
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(EngineError::InvalidWeights { sum });
    }
    Ok(())
}
