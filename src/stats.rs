//! Summary statistics
//!
//! - `PredictedStats`: noiseless output of the forward model
//! - `ObservedStats`: the same three statistics after sampling noise

use serde::{Deserialize, Serialize};

/// Lower bound kept on every response-time variance.
pub const VARIANCE_FLOOR: f64 = 1e-6;

/// Upper clamp applied to predicted response-time variance.
pub const VARIANCE_CEILING: f64 = 1.0;

/// Statistics predicted from a parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedStats {
    /// Probability of a correct response, in (0, 1)
    pub response_rate: f64,
    /// Mean response time
    pub mean_time: f64,
    /// Response-time variance, in [VARIANCE_FLOOR, VARIANCE_CEILING]
    pub variance_time: f64,
}

impl PredictedStats {
    pub fn new(response_rate: f64, mean_time: f64, variance_time: f64) -> Self {
        Self {
            response_rate,
            mean_time,
            variance_time,
        }
    }
}

/// Statistics observed from `sample_size` simulated trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedStats {
    /// Fraction of correct responses, in [0, 1]
    pub response_rate: f64,
    pub mean_time: f64,
    /// At least VARIANCE_FLOOR when produced by `observe`
    pub variance_time: f64,
}

impl ObservedStats {
    pub fn new(response_rate: f64, mean_time: f64, variance_time: f64) -> Self {
        Self {
            response_rate,
            mean_time,
            variance_time,
        }
    }
}

impl From<PredictedStats> for ObservedStats {
    /// Treat a prediction as a noiseless observation.
    fn from(predicted: PredictedStats) -> Self {
        Self::new(
            predicted.response_rate,
            predicted.mean_time,
            predicted.variance_time,
        )
    }
}
