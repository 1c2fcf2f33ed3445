//! EZ-diffusion - closed-form diffusion model with simulate-and-recover tooling
//!
//! Maps drift rate, boundary separation and non-decision time to response
//! accuracy, mean response time and response-time variance, inverts that
//! mapping analytically, and runs seeded Monte Carlo sweeps that measure how
//! well the inverse recovers known parameters from noisy summary statistics.

pub mod config;
pub mod forward;
pub mod inverse;
pub mod metrics;
pub mod params;
pub mod sim;
pub mod stats;

use thiserror::Error;

// Re-export main types
pub use config::ExperimentConfig;
pub use forward::{observe, predict};
pub use inverse::{recover, recover_with_bounds, RecoveryBounds};
pub use metrics::{ErrorAccumulator, ErrorRecord, RecoveryReport};
pub use params::{DiffusionParams, ParameterRanges};
pub use sim::{
    run_recovery_experiment, run_single_trial, run_sweep, simulate_and_recover, RecoveryConfig,
    TrialRecord,
};
pub use stats::{ObservedStats, PredictedStats};

/// Crate-wide result alias.
pub type EzResult<T> = Result<T, EzError>;

#[derive(Debug, Error)]
pub enum EzError {
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("sample size must be at least {min}, got {got}")]
    InvalidSampleSize { got: u64, min: u64 },
    #[error("degenerate observation: observed variance {variance} is not strictly positive")]
    DegenerateObservation { variance: f64 },
    #[error("non-finite value in {context}: {value}")]
    NonFinite { context: &'static str, value: f64 },
    #[error("{distribution} distribution rejected its parameters: {message}")]
    Distribution {
        distribution: &'static str,
        message: String,
    },
    #[error("all {failed} trials failed at sample size {sample_size}")]
    NoSuccessfulTrials { sample_size: u64, failed: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EzError {
    /// Errors that only invalidate the trial that produced them.
    ///
    /// The recovery harness skips and counts these; everything else aborts
    /// the experiment.
    pub fn is_trial_local(&self) -> bool {
        matches!(
            self,
            EzError::DegenerateObservation { .. }
                | EzError::NonFinite { .. }
                | EzError::Distribution { .. }
        )
    }
}

/// Reject NaN and infinities with a labelled error.
pub(crate) fn ensure_finite(context: &'static str, value: f64) -> EzResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EzError::NonFinite { context, value })
    }
}
