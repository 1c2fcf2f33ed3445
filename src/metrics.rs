//! Recovery error metrics
//!
//! Per-trial bias and squared error, and their per-sample-size means.

use serde::Serialize;

use crate::params::DiffusionParams;

/// Per-trial recovery error, components ordered `[drift, boundary, nondecision]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorRecord {
    /// true - estimated
    pub bias: [f64; 3],
    pub squared_error: [f64; 3],
}

impl ErrorRecord {
    pub fn new(truth: &DiffusionParams, estimate: &DiffusionParams) -> Self {
        let truth = truth.as_array();
        let estimate = estimate.as_array();
        let bias = [
            truth[0] - estimate[0],
            truth[1] - estimate[1],
            truth[2] - estimate[2],
        ];
        Self {
            bias,
            squared_error: bias.map(|b| b * b),
        }
    }
}

/// Mean bias and squared error for one sample size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryReport {
    pub sample_size: u64,
    pub iterations: usize,
    pub successful_trials: usize,
    pub failed_trials: usize,
    pub mean_bias: [f64; 3],
    pub mean_squared_error: [f64; 3],
}

#[derive(Debug, Default, Clone)]
pub struct ErrorAccumulator {
    bias_sum: [f64; 3],
    squared_error_sum: [f64; 3],
    successes: usize,
    failures: usize,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &ErrorRecord) {
        for i in 0..3 {
            self.bias_sum[i] += record.bias[i];
            self.squared_error_sum[i] += record.squared_error[i];
        }
        self.successes += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn successes(&self) -> usize {
        self.successes
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Means over successful trials only; zero when there were none.
    pub fn finalize(&self, sample_size: u64) -> RecoveryReport {
        let (mean_bias, mean_squared_error) = if self.successes > 0 {
            let count = self.successes as f64;
            (
                self.bias_sum.map(|s| s / count),
                self.squared_error_sum.map(|s| s / count),
            )
        } else {
            ([0.0; 3], [0.0; 3])
        };

        RecoveryReport {
            sample_size,
            iterations: self.successes + self.failures,
            successful_trials: self.successes,
            failed_trials: self.failures,
            mean_bias,
            mean_squared_error,
        }
    }
}
