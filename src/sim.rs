//! Simulate-and-recover harness
//!
//! Draws true parameters, pushes them through the forward model and the
//! sampling noise, recovers them with the inverse model, and averages the
//! recovery error over many trials.
//!
//! Randomness always comes from a caller-supplied stream. Each trial takes
//! three uniforms and one `u64` from that stream; the `u64` seeds a private
//! `ChaCha8Rng` for the sampling noise. Stream consumption per trial is
//! therefore independent of the sample size, so experiments run from the
//! same seed see the same sequence of true parameters at every sample size.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::ExperimentConfig;
use crate::forward::{observe, predict, MIN_SAMPLE_SIZE};
use crate::inverse::{recover_with_bounds, RecoveryBounds};
use crate::metrics::{ErrorAccumulator, ErrorRecord, RecoveryReport};
use crate::params::{DiffusionParams, ParameterRanges};
use crate::stats::ObservedStats;
use crate::{EzError, EzResult};

/// Settings shared by every trial of an experiment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryConfig {
    /// Sampling ranges for true parameters
    pub ranges: ParameterRanges,
    /// Clamp windows for the inverse model
    pub bounds: RecoveryBounds,
    /// Diffusion scaling constant passed to the inverse model
    pub scaling: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            ranges: ParameterRanges::default(),
            bounds: RecoveryBounds::default(),
            scaling: 1.0,
        }
    }
}

impl RecoveryConfig {
    pub fn validate(&self) -> EzResult<()> {
        self.ranges.validate()?;
        self.bounds.validate()?;
        if !(self.scaling > 0.0 && self.scaling.is_finite()) {
            return Err(EzError::InvalidConfig(format!(
                "scaling must be finite and > 0, got {}",
                self.scaling
            )));
        }
        Ok(())
    }
}

/// Everything produced by one simulated trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialRecord {
    pub truth: DiffusionParams,
    pub observed: ObservedStats,
    pub estimate: DiffusionParams,
    pub error: ErrorRecord,
}

/// Run forward, noise and inverse for known true parameters.
pub fn simulate_and_recover<R: Rng + ?Sized>(
    config: &RecoveryConfig,
    truth: &DiffusionParams,
    sample_size: u64,
    rng: &mut R,
) -> EzResult<TrialRecord> {
    let predicted = predict(truth)?;
    let observed = observe(&predicted, sample_size, rng)?;
    let estimate = recover_with_bounds(&observed, config.scaling, &config.bounds)?;

    Ok(TrialRecord {
        truth: *truth,
        observed,
        estimate,
        error: ErrorRecord::new(truth, &estimate),
    })
}

/// Sample true parameters from `config.ranges` and simulate one trial.
pub fn run_single_trial<R: Rng + ?Sized>(
    config: &RecoveryConfig,
    sample_size: u64,
    rng: &mut R,
) -> EzResult<TrialRecord> {
    let truth = config.ranges.sample(rng);
    let mut noise_rng = ChaCha8Rng::seed_from_u64(rng.gen());
    simulate_and_recover(config, &truth, sample_size, &mut noise_rng)
}

/// Run `iterations` trials at one sample size and average their errors.
///
/// Trials failing with a trial-local error (see [`EzError::is_trial_local`])
/// are skipped and counted in [`RecoveryReport::failed_trials`]; any other
/// error aborts the experiment.
pub fn run_recovery_experiment<R: Rng + ?Sized>(
    config: &RecoveryConfig,
    sample_size: u64,
    iterations: usize,
    rng: &mut R,
) -> EzResult<RecoveryReport> {
    config.validate()?;
    if sample_size < MIN_SAMPLE_SIZE {
        return Err(EzError::InvalidSampleSize {
            got: sample_size,
            min: MIN_SAMPLE_SIZE,
        });
    }
    if iterations == 0 {
        return Err(EzError::InvalidConfig(
            "iterations must be greater than zero".to_string(),
        ));
    }

    let mut acc = ErrorAccumulator::new();

    for trial in 0..iterations {
        match run_single_trial(config, sample_size, rng) {
            Ok(record) => {
                debug!(trial, sample_size, bias = ?record.error.bias, "trial recovered");
                acc.observe(&record.error);
            }
            Err(err) if err.is_trial_local() => {
                warn!(trial, sample_size, error = %err, "skipping failed trial");
                acc.record_failure();
            }
            Err(err) => return Err(err),
        }
    }

    if acc.successes() == 0 {
        return Err(EzError::NoSuccessfulTrials {
            sample_size,
            failed: acc.failures(),
        });
    }

    let report = acc.finalize(sample_size);
    if report.failed_trials > 0 {
        warn!(
            sample_size,
            failed = report.failed_trials,
            iterations,
            "recovery experiment finished with failed trials"
        );
    }
    info!(
        sample_size,
        iterations,
        mean_bias = ?report.mean_bias,
        mean_squared_error = ?report.mean_squared_error,
        "recovery experiment finished"
    );

    Ok(report)
}

/// Run one experiment per configured sample size.
///
/// Every sample size gets a fresh stream from [`ExperimentConfig::stream`].
pub fn run_sweep(config: &ExperimentConfig) -> EzResult<Vec<RecoveryReport>> {
    config.validate()?;
    let recovery = config.recovery_config();

    config
        .sample_sizes
        .iter()
        .map(|&sample_size| {
            let mut rng = config.stream();
            run_recovery_experiment(&recovery, sample_size, config.iterations, &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_trial_is_reproducible() {
        let config = RecoveryConfig::default();
        let a = run_single_trial(&config, 100, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = run_single_trial(&config, 100, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_truth_sequence_independent_of_sample_size() {
        let config = RecoveryConfig::default();
        let mut small = ChaCha8Rng::seed_from_u64(11);
        let mut large = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            let a = run_single_trial(&config, 10, &mut small).unwrap();
            let b = run_single_trial(&config, 4000, &mut large).unwrap();
            assert_eq!(a.truth, b.truth);
        }
    }

    #[test]
    fn test_trial_error_matches_truth_and_estimate() {
        let config = RecoveryConfig::default();
        let record = run_single_trial(&config, 40, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(record.error, ErrorRecord::new(&record.truth, &record.estimate));
        assert!((0.95..=1.05).contains(&record.estimate.boundary));
        assert!((0.28..=0.32).contains(&record.estimate.nondecision));
    }

    #[test]
    fn test_experiment_counts_every_trial() {
        let config = RecoveryConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2026);
        let report = run_recovery_experiment(&config, 40, 250, &mut rng).unwrap();
        assert_eq!(report.sample_size, 40);
        assert_eq!(report.iterations, 250);
        assert_eq!(report.successful_trials, 250);
        assert_eq!(report.failed_trials, 0);
        assert!(report.mean_squared_error.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_experiment_rejects_bad_arguments() {
        let config = RecoveryConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            run_recovery_experiment(&config, 1, 10, &mut rng),
            Err(EzError::InvalidSampleSize { got: 1, .. })
        ));
        assert!(matches!(
            run_recovery_experiment(&config, 10, 0, &mut rng),
            Err(EzError::InvalidConfig(_))
        ));

        let bad_scaling = RecoveryConfig {
            scaling: -1.0,
            ..RecoveryConfig::default()
        };
        assert!(run_recovery_experiment(&bad_scaling, 10, 10, &mut rng).is_err());
    }

    #[test]
    fn test_all_failed_trials_reported() {
        // boundary^2 overflows, so every prediction is non-finite.
        let config = RecoveryConfig {
            ranges: ParameterRanges {
                boundary: (1e200, 2e200),
                ..ParameterRanges::default()
            },
            ..RecoveryConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = run_recovery_experiment(&config, 10, 5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            EzError::NoSuccessfulTrials {
                sample_size: 10,
                failed: 5
            }
        ));
    }

    #[test]
    fn test_partial_failures_are_counted() {
        // drift^3 underflows for drifts below ~1e-103, making the predicted
        // variance non-finite; larger drifts still predict finite statistics.
        let config = RecoveryConfig {
            ranges: ParameterRanges {
                drift: (1e-104, 1e-102),
                ..ParameterRanges::default()
            },
            ..RecoveryConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let report = run_recovery_experiment(&config, 40, 200, &mut rng).unwrap();

        assert!(report.failed_trials > 0);
        assert!(report.successful_trials > 0);
        assert_eq!(report.successful_trials + report.failed_trials, 200);
        assert_eq!(report.iterations, 200);
        assert!(report.mean_bias.iter().all(|v| v.is_finite()));
        assert!(report.mean_squared_error.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sweep_reports_each_sample_size() {
        let config = ExperimentConfig {
            sample_sizes: vec![2, 10, 40],
            iterations: 50,
            ..ExperimentConfig::default()
        };
        let reports = run_sweep(&config).unwrap();
        let sizes: Vec<u64> = reports.iter().map(|r| r.sample_size).collect();
        assert_eq!(sizes, vec![2, 10, 40]);
        assert!(reports.iter().all(|r| r.successful_trials == 50));
        assert_eq!(run_sweep(&config).unwrap(), reports);
    }
}
