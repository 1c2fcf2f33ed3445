//! Forward EZ-diffusion model
//!
//! `predict` maps parameters to noiseless summary statistics; `observe`
//! perturbs those statistics the way a finite sample of `N` trials would.

use rand::Rng;
use rand_distr::{Binomial, Distribution, Gamma, Normal};

use crate::params::DiffusionParams;
use crate::stats::{ObservedStats, PredictedStats, VARIANCE_CEILING, VARIANCE_FLOOR};
use crate::{ensure_finite, EzError, EzResult};

/// Smallest sample size with a defined variance sampling distribution.
pub const MIN_SAMPLE_SIZE: u64 = 2;

/// Predict accuracy, mean RT and RT variance from diffusion parameters.
///
/// The variance is clamped to `[VARIANCE_FLOOR, VARIANCE_CEILING]`.
pub fn predict(params: &DiffusionParams) -> EzResult<PredictedStats> {
    params.validate()?;

    let DiffusionParams {
        drift,
        boundary,
        nondecision,
    } = *params;

    let exponent = (-boundary * drift).exp();
    let response_rate = 1.0 / (1.0 + exponent);
    let mean_time =
        nondecision + (boundary.powi(2) / drift) * ((1.0 - exponent) / (1.0 + exponent));
    let variance_time = (boundary.powi(2) / drift.powi(3))
        * ((1.0 - 2.0 * boundary * drift * exponent - exponent.powi(2))
            / (1.0 + exponent).powi(2));

    let response_rate = ensure_finite("predicted response rate", response_rate)?;
    let mean_time = ensure_finite("predicted mean time", mean_time)?;
    let variance_time = ensure_finite("predicted variance", variance_time)?;

    Ok(PredictedStats::new(
        response_rate,
        mean_time,
        variance_time.clamp(VARIANCE_FLOOR, VARIANCE_CEILING),
    ))
}

/// Draw observed statistics for a sample of `sample_size` trials.
///
/// The three draws are independent and taken from `rng` in the order
/// binomial (correct responses), normal (mean RT), gamma (RT variance).
/// The observed variance is floored at `VARIANCE_FLOOR`.
pub fn observe<R: Rng + ?Sized>(
    predicted: &PredictedStats,
    sample_size: u64,
    rng: &mut R,
) -> EzResult<ObservedStats> {
    if sample_size < MIN_SAMPLE_SIZE {
        return Err(EzError::InvalidSampleSize {
            got: sample_size,
            min: MIN_SAMPLE_SIZE,
        });
    }
    if !predicted.mean_time.is_finite() {
        return Err(EzError::InvalidParameter {
            name: "mean_time",
            value: predicted.mean_time,
            reason: "must be finite",
        });
    }
    if !(predicted.variance_time > 0.0 && predicted.variance_time.is_finite()) {
        return Err(EzError::InvalidParameter {
            name: "variance_time",
            value: predicted.variance_time,
            reason: "must be finite and > 0",
        });
    }

    let n = sample_size as f64;

    let binomial = Binomial::new(sample_size, predicted.response_rate).map_err(|err| {
        EzError::Distribution {
            distribution: "binomial",
            message: err.to_string(),
        }
    })?;
    let successes = binomial.sample(rng);
    let response_rate = successes as f64 / n;

    let normal = Normal::new(predicted.mean_time, (predicted.variance_time / n).sqrt())
        .map_err(|err| EzError::Distribution {
            distribution: "normal",
            message: err.to_string(),
        })?;
    let mean_time = normal.sample(rng);

    let shape = (n - 1.0) / 2.0;
    let scale = 2.0 * predicted.variance_time / (n - 1.0);
    let gamma = Gamma::new(shape, scale).map_err(|err| EzError::Distribution {
        distribution: "gamma",
        message: err.to_string(),
    })?;
    let variance_time = gamma.sample(rng).max(VARIANCE_FLOOR);

    Ok(ObservedStats::new(
        response_rate,
        ensure_finite("observed mean time", mean_time)?,
        ensure_finite("observed variance", variance_time)?,
    ))
}
