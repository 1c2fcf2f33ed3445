//! Inverse EZ-diffusion model
//!
//! Closed-form recovery of drift, boundary and non-decision time from
//! observed summary statistics. Pure: no randomness, no side effects.

use serde::{Deserialize, Serialize};

use crate::params::DiffusionParams;
use crate::stats::ObservedStats;
use crate::{ensure_finite, EzError, EzResult};

/// Observed response rates are clamped to `[RATE_EPSILON, 1 - RATE_EPSILON]`
/// so the logit stays finite.
pub const RATE_EPSILON: f64 = 1e-8;

/// Multiplier applied to the drift term before the square root.
pub const DRIFT_SCALE: f64 = 1.7857;

/// Upper clamp on the scaled drift term.
pub const SCALED_TERM_MAX: f64 = 2.0;

/// Recovered drift magnitudes below this are replaced by it.
pub const DRIFT_FLOOR: f64 = 1e-8;

/// Clamp windows applied to recovered boundary and non-decision time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryBounds {
    pub boundary: (f64, f64),
    pub nondecision: (f64, f64),
}

impl Default for RecoveryBounds {
    fn default() -> Self {
        Self {
            boundary: (0.95, 1.05),
            nondecision: (0.28, 0.32),
        }
    }
}

impl RecoveryBounds {
    pub fn validate(&self) -> EzResult<()> {
        for (name, (lo, hi)) in [
            ("boundary", self.boundary),
            ("nondecision", self.nondecision),
        ] {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(EzError::InvalidConfig(format!(
                    "{name} recovery bounds must be finite with lo <= hi, got [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }
}

/// Recover parameters with the default clamp windows.
pub fn recover(observed: &ObservedStats, scaling: f64) -> EzResult<DiffusionParams> {
    recover_with_bounds(observed, scaling, &RecoveryBounds::default())
}

/// Recover parameters, clamping boundary and non-decision time to `bounds`.
///
/// # Errors
/// * `DegenerateObservation` if the observed variance is not strictly positive
/// * `NonFinite` if the observed mean time or any estimate is not finite
/// * `InvalidParameter` for a non-positive or non-finite `scaling`
pub fn recover_with_bounds(
    observed: &ObservedStats,
    scaling: f64,
    bounds: &RecoveryBounds,
) -> EzResult<DiffusionParams> {
    if !(scaling > 0.0 && scaling.is_finite()) {
        return Err(EzError::InvalidParameter {
            name: "scaling",
            value: scaling,
            reason: "must be finite and > 0",
        });
    }
    bounds.validate()?;

    let variance = observed.variance_time;
    if !(variance > 0.0) {
        return Err(EzError::DegenerateObservation { variance });
    }
    let variance = ensure_finite("observed variance", variance)?;
    let mean_time = ensure_finite("observed mean time", observed.mean_time)?;
    let rate = ensure_finite("observed response rate", observed.response_rate)?
        .clamp(RATE_EPSILON, 1.0 - RATE_EPSILON);

    let logit = (rate / (1.0 - rate)).ln();
    let term = 2.0 * logit * (rate.powi(2) - rate) / variance;
    let scaled_term = (DRIFT_SCALE * term.abs()).clamp(0.0, SCALED_TERM_MAX);

    let mut drift = sign(rate - 0.5) * scaled_term.sqrt();
    // Sign is lost here for tiny negative drifts.
    if drift.abs() < DRIFT_FLOOR {
        drift = DRIFT_FLOOR;
    }

    let boundary = (scaling * 2.0 * logit / drift)
        .abs()
        .clamp(bounds.boundary.0, bounds.boundary.1);
    let exp_term = (-drift * boundary).exp();
    let nondecision = (mean_time
        - (boundary.powi(2) / drift) * ((1.0 - exp_term) / (1.0 + exp_term)))
        .clamp(bounds.nondecision.0, bounds.nondecision.1);

    Ok(DiffusionParams::new(
        ensure_finite("recovered drift", drift)?,
        ensure_finite("recovered boundary", boundary)?,
        ensure_finite("recovered nondecision", nondecision)?,
    ))
}

/// Sign with `sign(0) == 0`, unlike `f64::signum`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
