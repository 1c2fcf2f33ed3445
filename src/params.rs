//! Diffusion parameters
//!
//! The three latent parameters of the EZ-diffusion model and the uniform
//! ranges that true parameters are sampled from during recovery runs.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{EzError, EzResult};

/// Parameters of the diffusion process
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionParams {
    /// Drift rate (speed of evidence accumulation)
    pub drift: f64,
    /// Boundary separation
    pub boundary: f64,
    /// Non-decision time (encoding + motor latency)
    pub nondecision: f64,
}

impl DiffusionParams {
    /// Create a new parameter set
    pub fn new(drift: f64, boundary: f64, nondecision: f64) -> Self {
        Self {
            drift,
            boundary,
            nondecision,
        }
    }

    /// Check the preconditions of the forward model.
    ///
    /// These are never clamped: a zero drift or a non-positive boundary does
    /// not describe a diffusion process.
    pub fn validate(&self) -> EzResult<()> {
        for (name, value) in self.named() {
            if !value.is_finite() {
                return Err(EzError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }
        if self.drift == 0.0 {
            return Err(EzError::InvalidParameter {
                name: "drift",
                value: self.drift,
                reason: "must be non-zero",
            });
        }
        if self.boundary <= 0.0 {
            return Err(EzError::InvalidParameter {
                name: "boundary",
                value: self.boundary,
                reason: "must be > 0",
            });
        }
        if self.nondecision < 0.0 {
            return Err(EzError::InvalidParameter {
                name: "nondecision",
                value: self.nondecision,
                reason: "must be >= 0",
            });
        }
        Ok(())
    }

    /// Components in `[drift, boundary, nondecision]` order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.drift, self.boundary, self.nondecision]
    }

    fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("drift", self.drift),
            ("boundary", self.boundary),
            ("nondecision", self.nondecision),
        ]
    }
}

/// Half-open `[lo, hi)` sampling ranges for true parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRanges {
    pub drift: (f64, f64),
    pub boundary: (f64, f64),
    pub nondecision: (f64, f64),
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            drift: (0.5, 2.0),
            boundary: (0.5, 2.0),
            nondecision: (0.1, 0.5),
        }
    }
}

impl ParameterRanges {
    pub fn validate(&self) -> EzResult<()> {
        for (name, (lo, hi)) in [
            ("drift", self.drift),
            ("boundary", self.boundary),
            ("nondecision", self.nondecision),
        ] {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(EzError::InvalidConfig(format!(
                    "{name} range bounds must be finite"
                )));
            }
            if lo >= hi {
                return Err(EzError::InvalidConfig(format!(
                    "{name} range must satisfy lo < hi, got [{lo}, {hi})"
                )));
            }
        }

        // Every sampled set has to pass DiffusionParams::validate.
        if self.drift.0 <= 0.0 {
            return Err(EzError::InvalidConfig(
                "drift range must be strictly positive".to_string(),
            ));
        }
        if self.boundary.0 <= 0.0 {
            return Err(EzError::InvalidConfig(
                "boundary range must be strictly positive".to_string(),
            ));
        }
        if self.nondecision.0 < 0.0 {
            return Err(EzError::InvalidConfig(
                "nondecision range must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Draw one true parameter set.
    ///
    /// Draw order is boundary, drift, nondecision. Exactly three values are
    /// consumed from `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiffusionParams {
        let boundary = rng.gen_range(self.boundary.0..self.boundary.1);
        let drift = rng.gen_range(self.drift.0..self.drift.1);
        let nondecision = rng.gen_range(self.nondecision.0..self.nondecision.1);
        DiffusionParams::new(drift, boundary, nondecision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_drift_rejected() {
        let err = DiffusionParams::new(0.0, 1.0, 0.3).validate().unwrap_err();
        assert!(matches!(
            err,
            EzError::InvalidParameter { name: "drift", .. }
        ));
    }

    #[test]
    fn test_negative_drift_allowed() {
        assert!(DiffusionParams::new(-1.0, 1.0, 0.3).validate().is_ok());
    }

    #[test]
    fn test_bad_boundary_and_nondecision_rejected() {
        assert!(DiffusionParams::new(1.0, -0.5, 0.3).validate().is_err());
        assert!(DiffusionParams::new(1.0, 0.0, 0.3).validate().is_err());
        assert!(DiffusionParams::new(1.0, 1.0, -0.1).validate().is_err());
        assert!(DiffusionParams::new(f64::NAN, 1.0, 0.3).validate().is_err());
    }

    #[test]
    fn test_samples_stay_in_range() {
        let ranges = ParameterRanges::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let p = ranges.sample(&mut rng);
            assert!((0.5..2.0).contains(&p.drift));
            assert!((0.5..2.0).contains(&p.boundary));
            assert!((0.1..0.5).contains(&p.nondecision));
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn test_range_validation() {
        assert!(ParameterRanges::default().validate().is_ok());

        let inverted = ParameterRanges {
            drift: (2.0, 0.5),
            ..ParameterRanges::default()
        };
        assert!(inverted.validate().is_err());

        let zero_drift = ParameterRanges {
            drift: (0.0, 1.0),
            ..ParameterRanges::default()
        };
        assert!(zero_drift.validate().is_err());
    }
}
