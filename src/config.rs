//! Experiment configuration
//!
//! TOML-loadable sweep settings and the random streams derived from them.

use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::forward::MIN_SAMPLE_SIZE;
use crate::inverse::RecoveryBounds;
use crate::params::ParameterRanges;
use crate::sim::RecoveryConfig;
use crate::{EzError, EzResult};

pub const DEFAULT_SEED: u64 = 2026;
pub const DEFAULT_ITERATIONS: usize = 1000;

/// A full simulate-and-recover sweep, usually loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub sample_sizes: Vec<u64>,
    pub iterations: usize,
    /// `None` seeds every stream from OS entropy.
    pub seed: Option<u64>,
    pub scaling: f64,
    pub ranges: ParameterRanges,
    pub bounds: RecoveryBounds,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            sample_sizes: vec![10, 40, 4000],
            iterations: DEFAULT_ITERATIONS,
            seed: Some(DEFAULT_SEED),
            scaling: 1.0,
            ranges: ParameterRanges::default(),
            bounds: RecoveryBounds::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_file(path: &Path) -> EzResult<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> EzResult<Self> {
        let config: ExperimentConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EzResult<()> {
        if self.sample_sizes.is_empty() {
            return Err(EzError::InvalidConfig(
                "sample_sizes must be non-empty".to_string(),
            ));
        }
        if let Some(&n) = self.sample_sizes.iter().find(|&&n| n < MIN_SAMPLE_SIZE) {
            return Err(EzError::InvalidConfig(format!(
                "sample_sizes must all be >= {MIN_SAMPLE_SIZE}, got {n}"
            )));
        }
        if self.iterations == 0 {
            return Err(EzError::InvalidConfig(
                "iterations must be greater than zero".to_string(),
            ));
        }
        self.recovery_config().validate()
    }

    pub fn recovery_config(&self) -> RecoveryConfig {
        RecoveryConfig {
            ranges: self.ranges,
            bounds: self.bounds,
            scaling: self.scaling,
        }
    }

    /// Fresh random stream for one experiment.
    pub fn stream(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
