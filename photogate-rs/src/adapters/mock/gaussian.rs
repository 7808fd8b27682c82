use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::models::errors::PhotogateError;

/// Functionality to add some Gaussian noise.
#[derive(Clone, Debug)]
pub(super) struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Creates new distribution from mean and stdev.
    /// Returns an Other error unless `stdev` is finite and non-negative.
    pub(super) fn new(mean: f64, stdev: f64) -> Result<Self, PhotogateError> {
        if !(stdev.is_finite() && stdev >= 0.0) {
            return Err(PhotogateError::Other(format!(
                "Invalid timing noise: standard deviation {}",
                stdev
            )));
        }
        let normal = Normal::new(mean, stdev)
            .map_err(|e| PhotogateError::Other(format!("Invalid timing noise: {}", e)))?;
        Ok(Self { normal })
    }

    /// Sample from distribution
    pub(super) fn draw_sample(&self, rng: &mut StdRng) -> f64 {
        self.normal.sample(rng)
    }

    /// Adds noise to sample
    pub(super) fn add_noise(&self, rng: &mut StdRng, data: f64) -> f64 {
        data + self.draw_sample(rng)
    }
}
