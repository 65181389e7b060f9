use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::errors::SensorError;

/// Functionality to add some Gaussian noise.
#[derive(Clone, Debug)]
pub(super) struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Creates new distribution from mean and stdev
    pub(super) fn new(mean: f64, stdev: f64) -> Result<Self, SensorError> {
        let normal = Normal::new(mean, stdev)
            .map_err(|e| SensorError::InvalidConfig(format!("Gaussian noise: {}", e)))?;
        Ok(Self { normal })
    }

    /// Sample from distribution
    pub(super) fn draw_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.normal.sample(rng)
    }

    /// Adds noise to sample
    pub(super) fn add_noise<R: Rng + ?Sized>(&self, rng: &mut R, data: f64) -> f64 {
        data + self.draw_sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_gaussian_new() {
        let mean = 0.0;
        let stdev = 1.0;
        let noise = GaussianNoise::new(mean, stdev).unwrap();
        assert_eq!(noise.normal.mean(), mean);
        assert_eq!(noise.normal.std_dev(), stdev);
    }

    #[test]
    fn test_gaussian_invalid_stdev() {
        assert!(matches!(
            GaussianNoise::new(0.0, f64::NAN),
            Err(SensorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_add_noise_zero_stdev() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = GaussianNoise::new(0.0, 0.0).unwrap();
        assert_eq!(noise.add_noise(&mut rng, 5.0), 5.0);
    }

    #[test]
    fn test_add_noise() {
        let stdev = 1.0;
        let mut rng = StdRng::seed_from_u64(42);
        let noise = GaussianNoise::new(0.0, stdev).unwrap();
        let data = 5.0;
        for _ in 0..100 {
            let result = noise.add_noise(&mut rng, data);
            assert!(result >= data - 6.0 * stdev && result <= data + 6.0 * stdev);
        }
    }
}
