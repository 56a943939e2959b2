use burn::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Draws latent vectors from a standard normal distribution.
///
/// Every call is an independent draw; nothing is cached.
pub struct LatentSampler {
    latent_dim: usize,
    rng: StdRng,
}

impl LatentSampler {
    pub fn new(latent_dim: usize, seed: u64) -> Self {
        LatentSampler {
            latent_dim,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sample a `[batch_size, latent_dim]` tensor on `device`.
    pub fn sample<B: Backend>(&mut self, batch_size: usize, device: &B::Device) -> Tensor<B, 2> {
        let values: Vec<f32> = (0..batch_size * self.latent_dim)
            .map(|_| self.rng.sample(StandardNormal))
            .collect();
        Tensor::from_data(TensorData::new(values, [batch_size, self.latent_dim]), device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_sample_shape() {
        let mut sampler = LatentSampler::new(100, 0);
        let z = sampler.sample::<TestBackend>(7, &Default::default());
        assert_eq!(z.dims(), [7, 100]);
    }

    #[test]
    fn test_consecutive_draws_differ() {
        let device = Default::default();
        let mut sampler = LatentSampler::new(16, 3);
        let a: Vec<f32> = sampler.sample::<TestBackend>(2, &device).into_data().to_vec().unwrap();
        let b: Vec<f32> = sampler.sample::<TestBackend>(2, &device).into_data().to_vec().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_seed_reproduces_draws() {
        let device = Default::default();
        let a: Vec<f32> = LatentSampler::new(8, 11)
            .sample::<TestBackend>(4, &device)
            .into_data()
            .to_vec()
            .unwrap();
        let b: Vec<f32> = LatentSampler::new(8, 11)
            .sample::<TestBackend>(4, &device)
            .into_data()
            .to_vec()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draws_look_standard_normal() {
        let mut sampler = LatentSampler::new(100, 5);
        let values: Vec<f32> = sampler
            .sample::<TestBackend>(100, &Default::default())
            .into_data()
            .to_vec()
            .unwrap();
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance {var}");
    }
}
