//! DCGAN generator and discriminator networks.

mod discriminator;
mod generator;

pub use discriminator::{Discriminator, DiscriminatorBlock, DiscriminatorConfig};
pub use generator::{Generator, GeneratorConfig};

use burn::nn::Initializer;

/// Image geometry shared by both networks.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub img_size: usize,
    pub channels: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            img_size: 32,
            channels: 1,
        }
    }
}

impl ModelConfig {
    pub fn generator(&self, latent_dim: usize) -> GeneratorConfig {
        GeneratorConfig::new(latent_dim, self.img_size, self.channels)
    }

    pub fn discriminator(&self) -> DiscriminatorConfig {
        DiscriminatorConfig::new(self.img_size, self.channels)
    }
}

/// Convolution weights start from N(0, 0.02).
fn conv_initializer() -> Initializer {
    Initializer::Normal {
        mean: 0.0,
        std: 0.02,
    }
}
