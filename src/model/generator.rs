use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::interpolate::{Interpolate2d, Interpolate2dConfig, InterpolateMode};
use burn::nn::{
    BatchNorm, BatchNormConfig, LeakyRelu, LeakyReluConfig, Linear, LinearConfig,
    PaddingConfig2d,
};
use burn::prelude::*;
use burn::tensor::activation::tanh;

use super::conv_initializer;

/// DCGAN generator.
///
/// ```text
/// Input:   [batch, latent_dim]
/// FC:      latent_dim -> 128 * s * s   (s = img_size / 4)
/// Reshape: [batch, 128, s, s], BatchNorm
/// Up x2, Conv 128 -> 128 (3x3), BatchNorm, LeakyReLU(0.2)
/// Up x2, Conv 128 -> 64  (3x3), BatchNorm, LeakyReLU(0.2)
/// Conv 64 -> channels (3x3), Tanh   =>  [batch, channels, img_size, img_size]
/// ```
#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    fc: Linear<B>,
    bn0: BatchNorm<B, 2>,
    upsample: Interpolate2d,
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    conv_out: Conv2d<B>,
    lrelu: LeakyRelu,
    init_size: usize,
}

#[derive(Config, Debug)]
pub struct GeneratorConfig {
    pub latent_dim: usize,
    pub img_size: usize,
    pub channels: usize,
}

impl GeneratorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let init_size = self.img_size / 4;
        let conv = |channels: [usize; 2]| {
            Conv2dConfig::new(channels, [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .with_initializer(conv_initializer())
                .init(device)
        };

        Generator {
            fc: LinearConfig::new(self.latent_dim, 128 * init_size * init_size).init(device),
            bn0: BatchNormConfig::new(128).init(device),
            upsample: Interpolate2dConfig::new()
                .with_scale_factor(Some([2.0, 2.0]))
                .with_mode(InterpolateMode::Nearest)
                .init(),
            conv1: conv([128, 128]),
            bn1: BatchNormConfig::new(128).init(device),
            conv2: conv([128, 64]),
            bn2: BatchNormConfig::new(64).init(device),
            conv_out: conv([64, self.channels]),
            lrelu: LeakyReluConfig::new().with_negative_slope(0.2).init(),
            init_size,
        }
    }
}

impl<B: Backend> Generator<B> {
    /// Forward pass: latent [batch, latent_dim] -> images [batch, channels, img_size, img_size]
    /// with values in [-1, 1].
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 4> {
        let batch_size = latent.dims()[0];
        let s = self.init_size;

        let x = self.fc.forward(latent).reshape([batch_size, 128, s, s]);
        let x = self.bn0.forward(x);

        let x = self.upsample.forward(x);
        let x = self.lrelu.forward(self.bn1.forward(self.conv1.forward(x)));

        let x = self.upsample.forward(x);
        let x = self.lrelu.forward(self.bn2.forward(self.conv2.forward(x)));

        tanh(self.conv_out.forward(x))
    }
}
