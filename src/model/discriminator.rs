use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{
    Dropout, DropoutConfig, LeakyRelu, LeakyReluConfig, Linear, LinearConfig, PaddingConfig2d,
};
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

use super::conv_initializer;

/// Stride-2 downsampling block: Conv 3x3, LeakyReLU(0.2), Dropout(0.25).
#[derive(Module, Debug)]
pub struct DiscriminatorBlock<B: Backend> {
    conv: Conv2d<B>,
    lrelu: LeakyRelu,
    dropout: Dropout,
}

impl<B: Backend> DiscriminatorBlock<B> {
    fn new(channels: [usize; 2], device: &B::Device) -> Self {
        DiscriminatorBlock {
            conv: Conv2dConfig::new(channels, [3, 3])
                .with_stride([2, 2])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .with_initializer(conv_initializer())
                .init(device),
            lrelu: LeakyReluConfig::new().with_negative_slope(0.2).init(),
            dropout: DropoutConfig::new(0.25).init(),
        }
    }

    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.dropout.forward(self.lrelu.forward(self.conv.forward(input)))
    }
}

/// DCGAN discriminator.
///
/// ```text
/// Input:  [batch, channels, img_size, img_size]
/// 4 x DiscriminatorBlock: channels -> 16 -> 32 -> 64 -> 128, each halving H and W
/// Flatten: 128 * (img_size / 16)^2
/// FC:     -> 1, Sigmoid  =>  [batch, 1] realness probability
/// ```
///
/// Holds no running statistics, so its state is exactly its trainable parameters.
#[derive(Module, Debug)]
pub struct Discriminator<B: Backend> {
    blocks: Vec<DiscriminatorBlock<B>>,
    fc: Linear<B>,
    features: usize,
}

#[derive(Config, Debug)]
pub struct DiscriminatorConfig {
    pub img_size: usize,
    pub channels: usize,
}

impl DiscriminatorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Discriminator<B> {
        let widths = [self.channels, 16, 32, 64, 128];
        let blocks = widths
            .windows(2)
            .map(|pair| DiscriminatorBlock::new([pair[0], pair[1]], device))
            .collect();

        let ds_size = self.img_size / 16;
        let features = 128 * ds_size * ds_size;

        Discriminator {
            blocks,
            fc: LinearConfig::new(features, 1).init(device),
            features,
        }
    }
}

impl<B: Backend> Discriminator<B> {
    /// Forward pass: images [batch, channels, img_size, img_size] -> probabilities [batch, 1].
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let batch_size = images.dims()[0];

        let x = self
            .blocks
            .iter()
            .fold(images, |x, block| block.forward(x));
        let x = x.reshape([batch_size, self.features]);
        sigmoid(self.fc.forward(x))
    }
}
