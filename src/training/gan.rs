//! Generator/discriminator pair with their independent Adam optimizers and the
//! two alternating update steps.

use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;

use crate::model::{Discriminator, DiscriminatorConfig, Generator, GeneratorConfig};
use crate::training::loss::{adversarial_loss, AdversarialLabels};

/// Output of one generator forward pass, consumed by both update steps.
///
/// The images are produced once; [`detached`](Self::detached) and
/// [`attached`](Self::attached) are two views over that same value.
#[derive(Debug, Clone)]
pub struct SyntheticBatch<B: AutodiffBackend> {
    images: Tensor<B, 4>,
}

impl<B: AutodiffBackend> SyntheticBatch<B> {
    /// View severed from the generator graph, for the discriminator step.
    pub fn detached(&self) -> Tensor<B, 4> {
        self.images.clone().detach()
    }

    /// Differentiable view linked to the generator parameters, for the generator step.
    pub fn attached(&self) -> Tensor<B, 4> {
        self.images.clone()
    }

    /// Plain values with no gradient bookkeeping.
    pub fn value(&self) -> Tensor<B::InnerBackend, 4> {
        self.images.clone().inner()
    }

    pub fn batch_size(&self) -> usize {
        self.images.dims()[0]
    }
}

/// Adam hyperparameters shared by both optimizers.
#[derive(Debug, Clone, Copy)]
pub struct AdamSettings {
    pub lr: f64,
    pub b1: f64,
    pub b2: f64,
}

type GeneratorOptimizer<B> = OptimizerAdaptor<Adam, Generator<B>, B>;
type DiscriminatorOptimizer<B> = OptimizerAdaptor<Adam, Discriminator<B>, B>;

/// Both adversaries plus the optimizer that exclusively owns each one's updates.
pub struct Adversaries<B: AutodiffBackend> {
    generator: Generator<B>,
    discriminator: Discriminator<B>,
    generator_optim: GeneratorOptimizer<B>,
    discriminator_optim: DiscriminatorOptimizer<B>,
    lr: f64,
}

impl<B: AutodiffBackend> Adversaries<B> {
    pub fn new(
        generator: &GeneratorConfig,
        discriminator: &DiscriminatorConfig,
        adam: AdamSettings,
        device: &B::Device,
    ) -> Self {
        let optim = || {
            AdamConfig::new()
                .with_beta_1(adam.b1 as f32)
                .with_beta_2(adam.b2 as f32)
        };

        Adversaries {
            generator: generator.init(device),
            discriminator: discriminator.init(device),
            generator_optim: optim().init(),
            discriminator_optim: optim().init(),
            lr: adam.lr,
        }
    }

    pub fn generator(&self) -> &Generator<B> {
        &self.generator
    }

    pub fn discriminator(&self) -> &Discriminator<B> {
        &self.discriminator
    }

    /// Run the generator once on `latent`.
    pub fn synthesize(&self, latent: Tensor<B, 2>) -> SyntheticBatch<B> {
        SyntheticBatch {
            images: self.generator.forward(latent),
        }
    }

    /// One discriminator step on `(real + fake) / 2` BCE. Returns the loss.
    ///
    /// Gradients are collected for discriminator parameters only and the
    /// synthetic images enter through their detached view, so the generator is
    /// never touched.
    pub fn update_discriminator(
        &mut self,
        real: Tensor<B, 4>,
        synthetic: &SyntheticBatch<B>,
        labels: &AdversarialLabels<B>,
    ) -> f32 {
        let real_loss = adversarial_loss(self.discriminator.forward(real), labels.valid.clone());
        let fake_loss = adversarial_loss(
            self.discriminator.forward(synthetic.detached()),
            labels.fake.clone(),
        );
        let loss = (real_loss + fake_loss).div_scalar(2.0);
        let loss_val: f32 = loss.clone().into_scalar().elem();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.discriminator);
        self.discriminator =
            self.discriminator_optim
                .step(self.lr, self.discriminator.clone(), grads);

        loss_val
    }

    /// One generator step on BCE of the discriminator's response to the
    /// attached synthetic images against `valid`. Returns the loss.
    ///
    /// The loss flows through the discriminator, but only generator gradients
    /// are handed to an optimizer.
    pub fn update_generator(
        &mut self,
        synthetic: &SyntheticBatch<B>,
        labels: &AdversarialLabels<B>,
    ) -> f32 {
        let loss = adversarial_loss(
            self.discriminator.forward(synthetic.attached()),
            labels.valid.clone(),
        );
        let loss_val: f32 = loss.clone().into_scalar().elem();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.generator);
        self.generator = self
            .generator_optim
            .step(self.lr, self.generator.clone(), grads);

        loss_val
    }
}
