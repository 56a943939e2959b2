//! Adversarial loss and ground-truth labels.

use burn::prelude::*;

/// Lower bound applied to `p` and `1 - p` before taking the log.
pub const PROBABILITY_FLOOR: f32 = 1e-12;

/// Mean binary cross-entropy between predicted probabilities and binary targets.
///
/// Both `p` and `1 - p` are clamped to [`PROBABILITY_FLOOR`] so saturated
/// predictions yield a finite loss and finite gradients.
pub fn adversarial_loss<B: Backend>(predicted: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    let log_p = predicted.clone().clamp_min(PROBABILITY_FLOOR).log();
    let log_not_p = predicted.neg().add_scalar(1.0).clamp_min(PROBABILITY_FLOOR).log();

    let per_sample = target.clone() * log_p + target.neg().add_scalar(1.0) * log_not_p;
    per_sample.neg().mean()
}

/// Constant `valid` (ones) and `fake` (zeros) targets for one batch.
#[derive(Debug, Clone)]
pub struct AdversarialLabels<B: Backend> {
    pub valid: Tensor<B, 2>,
    pub fake: Tensor<B, 2>,
}

impl<B: Backend> AdversarialLabels<B> {
    /// Labels shaped `[batch_size, 1]`. Never tracked by autodiff.
    pub fn new(batch_size: usize, device: &B::Device) -> Self {
        AdversarialLabels {
            valid: Tensor::ones([batch_size, 1], device),
            fake: Tensor::zeros([batch_size, 1], device),
        }
    }
}
