//! Adversarial training: loss and labels, latent sampling, the paired
//! discriminator/generator updates, scheduling, loss metrics and the
//! epoch/batch orchestrator.

pub mod gan;
pub mod latent;
pub mod loss;
pub mod metrics;
pub mod schedule;
pub mod trainer;

pub use gan::{AdamSettings, Adversaries, SyntheticBatch};
pub use loss::{adversarial_loss, AdversarialLabels};
pub use trainer::{Trainer, TrainerConfig, TrainingReport};
