use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use burn::module::AutodiffModule;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use tracing::{debug, info};

use crate::checkpoint::{
    CheckpointHyperparameters, CheckpointLosses, CheckpointManager, CheckpointManagerConfig,
    CheckpointMetadata, CheckpointTag,
};
use crate::data::{Prefetcher, RealBatch, SampleSource};
use crate::error::TrainingError;
use crate::imaging::{self, GRID_SAMPLES};
use crate::model::ModelConfig;
use crate::training::gan::{AdamSettings, Adversaries, SyntheticBatch};
use crate::training::latent::LatentSampler;
use crate::training::loss::AdversarialLabels;
use crate::training::metrics::LossMetrics;
use crate::training::schedule::{GlobalStep, Schedule};

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub lr: f64,
    pub b1: f64,
    pub b2: f64,
    pub latent_dim: usize,
    /// Generator update period, in batches.
    pub n_critic: usize,
    /// Image dump period, in global steps.
    pub sample_interval: usize,
    /// Checkpoint period, in global steps.
    pub checkpoint_interval: usize,
    pub seed: u64,
    pub images_dir: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            epochs: 200,
            batch_size: 64,
            lr: 2e-4,
            b1: 0.5,
            b2: 0.999,
            latent_dim: 100,
            n_critic: 1,
            sample_interval: 400,
            checkpoint_interval: 2000,
            seed: 42,
            images_dir: PathBuf::from("images"),
        }
    }
}

impl TrainerConfig {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            n_critic: self.n_critic,
            sample_interval: self.sample_interval,
            checkpoint_interval: self.checkpoint_interval,
        }
    }

    fn adam(&self) -> AdamSettings {
        AdamSettings {
            lr: self.lr,
            b1: self.b1,
            b2: self.b2,
        }
    }
}

/// What a training run did, in order.
#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    /// Batches processed across all epochs.
    pub global_steps: usize,
    /// `(epoch, batch_index)` of every generator update.
    pub generator_updates: Vec<(usize, usize)>,
    /// `(global_step, path)` of every sample grid written.
    pub images: Vec<(usize, PathBuf)>,
    /// `(global_step, tag)` of every periodic checkpoint.
    pub checkpoints: Vec<(usize, CheckpointTag)>,
    pub final_checkpoint: PathBuf,
}

/// Outcome of the per-batch adversarial work.
struct Iteration<B: AutodiffBackend> {
    synthetic: SyntheticBatch<B>,
    d_loss: f32,
    g_loss: Option<f32>,
}

/// Adversarial trainer: alternates discriminator and generator updates over
/// the batches of a [`SampleSource`].
pub struct Trainer {
    config: TrainerConfig,
    model: ModelConfig,
    prefetch: usize,
    checkpoint_manager: CheckpointManager,
}

impl Trainer {
    /// Create the trainer, creating the image and checkpoint directories if needed.
    pub fn new(
        config: TrainerConfig,
        model: ModelConfig,
        checkpoint: CheckpointManagerConfig,
        prefetch: usize,
    ) -> Result<Self, TrainingError> {
        std::fs::create_dir_all(&config.images_dir)?;
        let checkpoint_manager = CheckpointManager::new(checkpoint)?;
        Ok(Trainer {
            config,
            model,
            prefetch,
            checkpoint_manager,
        })
    }

    /// Run the full training loop on `device`.
    pub fn train<B, S>(
        &self,
        source: &mut S,
        device: &B::Device,
    ) -> Result<TrainingReport, TrainingError>
    where
        B: AutodiffBackend,
        S: SampleSource,
    {
        let expected = [self.model.channels, self.model.img_size, self.model.img_size];
        let found = source.sample_shape();
        if found != expected {
            return Err(TrainingError::SampleShape { expected, found });
        }

        B::seed(self.config.seed);
        let mut adversaries = Adversaries::<B>::new(
            &self.model.generator(self.config.latent_dim),
            &self.model.discriminator(),
            self.config.adam(),
            device,
        );
        let mut latent = LatentSampler::new(self.config.latent_dim, self.config.seed);
        let schedule = self.config.schedule();
        let mut step = GlobalStep::default();
        let mut report = TrainingReport::default();

        let epochs = self.config.epochs;
        let num_batches = source.num_batches();
        let generator_updates = schedule.generator_updates_per_epoch(num_batches);
        let mut metrics = LossMetrics::with_capacity(num_batches.max(1));
        info!(
            "Starting training for {} epochs, {} batches per epoch",
            epochs, num_batches
        );

        for epoch in 0..epochs {
            let batches = Prefetcher::new(source.epoch(epoch), self.prefetch);

            for (batch_index, batch) in batches.enumerate() {
                let generator_turn = schedule.updates_generator(batch_index);
                let iteration =
                    Self::adversarial_step(&mut adversaries, &mut latent, batch, generator_turn, device);

                metrics.record_step(iteration.d_loss, iteration.g_loss);
                if iteration.g_loss.is_some() {
                    report.generator_updates.push((epoch, batch_index));
                }

                info!(
                    "[Epoch {}/{}] [Batch {}/{}] [D loss: {:.6}] [G loss: {}]",
                    epoch,
                    epochs,
                    batch_index,
                    num_batches,
                    iteration.d_loss,
                    metrics.generator_loss()
                );

                let global_step = step.get();
                if schedule.samples_at(global_step) {
                    let path = self.save_samples(&iteration.synthetic, global_step)?;
                    report.images.push((global_step, path));
                }

                if schedule.checkpoints_at(global_step) {
                    let tag = CheckpointTag::Epoch(epoch);
                    let metadata = self.metadata(tag, epoch, global_step, &metrics);
                    let path = self
                        .checkpoint_manager
                        .save_generator(&adversaries.generator().valid(), &metadata)?;
                    debug!("checkpoint saved: {}", path.display());
                    report.checkpoints.push((global_step, tag));
                }

                step.advance();
            }

            info!(
                "Epoch {} finished: avg D loss {:.4} over {} batches, avg G loss {:.4} over {} updates",
                epoch,
                metrics.average_discriminator_loss(num_batches),
                num_batches,
                metrics.average_generator_loss(generator_updates),
                generator_updates,
            );
        }

        let metadata = self.metadata(
            CheckpointTag::Done,
            epochs.saturating_sub(1),
            step.get(),
            &metrics,
        );
        report.final_checkpoint = self
            .checkpoint_manager
            .save_generator(&adversaries.generator().valid(), &metadata)?;
        report.global_steps = step.get();

        info!(
            "Training complete after {} steps, final generator saved to {}",
            report.global_steps,
            report.final_checkpoint.display()
        );
        Ok(report)
    }

    /// Labels, fresh latent draw, one generator forward pass, the
    /// discriminator update and, on its turn, the generator update.
    fn adversarial_step<B: AutodiffBackend>(
        adversaries: &mut Adversaries<B>,
        latent: &mut LatentSampler,
        batch: RealBatch,
        generator_turn: bool,
        device: &B::Device,
    ) -> Iteration<B> {
        let batch_size = batch.len();
        let labels = AdversarialLabels::new(batch_size, device);
        let real = batch.to_tensor::<B>(device);

        let synthetic = adversaries.synthesize(latent.sample(batch_size, device));

        let d_loss = adversaries.update_discriminator(real, &synthetic, &labels);
        let g_loss = generator_turn.then(|| adversaries.update_generator(&synthetic, &labels));

        Iteration {
            synthetic,
            d_loss,
            g_loss,
        }
    }

    fn save_samples<B: AutodiffBackend>(
        &self,
        synthetic: &SyntheticBatch<B>,
        global_step: usize,
    ) -> Result<PathBuf, TrainingError> {
        let count = synthetic.batch_size().min(GRID_SAMPLES);
        let images = synthetic.value().slice([0..count]);
        let shape: [usize; 4] = images.dims();
        let values: Vec<f32> = images
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| TrainingError::TensorData(format!("{e:?}")))?;

        let path = self.config.images_dir.join(format!("{global_step}.png"));
        imaging::save_sample_grid(&values, shape, &path)?;
        debug!("sample grid saved: {}", path.display());
        Ok(path)
    }

    fn metadata(
        &self,
        tag: CheckpointTag,
        epoch: usize,
        global_step: usize,
        metrics: &LossMetrics,
    ) -> CheckpointMetadata {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        CheckpointMetadata {
            tag,
            epoch,
            global_step,
            timestamp,
            generator: self.model.generator(self.config.latent_dim),
            losses: CheckpointLosses::new(
                metrics.last_discriminator_loss(),
                metrics.generator_loss().value(),
            ),
            hyperparameters: CheckpointHyperparameters {
                lr: self.config.lr,
                b1: self.config.b1,
                b2: self.config.b2,
                batch_size: self.config.batch_size,
                n_critic: self.config.n_critic,
                seed: self.config.seed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemorySource;
    use burn::backend::{Autodiff, NdArray};
    use std::path::Path;

    type TestBackend = Autodiff<NdArray<f32>>;

    const IMG_SIZE: usize = 16;

    fn source(samples: usize, batch_size: usize) -> InMemorySource {
        let len = samples * IMG_SIZE * IMG_SIZE;
        let values = (0..len).map(|i| ((i % 17) as f32 / 8.0) - 1.0).collect();
        InMemorySource::new(values, [1, IMG_SIZE, IMG_SIZE], batch_size, false, 0).unwrap()
    }

    fn trainer(dir: &Path, config: TrainerConfig) -> Trainer {
        Trainer::new(
            TrainerConfig {
                images_dir: dir.join("images"),
                latent_dim: 4,
                ..config
            },
            ModelConfig {
                img_size: IMG_SIZE,
                channels: 1,
            },
            CheckpointManagerConfig {
                checkpoint_dir: dir.join("checkpoints"),
            },
            2,
        )
        .unwrap()
    }

    fn sorted_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_generator_updates_follow_n_critic() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(
            dir.path(),
            TrainerConfig {
                epochs: 1,
                batch_size: 8,
                n_critic: 2,
                sample_interval: 100,
                checkpoint_interval: 100,
                ..Default::default()
            },
        );

        let report = trainer
            .train::<TestBackend, _>(&mut source(32, 8), &Default::default())
            .unwrap();
        assert_eq!(report.global_steps, 4);
        assert_eq!(report.generator_updates, vec![(0, 0), (0, 2)]);
    }

    #[test]
    fn test_sample_images_at_interval() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(
            dir.path(),
            TrainerConfig {
                epochs: 2,
                batch_size: 2,
                sample_interval: 5,
                checkpoint_interval: 100,
                ..Default::default()
            },
        );

        let report = trainer
            .train::<TestBackend, _>(&mut source(10, 2), &Default::default())
            .unwrap();
        assert_eq!(report.global_steps, 10);
        let steps: Vec<usize> = report.images.iter().map(|(s, _)| *s).collect();
        assert_eq!(steps, vec![0, 5]);
        assert_eq!(sorted_files(&dir.path().join("images")), vec!["0.png", "5.png"]);
    }

    #[test]
    fn test_checkpoints_tagged_with_active_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(
            dir.path(),
            TrainerConfig {
                epochs: 7,
                batch_size: 2,
                sample_interval: 100,
                checkpoint_interval: 3,
                ..Default::default()
            },
        );

        let report = trainer
            .train::<TestBackend, _>(&mut source(2, 2), &Default::default())
            .unwrap();
        assert_eq!(report.global_steps, 7);
        assert_eq!(
            report.checkpoints,
            vec![
                (0, CheckpointTag::Epoch(0)),
                (3, CheckpointTag::Epoch(3)),
                (6, CheckpointTag::Epoch(6)),
            ]
        );
        assert_eq!(
            report.final_checkpoint,
            dir.path().join("checkpoints").join("generator_done.mpk")
        );

        let weights: Vec<String> = sorted_files(&dir.path().join("checkpoints"))
            .into_iter()
            .filter(|n| n.ends_with(".mpk"))
            .collect();
        assert_eq!(
            weights,
            vec![
                "generator_0.mpk",
                "generator_3.mpk",
                "generator_6.mpk",
                "generator_done.mpk"
            ]
        );
    }

    #[test]
    fn test_checkpoints_within_one_epoch_share_its_tag() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(
            dir.path(),
            TrainerConfig {
                epochs: 1,
                batch_size: 1,
                sample_interval: 100,
                checkpoint_interval: 3,
                ..Default::default()
            },
        );

        let report = trainer
            .train::<TestBackend, _>(&mut source(7, 1), &Default::default())
            .unwrap();
        assert_eq!(
            report.checkpoints,
            vec![
                (0, CheckpointTag::Epoch(0)),
                (3, CheckpointTag::Epoch(0)),
                (6, CheckpointTag::Epoch(0)),
            ]
        );

        let manager = CheckpointManager::new(CheckpointManagerConfig {
            checkpoint_dir: dir.path().join("checkpoints"),
        })
        .unwrap();
        let meta = manager.load_metadata(CheckpointTag::Epoch(0)).unwrap();
        assert_eq!(meta.global_step, 6);
        let done = manager.load_metadata(CheckpointTag::Done).unwrap();
        assert_eq!(done.global_step, 7);
    }

    #[test]
    fn test_short_last_batch() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(
            dir.path(),
            TrainerConfig {
                epochs: 1,
                batch_size: 4,
                sample_interval: 1,
                checkpoint_interval: 100,
                ..Default::default()
            },
        );

        let report = trainer
            .train::<TestBackend, _>(&mut source(5, 4), &Default::default())
            .unwrap();
        assert_eq!(report.global_steps, 2);
        assert_eq!(report.images.len(), 2);
    }

    #[test]
    fn test_rejects_source_of_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(dir.path(), TrainerConfig::default());
        let mut source = InMemorySource::new(vec![0.0; 8 * 8 * 2], [1, 8, 8], 1, false, 0).unwrap();

        let err = trainer
            .train::<TestBackend, _>(&mut source, &Default::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::SampleShape {
                expected: [1, 16, 16],
                found: [1, 8, 8],
            }
        ));
        assert!(sorted_files(&dir.path().join("checkpoints")).is_empty());
    }

    #[test]
    fn test_final_generator_loads_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer(
            dir.path(),
            TrainerConfig {
                epochs: 2,
                batch_size: 4,
                sample_interval: 100,
                checkpoint_interval: 100,
                ..Default::default()
            },
        );
        trainer
            .train::<TestBackend, _>(&mut source(8, 4), &Default::default())
            .unwrap();

        let manager = CheckpointManager::new(CheckpointManagerConfig {
            checkpoint_dir: dir.path().join("checkpoints"),
        })
        .unwrap();
        assert_eq!(manager.latest().unwrap(), CheckpointTag::Done);

        let device = Default::default();
        let (generator, meta) = manager
            .load_generator::<NdArray<f32>>(CheckpointTag::Done, &device)
            .unwrap();
        assert_eq!(meta.epoch, 1);
        assert_eq!(meta.global_step, 4);
        assert_eq!(meta.hyperparameters.batch_size, 4);

        let latent = LatentSampler::new(4, 0).sample::<NdArray<f32>>(3, &device);
        let images = generator.forward(latent);
        assert_eq!(images.dims(), [3, 1, IMG_SIZE, IMG_SIZE]);
        let values: Vec<f32> = images.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v)));
    }
}
