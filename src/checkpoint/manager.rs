use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn::record::DefaultRecorder;

use crate::checkpoint::metadata::{CheckpointMetadata, CheckpointTag};
use crate::error::CheckpointError;
use crate::model::{Generator, GeneratorConfig};

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
        }
    }
}

/// Saves, loads and lists generator checkpoints in one directory.
///
/// Each checkpoint is a weights file `generator_<tag>.mpk` plus a
/// `generator_<tag>.json` metadata sidecar. Saving under an existing tag
/// replaces both files.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    /// Create the manager, creating the checkpoint directory if needed.
    pub fn new(config: CheckpointManagerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(CheckpointManager { config })
    }

    /// Path of the weights file for `tag`.
    fn weights_path(&self, tag: CheckpointTag) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(tag.file_stem())
            .with_extension("mpk")
    }

    fn metadata_path(&self, tag: CheckpointTag) -> PathBuf {
        self.config
            .checkpoint_dir
            .join(tag.file_stem())
            .with_extension("json")
    }

    /// Write generator weights and metadata under `metadata.tag`. Returns the
    /// weights path.
    pub fn save_generator<B: Backend>(
        &self,
        generator: &Generator<B>,
        metadata: &CheckpointMetadata,
    ) -> Result<PathBuf, CheckpointError> {
        let tag = metadata.tag;
        let recorder = DefaultRecorder::default();
        generator
            .clone()
            .save_file(self.config.checkpoint_dir.join(tag.file_stem()), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;

        let meta_json = serde_json::to_string_pretty(metadata)?;
        fs::write(self.metadata_path(tag), meta_json)?;

        Ok(self.weights_path(tag))
    }

    /// Read the metadata sidecar for `tag`.
    pub fn load_metadata(&self, tag: CheckpointTag) -> Result<CheckpointMetadata, CheckpointError> {
        let path = self.metadata_path(tag);
        let json = fs::read_to_string(&path).map_err(|e| CheckpointError::MetadataRead {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| CheckpointError::MetadataParse { path, source: e })
    }

    /// Restore the generator saved under `tag` into a freshly initialized one,
    /// rebuilt from the configuration stored in its metadata.
    pub fn load_generator<B: Backend>(
        &self,
        tag: CheckpointTag,
        device: &B::Device,
    ) -> Result<(Generator<B>, CheckpointMetadata), CheckpointError> {
        let metadata = self.load_metadata(tag)?;
        let generator = load_generator_file(&self.weights_path(tag), &metadata.generator, device)?;
        Ok((generator, metadata))
    }

    /// All checkpoints with readable metadata, ordered by epoch with `done` last.
    pub fn list_checkpoints(
        &self,
    ) -> Result<Vec<(CheckpointTag, CheckpointMetadata)>, CheckpointError> {
        if !self.config.checkpoint_dir.is_dir() {
            return Err(CheckpointError::DirNotFound(
                self.config.checkpoint_dir.clone(),
            ));
        }

        let mut results = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(tag) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(CheckpointTag::from_file_stem)
            else {
                continue;
            };
            if self.weights_path(tag).exists() {
                results.push((tag, self.load_metadata(tag)?));
            }
        }
        results.sort_by_key(|(tag, _)| *tag);
        Ok(results)
    }

    /// The final checkpoint if present, otherwise the one from the highest epoch.
    pub fn latest(&self) -> Result<CheckpointTag, CheckpointError> {
        self.list_checkpoints()?
            .last()
            .map(|(tag, _)| *tag)
            .ok_or_else(|| CheckpointError::NoCheckpoint(self.config.checkpoint_dir.clone()))
    }
}

/// Load generator weights from `path` into a generator built from `config`.
fn load_generator_file<B: Backend>(
    path: &Path,
    config: &GeneratorConfig,
    device: &B::Device,
) -> Result<Generator<B>, CheckpointError> {
    let recorder = DefaultRecorder::default();
    config
        .init::<B>(device)
        .load_file(path.to_path_buf(), &recorder, device)
        .map_err(|e| CheckpointError::ModelLoad(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::metadata::{CheckpointHyperparameters, CheckpointLosses};
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn config() -> GeneratorConfig {
        GeneratorConfig::new(8, 16, 1)
    }

    fn metadata(tag: CheckpointTag, epoch: usize) -> CheckpointMetadata {
        CheckpointMetadata {
            tag,
            epoch,
            global_step: epoch * 10,
            timestamp: 0,
            generator: config(),
            losses: CheckpointLosses::new(Some(0.5), Some(0.9)),
            hyperparameters: CheckpointHyperparameters {
                lr: 2e-4,
                b1: 0.5,
                b2: 0.999,
                batch_size: 4,
                n_critic: 1,
                seed: 0,
            },
        }
    }

    fn manager(dir: &Path) -> CheckpointManager {
        CheckpointManager::new(CheckpointManagerConfig {
            checkpoint_dir: dir.to_path_buf(),
        })
        .unwrap()
    }

    #[test]
    fn test_new_creates_directory_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("checkpoints");
        let config = CheckpointManagerConfig {
            checkpoint_dir: nested.clone(),
        };
        CheckpointManager::new(config.clone()).unwrap();
        CheckpointManager::new(config).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_save_writes_weights_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path());
        let generator = config().init::<TestBackend>(&Default::default());

        let path = manager
            .save_generator(&generator, &metadata(CheckpointTag::Epoch(3), 3))
            .unwrap();
        assert_eq!(path, dir.path().join("generator_3.mpk"));
        assert!(path.exists());
        assert!(dir.path().join("generator_3.json").exists());

        manager
            .save_generator(&generator, &metadata(CheckpointTag::Done, 3))
            .unwrap();
        assert!(dir.path().join("generator_done.mpk").exists());
    }

    #[test]
    fn test_roundtrip_reproduces_output_bitwise() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path());
        let device = Default::default();
        let generator = config().init::<TestBackend>(&device);
        manager
            .save_generator(&generator, &metadata(CheckpointTag::Done, 0))
            .unwrap();

        let (restored, meta) = manager
            .load_generator::<TestBackend>(CheckpointTag::Done, &device)
            .unwrap();
        assert_eq!(meta.generator.latent_dim, 8);

        let latent = Tensor::<TestBackend, 2>::random(
            [3, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let expected: Vec<f32> = generator.forward(latent.clone()).into_data().to_vec().unwrap();
        let actual: Vec<f32> = restored.forward(latent).into_data().to_vec().unwrap();
        assert_eq!(
            expected.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            actual.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_list_and_latest() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path());
        let generator = config().init::<TestBackend>(&Default::default());

        for epoch in [2, 0, 11] {
            manager
                .save_generator(&generator, &metadata(CheckpointTag::Epoch(epoch), epoch))
                .unwrap();
        }
        assert_eq!(manager.latest().unwrap(), CheckpointTag::Epoch(11));

        manager
            .save_generator(&generator, &metadata(CheckpointTag::Done, 11))
            .unwrap();
        let tags: Vec<CheckpointTag> = manager
            .list_checkpoints()
            .unwrap()
            .into_iter()
            .map(|(tag, _)| tag)
            .collect();
        assert_eq!(
            tags,
            vec![
                CheckpointTag::Epoch(0),
                CheckpointTag::Epoch(2),
                CheckpointTag::Epoch(11),
                CheckpointTag::Done
            ]
        );
        assert_eq!(manager.latest().unwrap(), CheckpointTag::Done);
    }

    #[test]
    fn test_same_tag_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path());
        let generator = config().init::<TestBackend>(&Default::default());

        let mut meta = metadata(CheckpointTag::Epoch(1), 1);
        manager.save_generator(&generator, &meta).unwrap();
        meta.global_step = 99;
        manager.save_generator(&generator, &meta).unwrap();

        let list = manager.list_checkpoints().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].1.global_step, 99);
    }

    #[test]
    fn test_nan_loss_keeps_directory_readable() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path());
        let generator = config().init::<TestBackend>(&Default::default());

        let mut meta = metadata(CheckpointTag::Epoch(2), 2);
        meta.losses = CheckpointLosses::new(Some(f32::NAN), Some(f32::NAN));
        manager.save_generator(&generator, &meta).unwrap();

        let loaded = manager.load_metadata(CheckpointTag::Epoch(2)).unwrap();
        assert_eq!(loaded.losses.discriminator, None);
        assert_eq!(loaded.losses.generator, None);
        assert_eq!(manager.latest().unwrap(), CheckpointTag::Epoch(2));
    }

    #[test]
    fn test_latest_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = manager(dir.path()).latest().unwrap_err();
        assert!(
            matches!(err, CheckpointError::NoCheckpoint(_)),
            "expected NoCheckpoint, got: {err}"
        );
    }

    #[test]
    fn test_load_missing_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let err = manager(dir.path())
            .load_metadata(CheckpointTag::Epoch(5))
            .unwrap_err();
        assert!(matches!(err, CheckpointError::MetadataRead { .. }));
    }
}
