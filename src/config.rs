use std::path::Path;

use crate::checkpoint::CheckpointManagerConfig;
use crate::data::DataConfig;
use crate::error::ConfigError;
use crate::model::ModelConfig;
use crate::training::trainer::TrainerConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub training: TrainerConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.training;
        if t.epochs == 0 {
            return Err(ConfigError::Validation("training.epochs must be > 0".into()));
        }
        if t.batch_size == 0 {
            return Err(ConfigError::Validation(
                "training.batch_size must be > 0".into(),
            ));
        }
        if t.lr <= 0.0 {
            return Err(ConfigError::Validation("training.lr must be > 0".into()));
        }
        if !(0.0..1.0).contains(&t.b1) {
            return Err(ConfigError::Validation("training.b1 must be in [0, 1)".into()));
        }
        if !(0.0..1.0).contains(&t.b2) {
            return Err(ConfigError::Validation("training.b2 must be in [0, 1)".into()));
        }
        if t.latent_dim == 0 {
            return Err(ConfigError::Validation(
                "training.latent_dim must be > 0".into(),
            ));
        }
        if t.n_critic == 0 {
            return Err(ConfigError::Validation(
                "training.n_critic must be >= 1".into(),
            ));
        }
        if t.sample_interval == 0 {
            return Err(ConfigError::Validation(
                "training.sample_interval must be > 0".into(),
            ));
        }
        if t.checkpoint_interval == 0 {
            return Err(ConfigError::Validation(
                "training.checkpoint_interval must be > 0".into(),
            ));
        }

        // The discriminator halves the image four times, the generator doubles it twice.
        if self.model.img_size == 0 || self.model.img_size % 16 != 0 {
            return Err(ConfigError::Validation(
                "model.img_size must be a positive multiple of 16".into(),
            ));
        }
        if self.model.channels != 1 && self.model.channels != 3 {
            return Err(ConfigError::Validation(
                "model.channels must be 1 or 3".into(),
            ));
        }

        if self.data.prefetch == 0 {
            return Err(ConfigError::Validation("data.prefetch must be >= 1".into()));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
