use std::path::PathBuf;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no generator checkpoint found in {0}")]
    NoCheckpoint(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while reading real samples.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("sample buffer of length {len} does not divide into samples of {sample_len} values")]
    ShapeMismatch { len: usize, sample_len: usize },

    #[error("dataset is empty")]
    Empty,
}

/// Errors that can occur while rendering sample grids.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("cannot render an empty sample grid")]
    EmptyGrid,

    #[error("unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),

    #[error("sample buffer of length {len} does not match {count} samples of {sample_len} values")]
    ShapeMismatch {
        len: usize,
        count: usize,
        sample_len: usize,
    },

    #[error("failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("sample shape {found:?} does not match the model's {expected:?}")]
    SampleShape {
        expected: [usize; 3],
        found: [usize; 3],
    },

    #[error("failed to read tensor data: {0}")]
    TensorData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NoCheckpoint(PathBuf::from("checkpoints"));
        assert_eq!(err.to_string(), "no generator checkpoint found in checkpoints");
    }

    #[test]
    fn test_data_error_display() {
        let err = DataError::ShapeMismatch {
            len: 7,
            sample_len: 2,
        };
        assert_eq!(
            err.to_string(),
            "sample buffer of length 7 does not divide into samples of 2 values"
        );
    }

    #[test]
    fn test_training_error_wraps_image_error() {
        let err: TrainingError = ImageError::UnsupportedChannels(2).into();
        assert_eq!(
            err.to_string(),
            "image error: unsupported channel count 2 (expected 1 or 3)"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("training.lr must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: training.lr must be > 0"
        );
    }
}
