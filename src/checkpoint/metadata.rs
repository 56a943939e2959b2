use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::GeneratorConfig;

/// Identifies a generator checkpoint: the epoch it was taken in, or the final
/// snapshot written after the last epoch. `Done` sorts after every epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointTag {
    Epoch(usize),
    Done,
}

impl CheckpointTag {
    /// File stem shared by the weights and metadata files.
    pub fn file_stem(&self) -> String {
        format!("generator_{self}")
    }

    /// Inverse of [`file_stem`](Self::file_stem).
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        match stem.strip_prefix("generator_")? {
            "done" => Some(CheckpointTag::Done),
            n => n.parse().ok().map(CheckpointTag::Epoch),
        }
    }
}

impl fmt::Display for CheckpointTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointTag::Epoch(n) => write!(f, "{n}"),
            CheckpointTag::Done => f.write_str("done"),
        }
    }
}

/// Most recent loss values at checkpoint time. Missing and non-finite losses
/// are stored as `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointLosses {
    pub discriminator: Option<f32>,
    pub generator: Option<f32>,
}

impl CheckpointLosses {
    pub fn new(discriminator: Option<f32>, generator: Option<f32>) -> Self {
        CheckpointLosses {
            discriminator: discriminator.filter(|v| v.is_finite()),
            generator: generator.filter(|v| v.is_finite()),
        }
    }
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub lr: f64,
    pub b1: f64,
    pub b2: f64,
    pub batch_size: usize,
    pub n_critic: usize,
    pub seed: u64,
}

/// Sidecar written next to every generator weights file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub tag: CheckpointTag,
    pub epoch: usize,
    pub global_step: usize,
    pub timestamp: u64,
    pub generator: GeneratorConfig,
    pub losses: CheckpointLosses,
    pub hyperparameters: CheckpointHyperparameters,
}
