//! Real-sample sources: the batch type the trainer consumes, an in-memory
//! source with per-epoch shuffling, MNIST loading and a background
//! prefetcher.

mod memory;
pub mod mnist;
mod prefetch;

pub use memory::{EpochBatches, InMemorySource};
pub use prefetch::Prefetcher;

use burn::prelude::*;

/// Data loading configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub shuffle: bool,
    /// Number of batches read ahead of the trainer.
    pub prefetch: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            shuffle: true,
            prefetch: 2,
        }
    }
}

/// One batch of real samples in host memory, laid out `[batch, channels, height, width]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RealBatch {
    pub values: Vec<f32>,
    pub shape: [usize; 4],
}

impl RealBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    pub fn is_empty(&self) -> bool {
        self.shape[0] == 0
    }

    pub fn to_tensor<B: Backend>(self, device: &B::Device) -> Tensor<B, 4> {
        Tensor::from_data(TensorData::new(self.values, self.shape), device)
    }
}

/// Ordered, restartable supply of real batches.
pub trait SampleSource {
    type Batches: Iterator<Item = RealBatch> + Send + 'static;

    /// Batches delivered per epoch.
    fn num_batches(&self) -> usize;

    /// Per-sample `[channels, height, width]`.
    fn sample_shape(&self) -> [usize; 3];

    /// Start a fresh pass over the data for `epoch`.
    fn epoch(&mut self, epoch: usize) -> Self::Batches;
}
