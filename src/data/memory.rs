use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{RealBatch, SampleSource};
use crate::error::DataError;

/// Samples held in memory, split into fixed-size batches. The last batch of an
/// epoch keeps the remainder, so it may be short.
pub struct InMemorySource {
    values: Arc<[f32]>,
    sample_shape: [usize; 3],
    count: usize,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
}

impl InMemorySource {
    /// `values` holds `count` samples of `sample_shape` back to back.
    pub fn new(
        values: Vec<f32>,
        sample_shape: [usize; 3],
        batch_size: usize,
        shuffle: bool,
        seed: u64,
    ) -> Result<Self, DataError> {
        let sample_len: usize = sample_shape.iter().product();
        if values.is_empty() || sample_len == 0 {
            return Err(DataError::Empty);
        }
        if values.len() % sample_len != 0 {
            return Err(DataError::ShapeMismatch {
                len: values.len(),
                sample_len,
            });
        }
        let count = values.len() / sample_len;

        Ok(InMemorySource {
            values: values.into(),
            sample_shape,
            count,
            batch_size: batch_size.max(1),
            shuffle,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl SampleSource for InMemorySource {
    type Batches = EpochBatches;

    fn num_batches(&self) -> usize {
        self.count.div_ceil(self.batch_size)
    }

    fn sample_shape(&self) -> [usize; 3] {
        self.sample_shape
    }

    fn epoch(&mut self, _epoch: usize) -> EpochBatches {
        let mut order: Vec<usize> = (0..self.count).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        EpochBatches {
            values: Arc::clone(&self.values),
            order,
            sample_shape: self.sample_shape,
            batch_size: self.batch_size,
            pos: 0,
        }
    }
}

/// One pass over an [`InMemorySource`] in a fixed sample order.
pub struct EpochBatches {
    values: Arc<[f32]>,
    order: Vec<usize>,
    sample_shape: [usize; 3],
    batch_size: usize,
    pos: usize,
}

impl Iterator for EpochBatches {
    type Item = RealBatch;

    fn next(&mut self) -> Option<RealBatch> {
        if self.pos >= self.order.len() {
            return None;
        }
        let end = (self.pos + self.batch_size).min(self.order.len());
        let indices = &self.order[self.pos..end];
        self.pos = end;

        let sample_len: usize = self.sample_shape.iter().product();
        let mut values = Vec::with_capacity(indices.len() * sample_len);
        for &i in indices {
            values.extend_from_slice(&self.values[i * sample_len..(i + 1) * sample_len]);
        }

        let [c, h, w] = self.sample_shape;
        Some(RealBatch {
            values,
            shape: [indices.len(), c, h, w],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.pos).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}
