//! MNIST training images through burn's vision datasets.

use burn::data::dataset::vision::{MnistDataset, MnistItem};
use burn::data::dataset::Dataset;

use super::{DataConfig, InMemorySource};
use crate::error::DataError;
use crate::model::ModelConfig;

/// Side length of an MNIST image.
pub const MNIST_SIZE: usize = 28;

/// Resize `item` to `size x size` (nearest neighbour), replicate it over
/// `channels`, map pixels from [0, 255] to [-1, 1] and append to `out`.
pub fn normalize_into(item: &MnistItem, size: usize, channels: usize, out: &mut Vec<f32>) {
    let start = out.len();
    for y in 0..size {
        let row = &item.image[y * MNIST_SIZE / size];
        for x in 0..size {
            let px = row[x * MNIST_SIZE / size] / 255.0;
            out.push((px - 0.5) / 0.5);
        }
    }
    for _ in 1..channels {
        out.extend_from_within(start..start + size * size);
    }
}

/// Batch normalized `items` into an [`InMemorySource`].
pub fn source_from_items<I>(
    items: I,
    data: &DataConfig,
    model: &ModelConfig,
    batch_size: usize,
    seed: u64,
) -> Result<InMemorySource, DataError>
where
    I: IntoIterator<Item = MnistItem>,
{
    let mut values = Vec::new();
    for item in items {
        normalize_into(&item, model.img_size, model.channels, &mut values);
    }
    InMemorySource::new(
        values,
        [model.channels, model.img_size, model.img_size],
        batch_size,
        data.shuffle,
        seed,
    )
}

/// Load the MNIST training split (downloaded to burn's dataset cache on first
/// use) as a batched source.
pub fn load_source(
    data: &DataConfig,
    model: &ModelConfig,
    batch_size: usize,
    seed: u64,
) -> Result<InMemorySource, DataError> {
    let dataset = MnistDataset::train();
    tracing::info!("loaded {} MNIST training images", dataset.len());
    source_from_items(dataset.iter(), data, model, batch_size, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleSource;

    fn item(fill: impl Fn(usize, usize) -> f32) -> MnistItem {
        let mut image = [[0.0f32; MNIST_SIZE]; MNIST_SIZE];
        for (y, row) in image.iter_mut().enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = fill(y, x);
            }
        }
        MnistItem { image, label: 0 }
    }

    fn model(img_size: usize, channels: usize) -> ModelConfig {
        ModelConfig { img_size, channels }
    }

    #[test]
    fn test_normalize_range() {
        let mut out = Vec::new();
        normalize_into(&item(|_, x| if x < 14 { 0.0 } else { 255.0 }), 28, 1, &mut out);
        assert_eq!(out.len(), 28 * 28);
        assert_eq!(out[0], -1.0);
        assert_eq!(out[27], 1.0);
        assert!(out.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_normalize_nearest_upsample() {
        let mut out = Vec::new();
        normalize_into(&item(|y, x| (y * MNIST_SIZE + x) as f32 % 256.0), 56, 1, &mut out);
        assert_eq!(out.len(), 56 * 56);
        // Each source pixel covers a 2x2 block.
        assert_eq!(out[0], out[1]);
        assert_eq!(out[0], out[56]);
        assert_ne!(out[0], out[2]);
    }

    #[test]
    fn test_normalize_downsample_picks_sources() {
        let mut out = Vec::new();
        normalize_into(&item(|y, _| y as f32), 14, 1, &mut out);
        let first_column: Vec<f32> = out.iter().step_by(14).copied().collect();
        let expected: Vec<f32> = (0..14)
            .map(|y| ((2 * y) as f32 / 255.0 - 0.5) / 0.5)
            .collect();
        assert_eq!(first_column, expected);
    }

    #[test]
    fn test_normalize_replicates_channels() {
        let mut out = vec![9.0];
        normalize_into(&item(|_, _| 255.0), 16, 3, &mut out);
        assert_eq!(out.len(), 1 + 3 * 16 * 16);
        assert_eq!(out[0], 9.0);
        assert!(out[1..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_source_from_items() {
        let items = (0..5).map(|i| item(move |_, _| i as f32));
        let data = DataConfig {
            shuffle: false,
            prefetch: 1,
        };
        let mut source = source_from_items(items, &data, &model(16, 1), 2, 0).unwrap();
        assert_eq!(source.num_batches(), 3);
        assert_eq!(source.sample_shape(), [1, 16, 16]);

        let batches: Vec<_> = source.epoch(0).collect();
        assert_eq!(batches[0].shape, [2, 1, 16, 16]);
        assert_eq!(batches[2].shape, [1, 1, 16, 16]);
    }

    #[test]
    fn test_source_from_no_items() {
        let err = source_from_items(std::iter::empty(), &DataConfig::default(), &model(16, 1), 4, 0)
            .err()
            .expect("no items should fail");
        assert!(matches!(err, DataError::Empty));
    }
}
