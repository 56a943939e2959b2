//! Sample grids written as PNG files.

use std::path::Path;

use image::{GrayImage, RgbImage};

use crate::error::ImageError;

/// Samples shown in one grid.
pub const GRID_SAMPLES: usize = 25;
/// Samples per grid row.
pub const GRID_COLUMNS: usize = 5;
/// Zero border around every sample, in pixels.
pub const GRID_PADDING: usize = 2;

/// A rendered grid: 8-bit pixels, channel-interleaved, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub pixels: Vec<u8>,
}

/// Tile `count` samples of shape `[channels, height, width]` into a grid with
/// `columns` per row.
///
/// Values are min-max normalized over all tiled samples into [0, 255]; a
/// constant input maps to black.
pub fn make_grid(
    values: &[f32],
    count: usize,
    [channels, height, width]: [usize; 3],
    columns: usize,
) -> Result<Grid, ImageError> {
    if count == 0 {
        return Err(ImageError::EmptyGrid);
    }
    if channels != 1 && channels != 3 {
        return Err(ImageError::UnsupportedChannels(channels));
    }
    let sample_len = channels * height * width;
    if values.len() != count * sample_len {
        return Err(ImageError::ShapeMismatch {
            len: values.len(),
            count,
            sample_len,
        });
    }

    let (lo, hi) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let scale = if hi > lo { 1.0 / (hi - lo) } else { 0.0 };
    let to_byte = |v: f32| (((v - lo) * scale).clamp(0.0, 1.0) * 255.0).round() as u8;

    let cols = columns.max(1).min(count);
    let rows = count.div_ceil(cols);
    let grid_w = GRID_PADDING + cols * (width + GRID_PADDING);
    let grid_h = GRID_PADDING + rows * (height + GRID_PADDING);
    let mut pixels = vec![0u8; grid_w * grid_h * channels];

    for (k, sample) in values.chunks_exact(sample_len).enumerate() {
        let x0 = GRID_PADDING + (k % cols) * (width + GRID_PADDING);
        let y0 = GRID_PADDING + (k / cols) * (height + GRID_PADDING);
        for c in 0..channels {
            for y in 0..height {
                for x in 0..width {
                    let v = sample[(c * height + y) * width + x];
                    let idx = ((y0 + y) * grid_w + (x0 + x)) * channels + c;
                    pixels[idx] = to_byte(v);
                }
            }
        }
    }

    Ok(Grid {
        width: grid_w,
        height: grid_h,
        channels,
        pixels,
    })
}

/// Render the first [`GRID_SAMPLES`] samples (or all, if fewer) of a
/// `[batch, channels, height, width]` buffer and write them to `path` as PNG.
pub fn save_sample_grid(values: &[f32], shape: [usize; 4], path: &Path) -> Result<(), ImageError> {
    let [batch, channels, height, width] = shape;
    let count = batch.min(GRID_SAMPLES);
    let take = count * channels * height * width;
    let values = values.get(..take).ok_or(ImageError::ShapeMismatch {
        len: values.len(),
        count,
        sample_len: channels * height * width,
    })?;

    let grid = make_grid(values, count, [channels, height, width], GRID_COLUMNS)?;
    write_png(&grid, path)
}

fn write_png(grid: &Grid, path: &Path) -> Result<(), ImageError> {
    let (w, h) = (grid.width as u32, grid.height as u32);
    let result = match grid.channels {
        1 => GrayImage::from_raw(w, h, grid.pixels.clone())
            .expect("grid buffer sized for its dimensions")
            .save(path),
        _ => RgbImage::from_raw(w, h, grid.pixels.clone())
            .expect("grid buffer sized for its dimensions")
            .save(path),
    };
    result.map_err(|e| ImageError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
