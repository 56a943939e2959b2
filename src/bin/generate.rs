#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn::prelude::*;
use clap::Parser;
use tracing::info;

use dcgan::backend::{AcceleratorBackend, CpuBackend, Execution};
use dcgan::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointTag};
use dcgan::imaging;
use dcgan::training::latent::LatentSampler;

/// Render a sample grid from a trained generator checkpoint.
#[derive(Parser)]
#[command(name = "generate", about = "Sample images from a trained DCGAN generator")]
struct Cli {
    /// Checkpoint directory
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: PathBuf,

    /// Checkpoint to load: an epoch number or "done" (default: latest)
    #[arg(long)]
    checkpoint: Option<String>,

    /// Number of samples to draw (at most 25 are rendered)
    #[arg(long, default_value_t = 25)]
    num_samples: usize,

    /// Latent sampling seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output PNG path
    #[arg(long, default_value = "samples.png")]
    output: PathBuf,

    /// Run on the CPU backend instead of the accelerator
    #[arg(long)]
    cpu: bool,
}

fn main() -> Result<()> {
    dcgan::logging::init();
    let cli = Cli::parse();

    if cli.num_samples == 0 {
        bail!("--num-samples must be >= 1");
    }

    let manager = CheckpointManager::new(CheckpointManagerConfig {
        checkpoint_dir: cli.checkpoint_dir.clone(),
    })
    .context("opening checkpoint directory")?;

    let tag = match cli.checkpoint.as_deref() {
        None => manager.latest().context("finding latest checkpoint")?,
        Some(name) => CheckpointTag::from_file_stem(&format!("generator_{name}"))
            .with_context(|| format!("invalid checkpoint '{name}' (expected a number or 'done')"))?,
    };

    let execution = Execution::select(cli.cpu);
    info!("Using {execution}");
    match &execution {
        Execution::Accelerator(device) => {
            render::<AcceleratorBackend>(&cli, &manager, tag, device)
        }
        Execution::Cpu(device) => render::<CpuBackend>(&cli, &manager, tag, device),
    }?;

    info!("Wrote {}", cli.output.display());
    Ok(())
}

fn render<B: Backend>(
    cli: &Cli,
    manager: &CheckpointManager,
    tag: CheckpointTag,
    device: &B::Device,
) -> Result<()> {
    let (generator, metadata) = manager
        .load_generator::<B>(tag, device)
        .with_context(|| format!("loading checkpoint generator_{tag}"))?;
    info!(
        "Loaded generator_{} (epoch {}, step {})",
        tag, metadata.epoch, metadata.global_step
    );

    let mut sampler = LatentSampler::new(metadata.generator.latent_dim, cli.seed);
    let images = generator.forward(sampler.sample::<B>(cli.num_samples, device));
    let shape: [usize; 4] = images.dims();
    let values: Vec<f32> = images
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| anyhow::anyhow!("reading generated images: {e:?}"))?;

    imaging::save_sample_grid(&values, shape, &cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    Ok(())
}
