#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dcgan::backend::{AcceleratorTrainBackend, CpuTrainBackend, Execution};
use dcgan::config::AppConfig;
use dcgan::data::mnist;
use dcgan::training::Trainer;

/// Train a DCGAN on MNIST.
#[derive(Parser)]
#[command(name = "train", about = "Train a DCGAN on MNIST")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Run on the CPU backend instead of the accelerator
    #[arg(long)]
    cpu: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,

    /// Override number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override generator update period
    #[arg(long)]
    n_critic: Option<usize>,

    /// Override sample image directory
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Override checkpoint directory
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    dcgan::logging::init();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(epochs) = cli.epochs {
        config.training.epochs = epochs;
    }
    if let Some(lr) = cli.lr {
        config.training.lr = lr;
    }
    if let Some(batch_size) = cli.batch_size {
        config.training.batch_size = batch_size;
    }
    if let Some(n_critic) = cli.n_critic {
        config.training.n_critic = n_critic;
    }
    if let Some(dir) = cli.images_dir {
        config.training.images_dir = dir;
    }
    if let Some(dir) = cli.checkpoint_dir {
        config.checkpoint.checkpoint_dir = dir;
    }
    config.validate().context("validating configuration")?;

    let mut source = mnist::load_source(
        &config.data,
        &config.model,
        config.training.batch_size,
        config.training.seed,
    )
    .context("loading MNIST training images")?;

    let trainer = Trainer::new(
        config.training.clone(),
        config.model.clone(),
        config.checkpoint.clone(),
        config.data.prefetch,
    )
    .context("preparing output directories")?;

    let execution = Execution::select(cli.cpu);
    info!("Using {execution}");
    let report = match &execution {
        Execution::Accelerator(device) => {
            trainer.train::<AcceleratorTrainBackend, _>(&mut source, device)
        }
        Execution::Cpu(device) => trainer.train::<CpuTrainBackend, _>(&mut source, device),
    }
    .context("training")?;

    info!(
        "Done: {} steps, {} generator updates, {} sample grids, {} checkpoints",
        report.global_steps,
        report.generator_updates.len(),
        report.images.len(),
        report.checkpoints.len() + 1
    );
    Ok(())
}
