//! # DCGAN
//!
//! Deep Convolutional GAN training on the Burn ML framework. A generator maps
//! latent noise to images, a discriminator scores images as real or
//! synthetic, and the trainer alternates their Adam updates batch by batch.
//!
//! ## Modules
//!
//! - [`model`] — Generator and discriminator networks
//! - [`training`] — Adversarial loss, update steps, schedule, orchestrator
//! - [`data`] — Sample sources: in-memory batches, MNIST loading, prefetching
//! - [`checkpoint`] — Generator checkpoint persistence
//! - [`imaging`] — Sample grid rendering to PNG
//! - [`backend`] — CPU and accelerator execution contexts
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

#![recursion_limit = "256"]

pub mod backend;
pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod model;
pub mod training;
