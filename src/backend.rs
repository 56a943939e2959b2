//! Execution contexts: a backend type paired with the device it runs on.

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::wgpu::WgpuDevice;
use burn::backend::{Autodiff, NdArray, Wgpu};

/// CPU inference backend.
pub type CpuBackend = NdArray<f32>;
/// CPU training backend.
pub type CpuTrainBackend = Autodiff<CpuBackend>;
/// Accelerator inference backend.
pub type AcceleratorBackend = Wgpu<f32, i32>;
/// Accelerator training backend.
pub type AcceleratorTrainBackend = Autodiff<AcceleratorBackend>;

/// Where tensors and models live for a whole run.
#[derive(Debug, Clone)]
pub enum Execution {
    /// Best available wgpu adapter; wgpu falls back to a CPU adapter when no
    /// GPU is present.
    Accelerator(WgpuDevice),
    Cpu(NdArrayDevice),
}

impl Execution {
    pub fn select(force_cpu: bool) -> Self {
        if force_cpu {
            Execution::Cpu(NdArrayDevice::Cpu)
        } else {
            Execution::Accelerator(WgpuDevice::default())
        }
    }
}

impl std::fmt::Display for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Execution::Accelerator(device) => write!(f, "wgpu ({device:?})"),
            Execution::Cpu(_) => f.write_str("ndarray (cpu)"),
        }
    }
}
