// ============================================================
// Infrastructure — Device Placement
// ============================================================
// The options file carries a `use_gpu` flag and a device index.
// This module turns them into a Burn WGPU device. Tensors built
// by the embedding providers are created directly on the model
// device, so no separate transfer step exists.
//
// Other backends (NdArray in tests) pick their own device and
// ignore the placement.
//
// `use_gpu = false` maps to WgpuDevice::Cpu, which needs a software
// WGPU adapter (lavapipe, WARP). Hosts without one should run the
// model on the NdArray backend for CPU placement instead. GPU
// placement selects DiscreteGpu(device_index); integrated GPUs are
// not addressed by index.
//
// Reference: Burn Book §2 (Backends)

use burn::backend::wgpu::WgpuDevice;
use serde::{Deserialize, Serialize};

/// Where the model's tensors live when running on WGPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePlacement {
    pub use_gpu:      bool,
    pub device_index: usize,
}

impl DevicePlacement {
    pub fn cpu() -> Self {
        Self { use_gpu: false, device_index: 0 }
    }

    pub fn gpu(device_index: usize) -> Self {
        Self { use_gpu: true, device_index }
    }

    /// The WGPU device this placement selects.
    pub fn wgpu_device(&self) -> WgpuDevice {
        let device = if self.use_gpu {
            WgpuDevice::DiscreteGpu(self.device_index)
        } else {
            WgpuDevice::Cpu
        };
        tracing::debug!("Device placement {:?} -> {:?}", self, device);
        device
    }
}
