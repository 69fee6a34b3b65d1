// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// The model, trainer and inferencer are generic over Burn's
// Backend trait. This file pins the two concrete backends the
// CLI can pick from:
//
//   Cpu  → NdArray<f32>   (always available, no GPU needed)
//   Wgpu → Wgpu           (Vulkan / Metal / DX12 via wgpu)
//
// Training wraps either one in Autodiff<_>.

use serde::{Deserialize, Serialize};

pub type CpuBackend = burn::backend::NdArray<f32>;
pub type GpuBackend = burn::backend::Wgpu;

pub type CpuDevice = burn::backend::ndarray::NdArrayDevice;
pub type GpuDevice = burn::backend::wgpu::WgpuDevice;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Cpu,
    Wgpu,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Cpu  => write!(f, "cpu (ndarray)"),
            BackendKind::Wgpu => write!(f, "wgpu"),
        }
    }
}
