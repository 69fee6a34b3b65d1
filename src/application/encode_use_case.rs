// ============================================================
// Layer 2 — EncodeUseCase
// ============================================================
// Maps every observation to its latent embedding, i.e. the
// parameters (μ, log σ) of q(z|x), and writes them as CSV.
// With --latent-dim 2 the μ columns can be scatter-plotted
// directly.

use anyhow::{ensure, Result};

use crate::application::data_source::DataSource;
use crate::infra::{
    checkpoint::{CheckpointManager, EpochSelector},
    export::write_rows,
};
use crate::ml::backend::BackendKind;
use crate::ml::inferencer::LoadedVae;

#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub data:           DataSource,
    pub checkpoint_dir: String,
    pub backend:        BackendKind,
    pub epoch:          EpochSelector,
    pub batch_size:     usize,
    pub output:         String,
}

pub struct EncodeUseCase {
    request: EncodeRequest,
}

impl EncodeUseCase {
    pub fn new(request: EncodeRequest) -> Self {
        Self { request }
    }

    /// Returns the number of latent codes written
    pub fn execute(&self) -> Result<usize> {
        let req = &self.request;
        ensure!(req.batch_size > 0, "--batch-size must be at least 1");

        let ckpt = CheckpointManager::open(&req.checkpoint_dir)?;
        let vae  = LoadedVae::load(req.backend, &ckpt, req.epoch)?;

        let (observations, dim) = req.data.load_binary()?;
        ensure!(
            dim == vae.input_dim(),
            "Data has dimension {} but the checkpoint expects {}",
            dim,
            vae.input_dim()
        );

        let codes = vae.encode(&observations, req.batch_size)?;
        write_rows(&req.output, &codes)
    }
}
