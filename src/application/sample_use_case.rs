// ============================================================
// Layer 2 — SampleUseCase
// ============================================================
// Generates new observations from a trained model and writes
// z, θ and x for each of them to one CSV file.

use anyhow::{ensure, Result};

use crate::infra::{
    checkpoint::{CheckpointManager, EpochSelector},
    export::write_rows,
};
use crate::ml::backend::BackendKind;
use crate::ml::inferencer::LoadedVae;

#[derive(Debug, Clone)]
pub struct SampleRequest {
    pub checkpoint_dir: String,
    pub backend:        BackendKind,
    pub epoch:          EpochSelector,
    pub num_samples:    usize,
    pub output:         String,
    pub seed:           u64,
}

pub struct SampleUseCase {
    request: SampleRequest,
}

impl SampleUseCase {
    pub fn new(request: SampleRequest) -> Self {
        Self { request }
    }

    /// Returns the number of samples written
    pub fn execute(&self) -> Result<usize> {
        let req = &self.request;
        ensure!(req.num_samples > 0, "--num-samples must be at least 1");

        let ckpt = CheckpointManager::open(&req.checkpoint_dir)?;
        let vae  = LoadedVae::load(req.backend, &ckpt, req.epoch)?;
        vae.seed(req.seed);

        let samples = vae.sample(req.num_samples)?;
        write_rows(&req.output, &samples)
    }
}
