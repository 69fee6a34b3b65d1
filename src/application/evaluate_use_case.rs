// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
//   Step 1: Open checkpoint directory   (Layer 6 - infra)
//   Step 2: Load + binarise the data    (Layer 4 - data)
//   Step 3: MC estimate of the ELBO     (Layer 5 - ml)

use anyhow::{ensure, Result};

use crate::application::data_source::DataSource;
use crate::domain::report::EvalReport;
use crate::infra::checkpoint::{CheckpointManager, EpochSelector};
use crate::ml::backend::BackendKind;
use crate::ml::inferencer::LoadedVae;

#[derive(Debug, Clone)]
pub struct EvaluateRequest {
    pub data:           DataSource,
    pub checkpoint_dir: String,
    pub backend:        BackendKind,
    pub epoch:          EpochSelector,
    pub batch_size:     usize,
    pub mc_samples:     usize,
    pub seed:           u64,
}

pub struct EvaluateUseCase {
    request: EvaluateRequest,
}

impl EvaluateUseCase {
    pub fn new(request: EvaluateRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let req = &self.request;
        ensure!(req.batch_size > 0, "--batch-size must be at least 1");
        ensure!(req.mc_samples > 0, "--mc-samples must be at least 1");

        let ckpt = CheckpointManager::open(&req.checkpoint_dir)?;
        let vae  = LoadedVae::load(req.backend, &ckpt, req.epoch)?;
        vae.seed(req.seed);

        let (observations, dim) = req.data.load_binary()?;
        ensure!(
            dim == vae.input_dim(),
            "Data has dimension {} but the checkpoint expects {}",
            dim,
            vae.input_dim()
        );

        let report = vae.evaluate(&observations, req.batch_size, req.mc_samples)?;
        tracing::info!("Evaluation: {} (loss {:.4})", report, report.loss());
        Ok(report)
    }
}
