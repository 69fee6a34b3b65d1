// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training runs on B: AutodiffBackend for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - The validation batcher must use B::InnerBackend as well
//
// The objective is -ELBO averaged over the mini-batch. The
// reparametrized sample is redrawn on every forward pass.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::{AutodiffModule, Module},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ObservationBatcher, dataset::ObservationDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::backend::{BackendKind, CpuBackend, CpuDevice, GpuBackend, GpuDevice};
use crate::ml::model::Vae;

/// Outcome of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub epochs:           usize,
    pub best_epoch:       usize,
    pub best_val_elbo:    f64,
    pub final_train_loss: f64,
}

/// Pick the backend from the config and run the training loop on it.
pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ObservationDataset,
    val_dataset:   ObservationDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainSummary> {
    tracing::info!("Training on backend: {}", cfg.backend);
    match cfg.backend {
        BackendKind::Cpu => {
            let device = CpuDevice::default();
            train_loop::<burn::backend::Autodiff<CpuBackend>>(
                cfg, train_dataset, val_dataset, ckpt_manager, metrics, device,
            )
        }
        BackendKind::Wgpu => {
            let device = GpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<burn::backend::Autodiff<GpuBackend>>(
                cfg, train_dataset, val_dataset, ckpt_manager, metrics, device,
            )
        }
    }
}

/// Sums of per-observation ELBO terms over the validation set.
#[derive(Debug, Default)]
struct ValidationTotals {
    elbo:           f64,
    reconstruction: f64,
    kl:             f64,
    count:          usize,
}

impl ValidationTotals {
    fn mean(&self, sum: f64) -> f64 {
        if self.count > 0 { sum / self.count as f64 } else { f64::NAN }
    }
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ObservationDataset,
    val_dataset:   ObservationDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainSummary> {
    ensure!(train_dataset.len() > 0, "Training dataset is empty");
    ensure!(
        train_dataset.input_dim() == cfg.input_dim,
        "Training data has dimension {} but the config says {}",
        train_dataset.input_dim(),
        cfg.input_dim
    );

    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: Vae<B> = cfg.model_config().init(&device);
    tracing::info!(
        "Model ready: input_dim={} hidden_dim={} latent_dim={} ({} parameters)",
        cfg.input_dim, cfg.hidden_dim, cfg.latent_dim, model.num_params(),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ObservationBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_loader =
        DataLoaderBuilder::new(ObservationBatcher::<B::InnerBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(val_dataset);

    let mut best_val_elbo    = f64::NEG_INFINITY;
    let mut best_epoch       = 0usize;
    let mut final_train_loss = f64::NAN;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.x);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };
        final_train_loss = avg_train_loss;

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut totals  = ValidationTotals::default();

        for batch in val_loader.iter() {
            totals.count += batch.x.dims()[0];
            let terms = model_valid.elbo_terms(batch.x);
            totals.elbo           += terms.elbo.sum().into_scalar().elem::<f64>();
            totals.reconstruction += terms.reconstruction.sum().into_scalar().elem::<f64>();
            totals.kl             += terms.kl.sum().into_scalar().elem::<f64>();
        }

        let row = EpochMetrics::new(
            epoch,
            avg_train_loss,
            totals.mean(totals.elbo),
            totals.mean(totals.reconstruction),
            totals.mean(totals.kl),
        );

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_elbo={:.4} | val_recon={:.4} | val_kl={:.4}",
            epoch, cfg.epochs, row.train_loss, row.val_elbo,
            row.val_reconstruction, row.val_kl,
        );
        metrics.log(&row)?;

        ckpt_manager.save_model(&model, epoch)?;
        if row.is_improvement(best_val_elbo) {
            best_val_elbo = row.val_elbo;
            best_epoch    = epoch;
            ckpt_manager.save_best_epoch(epoch)?;
            tracing::info!("New best validation ELBO {:.4} at epoch {}", best_val_elbo, epoch);
        }
        tracing::debug!("Checkpoint saved for epoch {}", epoch);
    }

    // No finite validation ELBO was ever seen: fall back to the last epoch
    if best_epoch == 0 {
        best_epoch = cfg.epochs;
        ckpt_manager.save_best_epoch(best_epoch)?;
    }

    tracing::info!("Training complete!");
    Ok(TrainSummary {
        epochs: cfg.epochs,
        best_epoch,
        best_val_elbo,
        final_train_loss,
    })
}
