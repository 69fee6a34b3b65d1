// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load + binarise observations (Layer 4 - data)
//   Step 2: Train / validation split     (Layer 4 - data)
//   Step 3: Build datasets               (Layer 4 - data)
//   Step 4: Save config                  (Layer 6 - infra)
//   Step 5: Run training loop            (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::application::data_source::DataSource;
use crate::data::{dataset::ObservationDataset, splitter::split_train_val};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::backend::BackendKind;
use crate::ml::model::VaeConfig;
use crate::ml::trainer::{run_training, TrainSummary};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved as train_config.json so inference can rebuild the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data:           DataSource,
    pub checkpoint_dir: String,
    pub backend:        BackendKind,
    /// Filled in from the data before the config is saved
    pub input_dim:      usize,
    pub latent_dim:     usize,
    pub hidden_dim:     usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub train_fraction: f64,
    pub seed:           u64,
}

impl TrainConfig {
    /// Reject hyperparameters that would make training meaningless.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.epochs > 0,     "--epochs must be at least 1");
        ensure!(self.batch_size > 0, "--batch-size must be at least 1");
        ensure!(self.latent_dim > 0, "--latent-dim must be at least 1");
        ensure!(self.hidden_dim > 0, "--hidden-dim must be at least 1");
        ensure!(self.lr > 0.0 && self.lr.is_finite(), "--lr must be a positive number");
        ensure!(
            self.train_fraction > 0.0 && self.train_fraction <= 1.0,
            "--train-fraction must be in (0, 1], got {}",
            self.train_fraction
        );
        Ok(())
    }

    /// Architecture of the model described by this config
    pub fn model_config(&self) -> VaeConfig {
        VaeConfig::new(self.input_dim, self.latent_dim).with_hidden_dim(self.hidden_dim)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(mut self) -> Result<TrainSummary> {
        self.config.validate()?;

        // ── Step 1: Load + binarise ───────────────────────────────────────────
        let (observations, input_dim) = self.config.data.load_binary()?;
        self.config.input_dim = input_dim;
        tracing::info!(
            "{} binary observations of dimension {}",
            observations.len(),
            input_dim
        );

        // ── Step 2: Train / validation split ──────────────────────────────────
        let (train_obs, val_obs) =
            split_train_val(observations, self.config.train_fraction, self.config.seed);
        ensure!(!train_obs.is_empty(), "Training split is empty; lower --train-fraction or add data");
        tracing::info!("Split: {} train, {} validation", train_obs.len(), val_obs.len());
        if val_obs.is_empty() {
            tracing::warn!("Validation split is empty, validation metrics will be NaN");
        }

        // ── Step 3: Build Burn datasets ───────────────────────────────────────
        let train_dataset = ObservationDataset::new(train_obs);
        let val_dataset   = ObservationDataset::new(val_obs);
        tracing::debug!("Training set mean activation {:.4}", train_dataset.mean_activation());

        // ── Step 4: Save config for inference ─────────────────────────────────
        let cfg          = &self.config;
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        if ckpt_manager.has_previous_run() {
            let previous = ckpt_manager.latest_epoch()?;
            tracing::warn!(
                "'{}' already holds a run up to epoch {}: its model files are kept, \
                 the pointers are overwritten and metrics are appended",
                ckpt_manager.dir().display(),
                previous
            );
        }
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        tracing::info!("Metrics go to '{}'", metrics.csv_path().display());

        // ── Step 5: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::loader::DataFormat;

    pub(crate) fn test_config(data_path: &str, checkpoint_dir: &str) -> TrainConfig {
        TrainConfig {
            data: DataSource {
                path:        data_path.to_string(),
                format:      DataFormat::Csv,
                has_headers: false,
                threshold:   0.5,
                limit:       None,
            },
            checkpoint_dir: checkpoint_dir.to_string(),
            backend:        BackendKind::Cpu,
            input_dim:      0,
            latent_dim:     2,
            hidden_dim:     8,
            batch_size:     4,
            epochs:         2,
            lr:             1e-2,
            train_fraction: 0.75,
            seed:           7,
        }
    }

    #[test]
    fn test_validate_rejects_zero_epochs() {
        let mut cfg = test_config("x.csv", "ckpt");
        assert!(cfg.validate().is_ok());
        cfg.epochs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let mut cfg = test_config("x.csv", "ckpt");
        cfg.train_fraction = 0.0;
        assert!(cfg.validate().is_err());
        cfg.train_fraction = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_model_config_carries_dims() {
        let mut cfg = test_config("x.csv", "ckpt");
        cfg.input_dim = 12;
        let m = cfg.model_config();
        assert_eq!((m.input_dim, m.latent_dim, m.hidden_dim), (12, 2, 8));
    }

    #[test]
    fn test_config_json_round_trip() {
        let cfg  = test_config("x.csv", "ckpt");
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"backend\":\"cpu\""));
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.latent_dim, cfg.latent_dim);
    }
}
