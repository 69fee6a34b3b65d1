// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores VAE weights using Burn's CompactRecorder.
//
// File layout:
//   checkpoints/
//     model_epoch_1.mpk      ← weights after epoch 1
//     model_epoch_2.mpk      ← weights after epoch 2
//     ...
//     latest_epoch.json      ← number of the latest saved epoch
//     best_epoch.json        ← epoch with the highest validation ELBO
//     train_config.json      ← hyperparameters + input_dim
//
// The config is saved separately because the model must be
// rebuilt with the exact same input/hidden/latent sizes before
// weights can be loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Vae;

const LATEST_EPOCH_FILE: &str = "latest_epoch.json";
const BEST_EPOCH_FILE:   &str = "best_epoch.json";
const CONFIG_FILE:       &str = "train_config.json";

/// Which saved epoch to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochSelector {
    Latest,
    Best,
    Epoch(usize),
}

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing checkpoint directory without creating it.
    pub fn open(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        anyhow::ensure!(
            dir.is_dir(),
            "Checkpoint directory '{}' does not exist. Have you run 'train' first?",
            dir.display()
        );
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn model_path(&self, epoch: usize) -> PathBuf {
        // no extension, the recorder adds it
        self.dir.join(format!("model_epoch_{epoch}"))
    }

    /// Save model weights for a given epoch and move the latest pointer.
    pub fn save_model<B: Backend>(&self, model: &Vae<B>, epoch: usize) -> Result<()> {
        let path = self.model_path(epoch);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        self.write_epoch(LATEST_EPOCH_FILE, epoch)?;
        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load weights from the selected epoch into `model`.
    ///
    /// `model` must have the architecture the checkpoint was saved with.
    pub fn load_model<B: Backend>(
        &self,
        model:    Vae<B>,
        selector: EpochSelector,
        device:   &B::Device,
    ) -> Result<Vae<B>> {
        let epoch = match selector {
            EpochSelector::Latest   => self.latest_epoch()?,
            EpochSelector::Best     => self.best_epoch()?,
            EpochSelector::Epoch(n) => n,
        };
        let path = self.model_path(epoch);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Corrupt config file '{}'", path.display()))
    }

    pub fn save_best_epoch(&self, epoch: usize) -> Result<()> {
        self.write_epoch(BEST_EPOCH_FILE, epoch)
    }

    /// True once a training run has saved at least one epoch here
    pub fn has_previous_run(&self) -> bool {
        self.dir.join(LATEST_EPOCH_FILE).is_file()
    }

    /// Number stored in latest_epoch.json
    pub fn latest_epoch(&self) -> Result<usize> {
        self.read_epoch(LATEST_EPOCH_FILE)
    }

    /// Number stored in best_epoch.json
    pub fn best_epoch(&self) -> Result<usize> {
        self.read_epoch(BEST_EPOCH_FILE)
    }

    fn write_epoch(&self, file: &str, epoch: usize) -> Result<()> {
        fs::write(self.dir.join(file), serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {file}"))
    }

    fn read_epoch(&self, file: &str) -> Result<usize> {
        let s = fs::read_to_string(self.dir.join(file))
            .with_context(|| format!("Cannot find '{file}'. Have you run 'train' first?"))?;
        serde_json::from_str::<usize>(&s)
            .with_context(|| format!("Corrupt epoch pointer '{file}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::VaeConfig;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;
    use tempfile::TempDir;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_save_and_load_restores_weights() {
        let dir    = TempDir::new().unwrap();
        let ckpt   = CheckpointManager::new(dir.path().display().to_string()).unwrap();
        let device = Default::default();
        let cfg    = VaeConfig::new(4, 2).with_hidden_dim(5);

        let model: Vae<TestBackend> = cfg.init(&device);
        ckpt.save_model(&model, 3).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 3);

        let fresh: Vae<TestBackend> = cfg.init(&device);
        let loaded = ckpt.load_model(fresh, EpochSelector::Latest, &device).unwrap();

        // Encoder means are deterministic, so identical weights give identical mu
        let x = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![1.0f32, 0.0, 1.0, 1.0], [1, 4]),
            &device,
        );
        let (mu_a, _) = model.encoder.forward(x.clone());
        let (mu_b, _) = loaded.encoder.forward(x);
        let a = mu_a.into_data().to_vec::<f32>().unwrap();
        let b = mu_b.into_data().to_vec::<f32>().unwrap();
        for (got, want) in b.iter().zip(a.iter()) {
            // CompactRecorder stores half precision
            approx::assert_abs_diff_eq!(*got, *want, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_has_previous_run_after_first_save() {
        let dir  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(dir.path().display().to_string()).unwrap();
        assert!(!ckpt.has_previous_run());

        let model: Vae<TestBackend> = VaeConfig::new(4, 2).init(&Default::default());
        ckpt.save_model(&model, 1).unwrap();
        assert!(ckpt.has_previous_run());
    }

    #[test]
    fn test_best_and_latest_pointers() {
        let dir  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(dir.path().display().to_string()).unwrap();
        ckpt.save_best_epoch(2).unwrap();
        assert_eq!(ckpt.best_epoch().unwrap(), 2);
        assert!(ckpt.latest_epoch().is_err());
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let dir    = TempDir::new().unwrap();
        let ckpt   = CheckpointManager::new(dir.path().display().to_string()).unwrap();
        let device = Default::default();
        let model: Vae<TestBackend> = VaeConfig::new(4, 2).init(&device);
        assert!(ckpt.load_model(model, EpochSelector::Epoch(9), &device).is_err());
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_open_requires_existing_dir() {
        assert!(CheckpointManager::open("/definitely/not/here").is_err());
    }
}
