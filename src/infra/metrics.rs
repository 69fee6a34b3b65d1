// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:              the epoch number (1, 2, 3, ...)
//   - train_loss:         mean -ELBO over training batches
//   - val_elbo:           mean ELBO per validation observation
//   - val_reconstruction: mean E_q[log p(x|z)] on validation
//   - val_kl:             mean KL(q(z|x) || p(z)) on validation
//
// Output file: checkpoints/metrics.csv
//
//   epoch,train_loss,val_elbo,val_reconstruction,val_kl
//   1,212.402100,-180.338200,-174.906100,5.432100
//   2,171.250300,-163.019900,-155.770400,7.249500
//
// How to read the metrics:
//   - val_elbo should rise each epoch
//   - val_kl near 0 for every epoch means posterior collapse:
//     the decoder ignores z
//   - train_loss falling while val_elbo falls → overfitting

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,train_loss,val_elbo,val_reconstruction,val_kl";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:              usize,
    pub train_loss:         f64,
    pub val_elbo:           f64,
    pub val_reconstruction: f64,
    pub val_kl:             f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:              usize,
        train_loss:         f64,
        val_elbo:           f64,
        val_reconstruction: f64,
        val_kl:             f64,
    ) -> Self {
        Self { epoch, train_loss, val_elbo, val_reconstruction, val_kl }
    }

    /// True if this epoch's validation ELBO beats the best so far.
    /// Higher is better; NaN never counts as an improvement.
    pub fn is_improvement(&self, best_val_elbo: f64) -> bool {
        self.val_elbo > best_val_elbo
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet,
    /// so repeated runs append to one log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_elbo,
            m.val_reconstruction,
            m.val_kl,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_elbo={:.4}",
            m.epoch,
            m.train_loss,
            m.val_elbo,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
