// ============================================================
// Layer 6 — CSV Export
// ============================================================
// Writes latent codes and generated samples to CSV with the
// csv crate. The header comes from the first record.

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::traits::RowExport;

/// Write `records` to `path`, one row each, returns rows written.
/// An empty slice produces an empty file.
pub fn write_rows<T: RowExport>(path: impl AsRef<Path>, records: &[T]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;

    if let Some(first) = records.first() {
        writer.write_record(first.header())?;
    }
    for record in records {
        writer
            .write_record(record.to_row())
            .with_context(|| format!("Cannot write row to '{}'", path.display()))?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} rows to '{}'", records.len(), path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::latent::{GeneratedSample, LatentCode};
    use tempfile::TempDir;

    #[test]
    fn test_write_latent_codes() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("out/latents.csv");
        let codes = vec![
            LatentCode { index: 0, mu: vec![0.1], logsigma: vec![-0.2] },
            LatentCode { index: 1, mu: vec![0.3], logsigma: vec![-0.4] },
        ];

        assert_eq!(write_rows(&path, &codes).unwrap(), 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers    = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["index", "mu_0", "logsigma_0"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "1");
    }

    #[test]
    fn test_write_empty_creates_empty_file() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("samples.csv");
        let none: Vec<GeneratedSample> = Vec::new();
        assert_eq!(write_rows(&path, &none).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
