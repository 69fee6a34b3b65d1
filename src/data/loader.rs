// ============================================================
// Layer 4 — Observation Loaders
// ============================================================
// Reads raw observations from disk. Two formats are supported:
//
//   CSV — one observation per row, comma separated numbers.
//         Blank lines and lines starting with '#' are skipped.
//
//   IDX — the MNIST file format:
//           bytes 0-1  zero
//           byte  2    element type (0x08 = unsigned byte)
//           byte  3    number of dimensions N
//           then N big-endian u32 dimension sizes
//           then the data, row-major
//         The first dimension counts observations; the rest are
//         flattened into one vector. Pixels are scaled to [0, 1].
//
// Values are NOT binarised here; see preprocessor.rs.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::observation::Observation;
use crate::domain::traits::ObservationSource;

/// IDX element type code for unsigned bytes
const IDX_UBYTE: u8 = 0x08;

/// How to interpret the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Csv,
    Idx,
    /// Guess from the file name
    Auto,
}

impl DataFormat {
    /// Resolve `Auto` to a concrete format from the file name.
    /// `train-images-idx3-ubyte` and `*.idx` are IDX, everything else CSV.
    pub fn resolve(self, path: &Path) -> DataFormat {
        match self {
            DataFormat::Auto => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if name.contains("ubyte") || name.contains(".idx") {
                    DataFormat::Idx
                } else {
                    DataFormat::Csv
                }
            }
            other => other,
        }
    }
}

// ─── CSV ──────────────────────────────────────────────────────────────────────
pub struct CsvLoader {
    path:        PathBuf,
    has_headers: bool,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>, has_headers: bool) -> Self {
        Self { path: path.into(), has_headers }
    }
}

impl ObservationSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<Observation>> {
        // flexible(false) makes the reader reject rows of unequal width
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(false)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open CSV file '{}'", self.path.display()))?;

        let mut observations = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("Malformed row {} in '{}'", row + 1, self.path.display())
            })?;
            let values = record
                .iter()
                .map(|field| {
                    field.parse::<f32>().with_context(|| {
                        format!(
                            "Non-numeric value '{}' in row {} of '{}'",
                            field, row + 1, self.path.display()
                        )
                    })
                })
                .collect::<Result<Vec<f32>>>()?;
            observations.push(Observation::new(values));
        }

        tracing::debug!(
            "Read {} CSV rows from '{}'",
            observations.len(),
            self.path.display()
        );
        Ok(observations)
    }
}

// ─── IDX ──────────────────────────────────────────────────────────────────────
pub struct IdxLoader {
    path: PathBuf,
}

impl IdxLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ObservationSource for IdxLoader {
    fn load_all(&self) -> Result<Vec<Observation>> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Cannot read IDX file '{}'", self.path.display()))?;
        parse_idx(&bytes).with_context(|| format!("Invalid IDX file '{}'", self.path.display()))
    }
}

/// Parse an unsigned-byte IDX buffer into observations.
pub fn parse_idx(bytes: &[u8]) -> Result<Vec<Observation>> {
    ensure!(bytes.len() >= 4, "file is shorter than the IDX magic number");
    ensure!(bytes[0] == 0 && bytes[1] == 0, "bad magic number");
    if bytes[2] != IDX_UBYTE {
        bail!("unsupported element type 0x{:02x}, only unsigned byte is supported", bytes[2]);
    }

    let ndims = bytes[3] as usize;
    ensure!(ndims >= 1, "IDX file declares zero dimensions");

    let header_len = 4 + 4 * ndims;
    ensure!(bytes.len() >= header_len, "truncated IDX header");

    let dims: Vec<usize> = bytes[4..header_len]
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as usize)
        .collect();

    let count = dims[0];
    let per_item = dims[1..]
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .with_context(|| format!("IDX dimensions overflow: {:?}", dims))?;
    let expected = count
        .checked_mul(per_item)
        .with_context(|| format!("IDX dimensions overflow: {:?}", dims))?;
    let body = &bytes[header_len..];
    ensure!(
        body.len() == expected,
        "expected {} data bytes for dims {:?}, found {}",
        expected, dims, body.len()
    );
    if count == 0 {
        return Ok(Vec::new());
    }
    ensure!(per_item > 0, "IDX items have zero size");

    Ok(body
        .chunks_exact(per_item)
        .map(|item| Observation::new(item.iter().map(|&b| b as f32 / 255.0).collect()))
        .collect())
}

/// Load observations with the requested (or guessed) format.
/// `limit` keeps only the first N observations.
pub fn load_observations(
    path:        impl AsRef<Path>,
    format:      DataFormat,
    has_headers: bool,
    limit:       Option<usize>,
) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    ensure!(path.exists(), "Data file '{}' does not exist", path.display());

    let format = format.resolve(path);
    tracing::info!("Loading {:?} data from '{}'", format, path.display());

    let source: Box<dyn ObservationSource> = match format {
        DataFormat::Idx => Box::new(IdxLoader::new(path)),
        _               => Box::new(CsvLoader::new(path, has_headers)),
    };
    let mut observations = source.load_all()?;

    if let Some(limit) = limit {
        observations.truncate(limit);
    }
    tracing::info!("Loaded {} observations", observations.len());
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn idx_bytes(dims: &[u32], data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0, 0, IDX_UBYTE, dims.len() as u8];
        for d in dims {
            bytes.extend_from_slice(&d.to_be_bytes());
        }
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_parse_idx_images() {
        // two 2x2 images
        let bytes = idx_bytes(&[2, 2, 2], &[0, 255, 255, 0, 255, 255, 255, 255]);
        let obs   = parse_idx(&bytes).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].values, vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(obs[1].values, vec![1.0; 4]);
    }

    #[test]
    fn test_parse_idx_rejects_truncated_body() {
        let bytes = idx_bytes(&[2, 2, 2], &[0, 255, 255]);
        assert!(parse_idx(&bytes).is_err());
    }

    #[test]
    fn test_parse_idx_rejects_overflowing_dims() {
        let bytes = idx_bytes(&[1, u32::MAX, u32::MAX, u32::MAX], &[]);
        let err   = parse_idx(&bytes).unwrap_err();
        assert!(err.to_string().contains("overflow"));

        // the item size fits, the total byte count does not
        let bytes = idx_bytes(&[u32::MAX, u32::MAX, u32::MAX], &[]);
        assert!(parse_idx(&bytes).is_err());
    }

    #[test]
    fn test_parse_idx_rejects_float_type() {
        let mut bytes = idx_bytes(&[1, 1], &[0]);
        bytes[2] = 0x0D;
        assert!(parse_idx(&bytes).is_err());
    }

    #[test]
    fn test_csv_loader_skips_comments() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "# binary rows").unwrap();
        writeln!(f, "0,1,1").unwrap();
        writeln!(f, "1, 0, 0").unwrap();
        let obs = CsvLoader::new(f.path(), false).load_all().unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[1].values, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_csv_loader_headers() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "a,b").unwrap();
        writeln!(f, "0.2,0.8").unwrap();
        let obs = CsvLoader::new(f.path(), true).load_all().unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].values, vec![0.2, 0.8]);
    }

    #[test]
    fn test_csv_loader_rejects_ragged_rows() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "0,1,1").unwrap();
        writeln!(f, "1,0").unwrap();
        assert!(CsvLoader::new(f.path(), false).load_all().is_err());
    }

    #[test]
    fn test_csv_loader_rejects_text() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "0,one").unwrap();
        assert!(CsvLoader::new(f.path(), false).load_all().is_err());
    }

    #[test]
    fn test_format_auto_detection() {
        assert_eq!(
            DataFormat::Auto.resolve(Path::new("data/train-images-idx3-ubyte")),
            DataFormat::Idx
        );
        assert_eq!(DataFormat::Auto.resolve(Path::new("digits.csv")), DataFormat::Csv);
        assert_eq!(DataFormat::Idx.resolve(Path::new("digits.csv")), DataFormat::Idx);
    }

    #[test]
    fn test_load_observations_limit() {
        let mut f = NamedTempFile::new().unwrap();
        for _ in 0..5 {
            writeln!(f, "0,1").unwrap();
        }
        let obs = load_observations(f.path(), DataFormat::Csv, false, Some(3)).unwrap();
        assert_eq!(obs.len(), 3);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_observations("/no/such/file.csv", DataFormat::Auto, false, None).is_err());
    }
}
