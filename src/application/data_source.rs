// ============================================================
// Layer 2 — Data Source
// ============================================================
// Every use case starts the same way:
//
//   Step 1: Load raw observations       (Layer 4 - loader)
//   Step 2: Binarise at the threshold   (Layer 4 - preprocessor)
//   Step 3: Check a common dimension    (Layer 3 - domain)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::{load_observations, DataFormat},
    preprocessor::Binarizer,
};
use crate::domain::observation::{common_dim, Observation};

/// Where the observations come from and how to read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub path:        String,
    pub format:      DataFormat,
    pub has_headers: bool,
    /// Values above this become 1, the rest 0
    pub threshold:   f32,
    /// Keep only the first N observations
    pub limit:       Option<usize>,
}

impl DataSource {
    /// Load, binarise and validate. Returns the observations and their dimension.
    pub fn load_binary(&self) -> Result<(Vec<Observation>, usize)> {
        let raw = load_observations(&self.path, self.format, self.has_headers, self.limit)?;
        if raw.is_empty() {
            bail!("No observations found in '{}'", self.path);
        }

        let observations = Binarizer::new(self.threshold).apply_all(raw);
        let Some(dim) = common_dim(&observations) else {
            bail!("Observations in '{}' do not share one dimension", self.path);
        };
        if dim == 0 {
            bail!("Observations in '{}' have no values", self.path);
        }

        Ok((observations, dim))
    }
}
