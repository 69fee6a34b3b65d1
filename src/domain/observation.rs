// ============================================================
// Layer 3 — Observation Domain Type
// ============================================================
// One observed data point x, stored as a flat vector of f32.
// Images are flattened row-major before they get here.
//
// The VAE models each coordinate with a Bernoulli likelihood,
// so after binarisation every value is exactly 0.0 or 1.0.

use serde::{Deserialize, Serialize};

/// A single observation fed to the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Flattened feature values, length = input_dim
    pub values: Vec<f32>,
}

impl Observation {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Number of coordinates (the model's input_dim)
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// True if every value is 0.0 or 1.0
    pub fn is_binary(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0 || v == 1.0)
    }
}

/// Check that all observations share one dimensionality and return it.
/// Returns None for an empty slice or on the first mismatch.
pub fn common_dim(observations: &[Observation]) -> Option<usize> {
    let first = observations.first()?.dim();
    observations
        .iter()
        .all(|o| o.dim() == first)
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary() {
        assert!(Observation::new(vec![0.0, 1.0, 1.0]).is_binary());
        assert!(!Observation::new(vec![0.0, 0.5]).is_binary());
    }

    #[test]
    fn test_common_dim() {
        let obs = vec![
            Observation::new(vec![0.0; 4]),
            Observation::new(vec![1.0; 4]),
        ];
        assert_eq!(common_dim(&obs), Some(4));
    }

    #[test]
    fn test_common_dim_mismatch_and_empty() {
        let obs = vec![
            Observation::new(vec![0.0; 4]),
            Observation::new(vec![1.0; 3]),
        ];
        assert_eq!(common_dim(&obs), None);
        assert_eq!(common_dim(&[]), None);
    }
}
