// ============================================================
// Layer 4 — Binarizer
// ============================================================
// The decoder parameterises a Bernoulli distribution per
// coordinate, so the log-likelihood
//
//     sum_j x_j log(theta_j) + (1 - x_j) log(1 - theta_j)
//
// only has its intended meaning for x_j in {0, 1}.
// Grey-scale inputs (MNIST pixels in [0, 1]) are thresholded:
//
//     x_j = 1  if v_j > threshold
//     x_j = 0  otherwise

use crate::domain::observation::Observation;

#[derive(Debug, Clone, Copy)]
pub struct Binarizer {
    threshold: f32,
}

impl Binarizer {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Binarise one observation
    pub fn apply(&self, obs: &Observation) -> Observation {
        Observation::new(
            obs.values
                .iter()
                .map(|&v| if v > self.threshold { 1.0 } else { 0.0 })
                .collect(),
        )
    }

    /// Binarise a whole dataset, consuming it
    pub fn apply_all(&self, observations: Vec<Observation>) -> Vec<Observation> {
        let already_binary = observations.iter().filter(|o| o.is_binary()).count();
        tracing::debug!(
            "Binarising {} observations at threshold {} ({} already binary)",
            observations.len(),
            self.threshold,
            already_binary,
        );
        observations.iter().map(|o| self.apply(o)).collect()
    }
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new(0.5)
    }
}
