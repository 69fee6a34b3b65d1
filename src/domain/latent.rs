// ============================================================
// Layer 3 — Latent Codes and Generated Samples
// ============================================================
// What comes out of a trained VAE:
//
//   LatentCode      — q(z|x) = N(mu, exp(logsigma)^2) for one x
//   GeneratedSample — one draw of the generative process
//                     z ~ N(0, I), theta = decoder(z), x ~ Bernoulli(theta)

use serde::{Deserialize, Serialize};

use crate::domain::traits::RowExport;

/// Posterior parameters for one encoded observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentCode {
    /// Position of the observation in the input file
    pub index: usize,
    pub mu: Vec<f32>,
    pub logsigma: Vec<f32>,
}

impl LatentCode {
    pub fn latent_dim(&self) -> usize {
        self.mu.len()
    }
}

/// One sample from the generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSample {
    pub z: Vec<f32>,
    /// Bernoulli parameters, each in (0, 1)
    pub theta: Vec<f32>,
    /// Binary draw from Bernoulli(theta)
    pub x: Vec<f32>,
}

fn indexed(prefix: &str, n: usize) -> impl Iterator<Item = String> + '_ {
    (0..n).map(move |i| format!("{prefix}_{i}"))
}

fn fmt_values(values: &[f32]) -> impl Iterator<Item = String> + '_ {
    values.iter().map(|v| format!("{v:.6}"))
}

impl RowExport for LatentCode {
    fn header(&self) -> Vec<String> {
        std::iter::once("index".to_string())
            .chain(indexed("mu", self.latent_dim()))
            .chain(indexed("logsigma", self.latent_dim()))
            .collect()
    }

    fn to_row(&self) -> Vec<String> {
        std::iter::once(self.index.to_string())
            .chain(fmt_values(&self.mu))
            .chain(fmt_values(&self.logsigma))
            .collect()
    }
}

impl RowExport for GeneratedSample {
    fn header(&self) -> Vec<String> {
        indexed("z", self.z.len())
            .chain(indexed("theta", self.theta.len()))
            .chain(indexed("x", self.x.len()))
            .collect()
    }

    fn to_row(&self) -> Vec<String> {
        fmt_values(&self.z)
            .chain(fmt_values(&self.theta))
            // x is binary, print it as an integer
            .chain(self.x.iter().map(|v| format!("{}", *v as u8)))
            .collect()
    }
}
