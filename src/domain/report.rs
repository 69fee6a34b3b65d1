use serde::{Deserialize, Serialize};

/// Dataset-level Monte-Carlo estimate of the ELBO.
///
/// All three quantities are means over observations (nats per
/// observation), with elbo = reconstruction - kl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub observations: usize,
    pub elbo: f64,
    pub reconstruction: f64,
    pub kl: f64,
    /// Reparametrized draws averaged per observation
    pub mc_samples: usize,
}

impl EvalReport {
    /// The training objective, -ELBO
    pub fn loss(&self) -> f64 {
        -self.elbo
    }
}

impl std::fmt::Display for EvalReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "observations={} | elbo={:.4} | reconstruction={:.4} | kl={:.4} | mc_samples={}",
            self.observations, self.elbo, self.reconstruction, self.kl, self.mc_samples,
        )
    }
}
