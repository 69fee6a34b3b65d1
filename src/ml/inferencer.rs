// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads a trained VAE from a checkpoint and runs it without
// autodiff. Three jobs:
//
//   evaluate — MC estimate of the ELBO on a dataset
//   encode   — posterior parameters (μ, log σ) per observation
//   sample   — z ~ N(0, I) → θ = decoder(z) → x ~ Bernoulli(θ)

use anyhow::{anyhow, ensure, Result};
use burn::{prelude::*, tensor::ElementConversion};

use crate::data::batcher::observations_to_tensor;
use crate::domain::{
    latent::{GeneratedSample, LatentCode},
    observation::Observation,
    report::EvalReport,
};
use crate::infra::checkpoint::{CheckpointManager, EpochSelector};
use crate::ml::backend::{BackendKind, CpuBackend, CpuDevice, GpuBackend, GpuDevice};
use crate::ml::model::Vae;

fn to_rows<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<Vec<f32>>> {
    let [_, width] = tensor.dims();
    let flat = tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read tensor data: {e:?}"))?;
    Ok(flat.chunks(width.max(1)).map(<[f32]>::to_vec).collect())
}

fn scalar_sum<B: Backend>(tensor: Tensor<B, 1>) -> f64 {
    tensor.sum().into_scalar().elem::<f64>()
}

pub struct Inferencer<B: Backend> {
    model:  Vae<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: Vae<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Rebuild the architecture from train_config.json and load weights.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        selector:     EpochSelector,
        device:       B::Device,
    ) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = cfg.model_config().init::<B>(&device);
        let model = ckpt_manager.load_model(model, selector, &device)?;
        tracing::info!(
            "Model loaded: input_dim={} latent_dim={}",
            model.input_dim, model.latent_dim
        );
        Ok(Self { model, device })
    }

    pub fn input_dim(&self) -> usize {
        self.model.input_dim
    }

    /// Seed the backend RNG used for ε and Bernoulli draws
    pub fn seed(&self, seed: u64) {
        B::seed(seed);
    }

    fn check_dims(&self, observations: &[Observation]) -> Result<()> {
        let expected = self.input_dim();
        if let Some((i, obs)) = observations
            .iter()
            .enumerate()
            .find(|(_, o)| o.dim() != expected)
        {
            anyhow::bail!(
                "Observation {} has dimension {}, the model expects {}",
                i, obs.dim(), expected
            );
        }
        Ok(())
    }

    /// Mean ELBO, reconstruction and KL per observation.
    /// Each observation's terms are averaged over `mc_samples` draws of z.
    pub fn evaluate(
        &self,
        observations: &[Observation],
        batch_size:   usize,
        mc_samples:   usize,
    ) -> Result<EvalReport> {
        ensure!(!observations.is_empty(), "Nothing to evaluate");
        ensure!(batch_size > 0 && mc_samples > 0, "batch size and MC samples must be positive");
        self.check_dims(observations)?;

        let (mut elbo, mut recon, mut kl) = (0.0f64, 0.0f64, 0.0f64);
        for chunk in observations.chunks(batch_size) {
            let x = observations_to_tensor::<B>(chunk, &self.device);
            for _ in 0..mc_samples {
                let terms = self.model.elbo_terms(x.clone());
                elbo  += scalar_sum(terms.elbo);
                recon += scalar_sum(terms.reconstruction);
                kl    += scalar_sum(terms.kl);
            }
        }

        let denom = (observations.len() * mc_samples) as f64;
        Ok(EvalReport {
            observations:   observations.len(),
            elbo:           elbo / denom,
            reconstruction: recon / denom,
            kl:             kl / denom,
            mc_samples,
        })
    }

    /// Posterior parameters of q(z|x) for every observation, in input order.
    pub fn encode(&self, observations: &[Observation], batch_size: usize) -> Result<Vec<LatentCode>> {
        ensure!(batch_size > 0, "batch size must be positive");
        self.check_dims(observations)?;

        let mut codes = Vec::with_capacity(observations.len());
        for chunk in observations.chunks(batch_size) {
            let x = observations_to_tensor::<B>(chunk, &self.device);
            let (mu, logsigma) = self.model.encoder.forward(x);
            for (mu, logsigma) in to_rows(mu)?.into_iter().zip(to_rows(logsigma)?) {
                codes.push(LatentCode { index: codes.len(), mu, logsigma });
            }
        }
        Ok(codes)
    }

    /// Draw `num_samples` observations from the generative model.
    pub fn sample(&self, num_samples: usize) -> Result<Vec<GeneratedSample>> {
        ensure!(num_samples > 0, "number of samples must be positive");

        let (z, theta, x) = self.model.sample(num_samples, &self.device);
        let samples = to_rows(z)?
            .into_iter()
            .zip(to_rows(theta)?)
            .zip(to_rows(x)?)
            .map(|((z, theta), x)| GeneratedSample { z, theta, x })
            .collect();
        Ok(samples)
    }
}

// ─── LoadedVae ────────────────────────────────────────────────────────────────
/// An Inferencer on whichever backend the user picked.
pub enum LoadedVae {
    Cpu(Inferencer<CpuBackend>),
    Wgpu(Inferencer<GpuBackend>),
}

impl LoadedVae {
    pub fn load(
        backend:      BackendKind,
        ckpt_manager: &CheckpointManager,
        selector:     EpochSelector,
    ) -> Result<Self> {
        Ok(match backend {
            BackendKind::Cpu => LoadedVae::Cpu(Inferencer::from_checkpoint(
                ckpt_manager, selector, CpuDevice::default(),
            )?),
            BackendKind::Wgpu => LoadedVae::Wgpu(Inferencer::from_checkpoint(
                ckpt_manager, selector, GpuDevice::default(),
            )?),
        })
    }

    pub fn input_dim(&self) -> usize {
        match self {
            LoadedVae::Cpu(i)  => i.input_dim(),
            LoadedVae::Wgpu(i) => i.input_dim(),
        }
    }

    pub fn seed(&self, seed: u64) {
        match self {
            LoadedVae::Cpu(i)  => i.seed(seed),
            LoadedVae::Wgpu(i) => i.seed(seed),
        }
    }

    pub fn evaluate(&self, obs: &[Observation], batch_size: usize, mc_samples: usize) -> Result<EvalReport> {
        match self {
            LoadedVae::Cpu(i)  => i.evaluate(obs, batch_size, mc_samples),
            LoadedVae::Wgpu(i) => i.evaluate(obs, batch_size, mc_samples),
        }
    }

    pub fn encode(&self, obs: &[Observation], batch_size: usize) -> Result<Vec<LatentCode>> {
        match self {
            LoadedVae::Cpu(i)  => i.encode(obs, batch_size),
            LoadedVae::Wgpu(i) => i.encode(obs, batch_size),
        }
    }

    pub fn sample(&self, num_samples: usize) -> Result<Vec<GeneratedSample>> {
        match self {
            LoadedVae::Cpu(i)  => i.sample(num_samples),
            LoadedVae::Wgpu(i) => i.sample(num_samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::VaeConfig;
    use approx::assert_abs_diff_eq;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn inferencer() -> Inferencer<TestBackend> {
        let device = Default::default();
        Inferencer::new(VaeConfig::new(4, 3).with_hidden_dim(6).init(&device), device)
    }

    fn data(n: usize) -> Vec<Observation> {
        (0..n)
            .map(|i| Observation::new(vec![(i % 2) as f32, 1.0, 0.0, 1.0]))
            .collect()
    }

    #[test]
    fn test_encode_preserves_order_across_batches() {
        let inf   = inferencer();
        let codes = inf.encode(&data(5), 2).unwrap();
        assert_eq!(codes.len(), 5);
        assert!(codes.iter().enumerate().all(|(i, c)| c.index == i && c.latent_dim() == 3));

        // μ is deterministic: identical observations encode identically
        assert_eq!(codes[0].mu, codes[2].mu);
    }

    #[test]
    fn test_evaluate_report_is_consistent() {
        let inf    = inferencer();
        let report = inf.evaluate(&data(6), 4, 3).unwrap();
        assert_eq!(report.observations, 6);
        assert_eq!(report.mc_samples, 3);
        assert!(report.kl >= 0.0);
        assert!(report.reconstruction <= 0.0);
        assert_abs_diff_eq!(report.elbo, report.reconstruction - report.kl, epsilon = 1e-4);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let inf = inferencer();
        let bad = vec![Observation::new(vec![1.0, 0.0])];
        assert!(inf.evaluate(&bad, 4, 1).is_err());
        assert!(inf.encode(&bad, 4).is_err());
    }

    #[test]
    fn test_sample_outputs() {
        let inf     = inferencer();
        let samples = inf.sample(5).unwrap();
        assert_eq!(samples.len(), 5);
        for s in &samples {
            assert_eq!(s.z.len(), 3);
            assert_eq!(s.theta.len(), 4);
            assert!(s.x.iter().all(|&v| v == 0.0 || v == 1.0));
        }
        assert!(inf.sample(0).is_err());
    }
}
