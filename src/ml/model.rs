// ============================================================
// Layer 5 — Variational Autoencoder
// ============================================================
// Generative model over binary vectors x ∈ {0,1}^D:
//
//   p(z)       = N(0, I)                      z ∈ R^L
//   p(x | z)   = Π_j Bernoulli(x_j | θ_j),    θ = decoder(z)
//   q(z | x)   = N(μ, diag(σ²)),              (μ, log σ) = encoder(x)
//
// Training maximises the evidence lower bound per observation:
//
//   ELBO(x) = E_q[log p(x|z)] - KL(q(z|x) || p(z))
//
// The expectation is estimated with ONE reparametrized draw
//   z = μ + ε · σ,   ε ~ N(0, I)
// so gradients flow through μ and σ.
//
// Reference: Kingma & Welling (2014) Auto-Encoding Variational Bayes

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::{activation, Distribution},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct VaeConfig {
    /// Dimension of the observed data x
    pub input_dim:  usize,
    /// Dimension of the latent variable z
    pub latent_dim: usize,
    /// Hidden width of the encoder and decoder networks
    #[config(default = 100)]
    pub hidden_dim: usize,
}

impl VaeConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Vae<B> {
        let encoder = Encoder {
            hidden:   LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            mu:       LinearConfig::new(self.hidden_dim, self.latent_dim).init(device),
            logsigma: LinearConfig::new(self.hidden_dim, self.latent_dim).init(device),
        };
        let decoder = Decoder {
            hidden: LinearConfig::new(self.latent_dim, self.hidden_dim).init(device),
            output: LinearConfig::new(self.hidden_dim, self.input_dim).init(device),
        };
        Vae {
            encoder,
            decoder,
            input_dim:  self.input_dim,
            latent_dim: self.latent_dim,
        }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
/// x → ReLU(hidden) → (μ, log σ), two linear heads on a shared hidden layer.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub hidden:   Linear<B>,
    pub mu:       Linear<B>,
    pub logsigma: Linear<B>,
}

impl<B: Backend> Encoder<B> {
    /// x: [batch, input_dim] → (mu, logsigma): [batch, latent_dim] each
    pub fn forward(&self, x: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let h = activation::relu(self.hidden.forward(x));
        (self.mu.forward(h.clone()), self.logsigma.forward(h))
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
/// z → ReLU(hidden) → logits, θ = sigmoid(logits).
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> Decoder<B> {
    /// z: [batch, latent_dim] → logits: [batch, input_dim]
    pub fn forward_logits(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        let h = activation::relu(self.hidden.forward(z));
        self.output.forward(h)
    }

    /// z: [batch, latent_dim] → θ ∈ (0, 1): [batch, input_dim]
    pub fn forward(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::sigmoid(self.forward_logits(z))
    }
}

// ─── Vae ──────────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Vae<B: Backend> {
    pub encoder:    Encoder<B>,
    pub decoder:    Decoder<B>,
    pub input_dim:  usize,
    pub latent_dim: usize,
}

/// Per-observation terms of the ELBO, each of shape [batch].
#[derive(Debug, Clone)]
pub struct ElboOutput<B: Backend> {
    pub elbo:           Tensor<B, 1>,
    pub reconstruction: Tensor<B, 1>,
    pub kl:             Tensor<B, 1>,
}

/// Bernoulli log-likelihood Σ_j x log θ + (1 - x) log(1 - θ), θ = sigmoid(logits).
///
/// Written with log_sigmoid(l) = log θ and log_sigmoid(-l) = log(1 - θ)
/// so a saturated θ never produces log(0).
pub fn bernoulli_log_likelihood<B: Backend>(
    x:      Tensor<B, 2>,
    logits: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_theta     = activation::log_sigmoid(logits.clone());
    let log_one_minus = activation::log_sigmoid(logits.neg());
    let not_x         = x.clone().neg().add_scalar(1.0);

    (x * log_theta + not_x * log_one_minus)
        .sum_dim(1)
        .squeeze::<1>(1)
}

impl<B: Backend> Vae<B> {
    /// Draw one z_i ~ q_i(z) per observation: z = μ + ε · exp(log σ).
    pub fn sample_with_reparametrization(
        &self,
        mu:       Tensor<B, 2>,
        logsigma: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let epsilon = Tensor::random(mu.shape(), Distribution::Normal(0.0, 1.0), &mu.device());
        mu + epsilon * logsigma.exp()
    }

    /// KL(q_i(z) || N(0, I)) for each q_i in the batch: [batch].
    ///
    /// Closed form for a diagonal Gaussian with log standard deviations:
    ///   -0.5 · Σ_j (1 + 2 log σ_j - μ_j² - exp(2 log σ_j))
    pub fn kl_divergence(&self, mu: Tensor<B, 2>, logsigma: Tensor<B, 2>) -> Tensor<B, 1> {
        let two_logsigma = logsigma * 2.0;
        let terms = two_logsigma.clone().add_scalar(1.0)
            - mu.clone() * mu
            - two_logsigma.exp();

        terms.sum_dim(1).squeeze::<1>(1).mul_scalar(-0.5)
    }

    /// Single-sample Monte-Carlo estimate of every ELBO term.
    pub fn elbo_terms(&self, x: Tensor<B, 2>) -> ElboOutput<B> {
        let (mu, logsigma) = self.encoder.forward(x.clone());
        let z = self.sample_with_reparametrization(mu.clone(), logsigma.clone());
        let logits = self.decoder.forward_logits(z);

        let reconstruction = bernoulli_log_likelihood(x, logits);
        let kl             = self.kl_divergence(mu, logsigma);
        let elbo           = reconstruction.clone() - kl.clone();

        ElboOutput { elbo, reconstruction, kl }
    }

    /// MC estimate of the ELBO for each observation: [batch].
    pub fn elbo(&self, x: Tensor<B, 2>) -> Tensor<B, 1> {
        self.elbo_terms(x).elbo
    }

    /// Training objective: the negative mean ELBO over the batch.
    pub fn forward_loss(&self, x: Tensor<B, 2>) -> (Tensor<B, 1>, ElboOutput<B>) {
        let terms = self.elbo_terms(x);
        let loss  = terms.elbo.clone().mean().neg();
        (loss, terms)
    }

    /// Generate new samples from the model.
    ///
    /// Returns (z, θ, x) with shapes [n, latent_dim], [n, input_dim], [n, input_dim].
    pub fn sample(
        &self,
        num_samples: usize,
        device:      &B::Device,
    ) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
        let z = Tensor::random(
            [num_samples, self.latent_dim],
            Distribution::Normal(0.0, 1.0),
            device,
        );
        let theta = self.decoder.forward(z.clone());

        // x_j = 1 with probability θ_j: compare θ against U(0, 1)
        let u = Tensor::random(theta.shape(), Distribution::Default, device);
        let x = u.lower(theta.clone()).float();

        (z, theta, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use burn::backend::NdArray;
    use burn::module::Param;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;

    fn to_vec<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    fn tensor2(values: Vec<f32>, shape: [usize; 2]) -> Tensor<TestBackend, 2> {
        Tensor::from_data(TensorData::new(values, shape), &Default::default())
    }

    fn small_model() -> Vae<TestBackend> {
        VaeConfig::new(6, 2).with_hidden_dim(8).init(&Default::default())
    }

    #[test]
    fn test_config_default_hidden_dim() {
        let cfg = VaeConfig::new(784, 2);
        assert_eq!(cfg.hidden_dim, 100);
    }

    #[test]
    fn test_encoder_decoder_shapes() {
        let model = small_model();
        let x     = Tensor::<TestBackend, 2>::zeros([3, 6], &Default::default());

        let (mu, logsigma) = model.encoder.forward(x);
        assert_eq!(mu.dims(), [3, 2]);
        assert_eq!(logsigma.dims(), [3, 2]);

        let theta = model.decoder.forward(mu);
        assert_eq!(theta.dims(), [3, 6]);
        assert!(to_vec(theta).iter().all(|&t| t > 0.0 && t < 1.0));
    }

    #[test]
    fn test_kl_zero_at_prior() {
        let model = small_model();
        let zeros = Tensor::<TestBackend, 2>::zeros([4, 2], &Default::default());
        let kl    = to_vec(model.kl_divergence(zeros.clone(), zeros));
        assert_eq!(kl.len(), 4);
        for v in kl {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_kl_known_values() {
        let model = small_model();
        // row 0: μ = (1, 0), log σ = 0      → KL = 0.5 · 1 = 0.5
        // row 1: μ = 0,     log σ = (ln 2, 0) → KL = -0.5 (1 + 2 ln 2 - 4) ≈ 0.8069
        let mu       = tensor2(vec![1.0, 0.0, 0.0, 0.0], [2, 2]);
        let logsigma = tensor2(vec![0.0, 0.0, 2f32.ln(), 0.0], [2, 2]);
        let kl       = to_vec(model.kl_divergence(mu, logsigma));

        assert_abs_diff_eq!(kl[0], 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(kl[1], -0.5 * (1.0 + 2.0 * 2f32.ln() - 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_reparametrization_collapses_with_tiny_sigma() {
        let model    = small_model();
        let mu       = tensor2(vec![0.3, -1.2, 2.0, 0.0], [2, 2]);
        let logsigma = Tensor::<TestBackend, 2>::full([2, 2], -30.0, &Default::default());
        let z        = to_vec(model.sample_with_reparametrization(mu, logsigma));

        for (got, want) in z.iter().zip([0.3, -1.2, 2.0, 0.0]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_bernoulli_log_likelihood_at_half() {
        // logits = 0 → θ = 0.5, so every coordinate contributes ln 0.5
        let x      = tensor2(vec![1.0, 0.0, 1.0, 1.0, 1.0, 0.0], [2, 3]);
        let logits = Tensor::<TestBackend, 2>::zeros([2, 3], &Default::default());
        let ll     = to_vec(bernoulli_log_likelihood(x, logits));

        for v in ll {
            assert_abs_diff_eq!(v, 3.0 * 0.5f32.ln(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_bernoulli_log_likelihood_is_finite_when_saturated() {
        let x      = tensor2(vec![0.0, 1.0], [1, 2]);
        let logits = tensor2(vec![200.0, -200.0], [1, 2]);
        let ll     = to_vec(bernoulli_log_likelihood(x, logits));
        assert!(ll[0].is_finite());
        assert!(ll[0] < -300.0);
    }

    #[test]
    fn test_elbo_decomposes() {
        let model = small_model();
        let x     = tensor2(vec![1.0, 0.0, 1.0, 0.0, 1.0, 1.0], [1, 6]);
        let out   = model.elbo_terms(x);

        let elbo  = to_vec(out.elbo);
        let recon = to_vec(out.reconstruction);
        let kl    = to_vec(out.kl);

        assert_eq!(elbo.len(), 1);
        assert!(recon[0] <= 0.0);
        assert!(kl[0] >= 0.0);
        assert_abs_diff_eq!(elbo[0], recon[0] - kl[0], epsilon = 1e-5);
    }

    #[test]
    fn test_elbo_is_bounded_by_zero_for_binary_data() {
        let model = small_model();
        let x     = tensor2(vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0], [2, 6]);
        let elbo  = to_vec(model.elbo(x));
        assert_eq!(elbo.len(), 2);
        assert!(elbo.iter().all(|&e| e.is_finite() && e < 0.0));
    }

    #[test]
    fn test_forward_loss_is_negative_mean_elbo() {
        let model   = small_model();
        let x       = Tensor::<TestBackend, 2>::ones([5, 6], &Default::default());
        let (loss, terms) = model.forward_loss(x);

        let loss = to_vec(loss)[0];
        let mean = to_vec(terms.elbo).iter().sum::<f32>() / 5.0;
        assert_abs_diff_eq!(loss, -mean, epsilon = 1e-4);
        assert!(loss > 0.0);
    }

    #[test]
    fn test_sample_shapes_and_binary_output() {
        let model        = small_model();
        let (z, theta, x) = model.sample(7, &Default::default());

        assert_eq!(z.dims(), [7, 2]);
        assert_eq!(theta.dims(), [7, 6]);
        assert_eq!(x.dims(), [7, 6]);
        assert!(to_vec(x).iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_sample_frequencies_follow_theta() {
        TestBackend::seed(11);
        let device    = Default::default();
        let mut model = small_model();
        // zero weights pin θ_j = sigmoid(b_j) for every z
        let logits: [f32; 6] = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        model.decoder.output.weight =
            Param::from_tensor(Tensor::zeros([8, 6], &device));
        model.decoder.output.bias = Some(Param::from_tensor(Tensor::from_data(
            TensorData::new(logits.to_vec(), [6]),
            &device,
        )));

        let n = 4000;
        let (_, theta, x) = model.sample(n, &device);
        let theta_mean = to_vec(theta.mean_dim(0));
        let x_mean     = to_vec(x.mean_dim(0));

        for ((freq, t), l) in x_mean.iter().zip(&theta_mean).zip(logits) {
            assert_abs_diff_eq!(*t, 1.0 / (1.0 + (-l).exp()), epsilon = 1e-5);
            assert_abs_diff_eq!(*freq, *t, epsilon = 0.04);
        }
    }

    #[test]
    fn test_reparametrization_scales_noise_by_sigma() {
        TestBackend::seed(5);
        let model    = small_model();
        let mu       = tensor2(vec![1.5; 4000], [2000, 2]);
        let logsigma = Tensor::<TestBackend, 2>::full([2000, 2], 2f32.ln(), &Default::default());
        let z        = to_vec(model.sample_with_reparametrization(mu, logsigma));

        let n    = z.len() as f32;
        let mean = z.iter().map(|v| v - 1.5).sum::<f32>() / n;
        let var  = z.iter().map(|v| (v - 1.5 - mean).powi(2)).sum::<f32>() / n;

        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(var.sqrt(), 2.0, epsilon = 0.1);
    }
}
