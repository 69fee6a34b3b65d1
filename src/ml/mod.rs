// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model math lives here:
//
//   model.rs      — Encoder, Decoder and the Vae module:
//                   reparametrization, closed-form KL,
//                   Bernoulli log-likelihood, ELBO, sampling
//
//   trainer.rs    — Adam training loop with validation ELBO,
//                   per-epoch checkpoints and metrics
//
//   inferencer.rs — Loads a checkpoint and evaluates, encodes
//                   or samples without autodiff
//
//   backend.rs    — The CPU (NdArray) and WGPU backends the
//                   CLI can choose from
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Kingma & Welling (2014) Auto-Encoding Variational Bayes

/// Concrete backend choices
pub mod backend;

/// Variational autoencoder architecture
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference on a trained checkpoint
pub mod inferencer;
