// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting file I/O that doesn't belong to one layer:
//
//   checkpoint.rs — Saving and loading model weights with
//                   Burn's CompactRecorder, plus TrainConfig
//                   as JSON so inference can rebuild the model.
//
//   metrics.rs    — Epoch-level ELBO / KL / reconstruction
//                   metrics appended to metrics.csv.
//
//   export.rs     — Latent codes and generated samples
//                   written out as CSV.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// CSV export of model outputs
pub mod export;
