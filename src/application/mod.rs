// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal per CLI command.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

// Loading + binarising observations, shared by every use case
pub mod data_source;

// Fit the VAE
pub mod train_use_case;

// ELBO on a dataset
pub mod evaluate_use_case;

// Draw from the generative model
pub mod sample_use_case;

// Latent embeddings of a dataset
pub mod encode_use_case;
