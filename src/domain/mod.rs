// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: binary observations going in, latent codes,
// generated samples and ELBO reports coming out.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything here is testable without a tensor backend.

// A single observed data point x
pub mod observation;

// Outputs of the model: posterior parameters and generated samples
pub mod latent;

// Aggregated ELBO estimate over a dataset
pub mod report;

// Core abstractions (traits) that other layers implement
pub mod traits;
