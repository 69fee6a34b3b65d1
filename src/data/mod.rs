// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from a file on disk to tensor batches:
//
//   CSV / IDX file
//       │
//       ▼
//   loader            → reads rows or images into Observations
//       │
//       ▼
//   Binarizer         → thresholds values to {0, 1}
//       │
//       ▼
//   split_train_val   → seeded shuffle + split
//       │
//       ▼
//   ObservationDataset → implements Burn's Dataset trait
//       │
//       ▼
//   ObservationBatcher → stacks observations into [N, D] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// CSV and IDX observation loaders
pub mod loader;

/// Thresholds raw values to binary
pub mod preprocessor;

/// Implements Burn's Dataset trait for observations
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
