// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits rather
// than concrete loaders or writers:
//   - CsvLoader and IdxLoader implement ObservationSource
//   - LatentCode and GeneratedSample implement RowExport

use anyhow::Result;
use crate::domain::observation::Observation;

// ─── ObservationSource ────────────────────────────────────────────────────────
/// Any component that can load observations from a source.
///
/// Implementations:
///   - CsvLoader → one observation per CSV row
///   - IdxLoader → MNIST-style IDX image files
pub trait ObservationSource {
    /// Load all observations from this source, in file order.
    fn load_all(&self) -> Result<Vec<Observation>>;
}

// ─── RowExport ────────────────────────────────────────────────────────────────
/// A record that can be written as one CSV row.
///
/// The header is taken from the first record, so every record
/// in an export must have the same shape.
pub trait RowExport {
    /// Column names for this record's shape
    fn header(&self) -> Vec<String>;

    /// Column values, same length as `header()`
    fn to_row(&self) -> Vec<String>;
}
