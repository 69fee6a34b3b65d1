use burn::data::dataset::Dataset;

use crate::domain::observation::Observation;

/// In-memory dataset of binary observations.
pub struct ObservationDataset {
    observations: Vec<Observation>,
    input_dim:    usize,
}

impl ObservationDataset {
    /// All observations are expected to share `dim()`; callers check
    /// this with `domain::observation::common_dim` first.
    pub fn new(observations: Vec<Observation>) -> Self {
        let input_dim = observations.first().map(Observation::dim).unwrap_or(0);
        Self { observations, input_dim }
    }

    pub fn input_dim(&self) -> usize { self.input_dim }

    /// Fraction of ones across every coordinate of every observation
    pub fn mean_activation(&self) -> f64 {
        let total = self.observations.len() * self.input_dim;
        if total == 0 {
            return 0.0;
        }
        let ones: f64 = self
            .observations
            .iter()
            .flat_map(|o| o.values.iter())
            .map(|&v| v as f64)
            .sum();
        ones / total as f64
    }
}

impl Dataset<Observation> for ObservationDataset {
    fn get(&self, index: usize) -> Option<Observation> {
        self.observations.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.observations.len()
    }
}
