// ============================================================
// Layer 4 — Observation Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<Observation>
// into one float tensor.
//
//   Input:  N observations, each of length D
//   Output: ObservationBatch with x of shape [N, D]
//
// All observations are flattened into one Vec<f32> in order,
// then wrapped with the [N, D] shape:
//   [o1_v1, ..., o1_vD, o2_v1, ..., oN_vD] → [N, D]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::observation::Observation;

/// A mini-batch of binary observations, x: [batch_size, input_dim]
#[derive(Debug, Clone)]
pub struct ObservationBatch<B: Backend> {
    pub x: Tensor<B, 2>,
}

/// Holds the target device so tensors land on the right CPU/GPU.
#[derive(Clone, Debug)]
pub struct ObservationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ObservationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Stack observations into a [N, D] tensor on `device`.
/// Shared by the batcher and the inferencer.
pub fn observations_to_tensor<B: Backend>(
    items:  &[Observation],
    device: &B::Device,
) -> Tensor<B, 2> {
    let batch_size = items.len();
    let input_dim  = items.first().map(Observation::dim).unwrap_or(0);

    let flat: Vec<f32> = items
        .iter()
        .flat_map(|o| o.values.iter().copied())
        .collect();

    Tensor::<B, 2>::from_data(TensorData::new(flat, [batch_size, input_dim]), device)
}

impl<B: Backend> Batcher<Observation, ObservationBatch<B>> for ObservationBatcher<B> {
    fn batch(&self, items: Vec<Observation>) -> ObservationBatch<B> {
        ObservationBatch { x: observations_to_tensor(&items, &self.device) }
    }
}
