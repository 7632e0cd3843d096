//! Pluggable observation of per-step attention weights.
//!
//! Models that expose cross-attention can report the raw per-step weight
//! matrix, shaped `(rows, 1, source_len)`, to an injected sink once per
//! decode step. Production code passes [`NoopAttnSink`]; tests and analysis
//! tools pass [`StoreAttentionWeights`].

use std::sync::Mutex;

use ndarray::Array3;

/// Receives one attention weight matrix per decode step.
pub trait AttnWeightSink: Send + Sync {
    fn observe(&self, weights: &Array3<f32>);
}

/// Discards every observation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAttnSink;

impl AttnWeightSink for NoopAttnSink {
    fn observe(&self, _weights: &Array3<f32>) {}
}

/// Collects every observed weight matrix in order.
#[derive(Debug, Default)]
pub struct StoreAttentionWeights {
    weights: Mutex<Vec<Array3<f32>>>,
}

impl StoreAttentionWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.weights.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the collected matrices, leaving the sink empty.
    pub fn take(&self) -> Vec<Array3<f32>> {
        std::mem::take(&mut self.weights.lock().unwrap())
    }
}

impl AttnWeightSink for StoreAttentionWeights {
    fn observe(&self, weights: &Array3<f32>) {
        self.weights.lock().unwrap().push(weights.clone());
    }
}
