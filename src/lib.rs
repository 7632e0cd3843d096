//! Sequence generation and streaming-data primitives for seq2seq models.
//!
//! This crate provides the two stateful engines of a translation harness
//! without any model-specific implementations: beam search decoding over an
//! external [`Seq2SeqModel`] collaborator, and deterministic, resumable
//! shuffling of record streams for training input.

pub mod attn;
pub mod data;
pub mod error;
pub mod model;
pub mod search;
pub mod tokenizer;
pub mod vocab;

// Re-export commonly used items
pub use attn::{AttnWeightSink, NoopAttnSink, StoreAttentionWeights};
pub use data::{DataPipeline, SequenceSource, ShuffleStage, ShuffleState};
pub use error::{PipelineError, SearchError};
pub use model::Seq2SeqModel;
pub use search::{BeamSearchDecoder, BeamSearchParams, Hypothesis, Prefix};
pub use tokenizer::{DictTokenizer, TextTokenizer};
pub use vocab::VocabularyInfo;

// Prelude for easy imports
pub mod prelude {
    pub use crate::data::{DataPipeline, SequenceSource, ShuffleStage};
    pub use crate::model::Seq2SeqModel;
    pub use crate::search::{BeamSearchDecoder, BeamSearchParams, Prefix};
    pub use crate::vocab::VocabularyInfo;
}

#[cfg(test)]
mod tests;
