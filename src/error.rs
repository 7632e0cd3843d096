//! Common error types for straumur.

use thiserror::Error;

/// Errors reported by beam search decoding.
///
/// Configuration problems are reported synchronously at call time; model
/// failures surface through the [`Model`](SearchError::Model) variant.
#[derive(Debug, Error)]
pub enum SearchError {
    /// `top` must be between 1 and `beam_size`.
    #[error("`top` must be between 1 and beam_size ({beam_size}), got {top}")]
    InvalidTop { top: usize, beam_size: usize },

    /// Beam width of zero cannot hold a hypothesis.
    #[error("beam_size must be at least 1")]
    InvalidBeamSize,

    /// A zero-length generation budget is a configuration error.
    #[error("max_len must be at least 1")]
    InvalidMaxLen,

    /// A per-row prefix must have one row per source item.
    #[error("prefix has {got} rows but the source batch has {expected}")]
    PrefixBatchMismatch { expected: usize, got: usize },

    /// Forced prefix tokens count toward the generation budget.
    #[error("prefix length {len} exceeds max_len {max_len}")]
    PrefixTooLong { len: usize, max_len: usize },

    /// The model broke the decode-step contract.
    #[error(
        "model returned log-probs of shape ({rows}, {cols}), expected ({expected_rows}, {vocab})"
    )]
    BadModelOutput {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        vocab: usize,
    },

    /// Failure inside the model collaborator.
    #[error("model error: {0}")]
    Model(#[from] anyhow::Error),
}

/// Errors reported by data pipeline stages.
///
/// Exhaustion is not an error; stages signal it through `Ok(None)`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A strict stage was asked to restore a checkpoint that carries no
    /// buffer contents (it was captured with `strict(false)`).
    #[error(
        "checkpoint carries no buffer contents; restore into a stage built \
         with strict(false) to refill from upstream instead"
    )]
    BufferNotReconstructible,

    /// A checkpoint points past the end of the sequence it is restored
    /// into; the state belongs to a different or longer sequence.
    #[error("checkpoint position {pos} is past the end of the sequence ({len} records)")]
    PositionOutOfRange { pos: usize, len: usize },

    /// Failure inside the upstream source.
    #[error("source error: {0}")]
    Source(#[from] anyhow::Error),
}
