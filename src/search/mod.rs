//! Beam search decoding over sequence-to-sequence models.

mod beam;
mod decoder;

pub use beam::Hypothesis;
pub use decoder::{BeamSearchDecoder, BeamSearchParams, Prefix};
