use anyhow::Result;
use ndarray::Array2;

/// The forward-computation contract of a trained sequence-to-sequence model.
///
/// The decoder drives the model one step at a time: it encodes the source
/// batch once, then repeatedly asks for next-token log-probabilities given
/// the tokens generated so far. Rows of the decode batch correspond to live
/// hypotheses, so the model must be able to re-align its encoder
/// representation with an arbitrary row mapping via [`reorder_state`].
///
/// [`reorder_state`]: Seq2SeqModel::reorder_state
pub trait Seq2SeqModel {
    /// Opaque encoder representation of a source batch.
    type EncoderState;

    /// Encode a padded batch of source token sequences.
    fn encode(&self, src_tokens: &Array2<u32>) -> Result<Self::EncoderState>;

    /// One decode step: given the encoder state and the tokens generated so
    /// far (one row per live hypothesis), return next-token
    /// log-probabilities of shape `(rows, vocab_size)`.
    fn decode_step(
        &self,
        encoder_state: &Self::EncoderState,
        tokens: &Array2<u32>,
    ) -> Result<Array2<f32>>;

    /// Build an encoder state whose row `i` is row `rows[i]` of the original
    /// source batch. Rows may repeat (beam expansion) or drop out
    /// (finalized hypotheses).
    fn reorder_state(
        &self,
        encoder_state: &Self::EncoderState,
        rows: &[usize],
    ) -> Result<Self::EncoderState>;
}
