//! Tokenizer variants sharing a common batch encode/decode contract.

mod dict;

pub use dict::DictTokenizer;

use anyhow::Result;
use ndarray::Array2;

use crate::vocab::VocabularyInfo;

/// Batch tokenization contract shared by all tokenizer variants.
pub trait TextTokenizer {
    fn vocab(&self) -> &VocabularyInfo;

    /// Encode sentences into a right-padded token matrix, one row per
    /// sentence, BOS-prefixed and EOS-terminated. `bos` overrides the
    /// default BOS index (used e.g. for target-language tags).
    fn encode_batch(&self, sentences: &[&str], bos: Option<u32>) -> Result<Array2<u32>>;

    /// Decode a token matrix back into one string per row, dropping
    /// special tokens.
    fn decode_batch(&self, tokens: &Array2<u32>) -> Result<Vec<String>>;
}

/// Right-pad rows of token ids into a rectangular matrix.
pub fn pad_batch(rows: &[Vec<u32>], pad_idx: u32) -> Array2<u32> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = Array2::from_elem((rows.len(), width), pad_idx);
    for (r, tokens) in rows.iter().enumerate() {
        for (c, &t) in tokens.iter().enumerate() {
            out[[r, c]] = t;
        }
    }
    out
}
