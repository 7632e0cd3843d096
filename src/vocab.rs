use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Immutable description of a token vocabulary and its special indices.
///
/// Shared read-only by the decoder and tokenizers; never mutated after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyInfo {
    pub size: usize,
    pub bos_idx: u32,
    pub eos_idx: u32,
    pub unk_idx: u32,
    pub pad_idx: u32,
}

impl VocabularyInfo {
    pub fn new(size: usize, bos_idx: u32, eos_idx: u32, unk_idx: u32, pad_idx: u32) -> Result<Self> {
        for idx in [bos_idx, eos_idx, unk_idx, pad_idx] {
            ensure!(
                (idx as usize) < size,
                "special token index {idx} outside vocabulary of size {size}"
            );
        }
        Ok(Self {
            size,
            bos_idx,
            eos_idx,
            unk_idx,
            pad_idx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vocab() {
        let vocab = VocabularyInfo::new(10, 0, 1, 2, 3).unwrap();
        assert_eq!(vocab.size, 10);
        assert_eq!(vocab.eos_idx, 1);
    }

    #[test]
    fn test_special_index_out_of_range() {
        assert!(VocabularyInfo::new(4, 0, 1, 2, 4).is_err());
        assert!(VocabularyInfo::new(0, 0, 0, 0, 0).is_err());
    }
}
