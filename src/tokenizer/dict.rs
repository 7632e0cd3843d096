use std::collections::HashMap;

use anyhow::{bail, Result};
use ndarray::Array2;

use crate::tokenizer::{pad_batch, TextTokenizer};
use crate::vocab::VocabularyInfo;

/// Whitespace/dictionary tokenizer.
///
/// Splits sentences on whitespace and maps each word through a fixed
/// dictionary; out-of-vocabulary words become UNK. The four special tokens
/// are always prepended at indices 0..=3.
pub struct DictTokenizer {
    vocab_info: VocabularyInfo,
    indices: HashMap<String, u32>,
    words: Vec<String>,
}

impl DictTokenizer {
    pub fn from_vocab<S: AsRef<str>>(vocab: &[S]) -> Result<Self> {
        let mut words: Vec<String> = ["<UNK>", "<BOS>", "<EOS>", "<PAD>"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        words.extend(vocab.iter().map(|w| w.as_ref().to_string()));

        let mut indices = HashMap::with_capacity(words.len());
        for (idx, word) in words.iter().enumerate() {
            if indices.insert(word.clone(), idx as u32).is_some() {
                bail!("duplicate word in vocabulary: {word:?}");
            }
        }

        let vocab_info = VocabularyInfo::new(words.len(), 1, 2, 0, 3)?;
        Ok(Self {
            vocab_info,
            indices,
            words,
        })
    }
}

impl TextTokenizer for DictTokenizer {
    fn vocab(&self) -> &VocabularyInfo {
        &self.vocab_info
    }

    fn encode_batch(&self, sentences: &[&str], bos: Option<u32>) -> Result<Array2<u32>> {
        let bos = bos.unwrap_or(self.vocab_info.bos_idx);
        let rows: Vec<Vec<u32>> = sentences
            .iter()
            .map(|sentence| {
                let mut tokens = vec![bos];
                for word in sentence.split_whitespace() {
                    tokens.push(
                        self.indices
                            .get(word)
                            .copied()
                            .unwrap_or(self.vocab_info.unk_idx),
                    );
                }
                tokens.push(self.vocab_info.eos_idx);
                tokens
            })
            .collect();
        Ok(pad_batch(&rows, self.vocab_info.pad_idx))
    }

    fn decode_batch(&self, tokens: &Array2<u32>) -> Result<Vec<String>> {
        let special = [
            self.vocab_info.bos_idx,
            self.vocab_info.eos_idx,
            self.vocab_info.pad_idx,
        ];
        let mut sentences = Vec::with_capacity(tokens.nrows());
        for row in tokens.rows() {
            let mut words = Vec::new();
            for &t in row.iter() {
                if special.contains(&t) {
                    continue;
                }
                match self.words.get(t as usize) {
                    Some(word) => words.push(word.as_str()),
                    None => bail!("token id {t} outside vocabulary of size {}", self.words.len()),
                }
            }
            sentences.push(words.join(" "));
        }
        Ok(sentences)
    }
}
