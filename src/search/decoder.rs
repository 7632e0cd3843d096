use log::{debug, warn};
use ndarray::{s, Array2};

use crate::error::SearchError;
use crate::model::Seq2SeqModel;
use crate::search::beam::{select_candidates, Beam, Hypothesis};
use crate::vocab::VocabularyInfo;

/// Parameters for beam search decoding.
#[derive(Clone, Debug)]
pub struct BeamSearchParams {
    /// Number of hypotheses kept per source row.
    pub beam_size: usize,
    /// Maximum number of generated tokens per row (the seed token excluded).
    pub max_len: usize,
    /// Subtracted from the UNK log-probability at every free step.
    pub unk_penalty: f32,
}

impl Default for BeamSearchParams {
    fn default() -> Self {
        Self {
            beam_size: 4,
            max_len: 128,
            unk_penalty: 0.0,
        }
    }
}

/// Tokens forced at the start of generation, before free decoding begins.
///
/// The first forced token replaces the BOS seed, so the prefix occupies the
/// leading output positions. Remaining forced tokens bypass scoring and
/// selection entirely, appended at zero log-probability cost, and the whole
/// prefix counts toward `max_len`.
#[derive(Debug, Clone)]
pub enum Prefix {
    /// One token seeding every row in place of BOS.
    Token(u32),
    /// The same sequence forced for every row.
    Tokens(Vec<u32>),
    /// A distinct forced sequence per source row, one row each.
    PerRow(Array2<u32>),
}

impl Prefix {
    fn steps(&self) -> usize {
        match self {
            Prefix::Token(_) => 1,
            Prefix::Tokens(tokens) => tokens.len(),
            Prefix::PerRow(tokens) => tokens.ncols(),
        }
    }

    fn token_for(&self, row: usize, step: usize) -> u32 {
        match self {
            Prefix::Token(token) => *token,
            Prefix::Tokens(tokens) => tokens[step],
            Prefix::PerRow(tokens) => tokens[[row, step]],
        }
    }
}

/// Beam search over a [`Seq2SeqModel`].
///
/// Maintains one beam of candidate hypotheses per source row, extending,
/// pruning and finalizing them step by step. Ranking is by raw cumulative
/// log-probability; no length normalization is applied.
#[derive(Debug, Clone)]
pub struct BeamSearchDecoder {
    vocab: VocabularyInfo,
    params: BeamSearchParams,
}

impl BeamSearchDecoder {
    pub fn new(vocab: VocabularyInfo, params: BeamSearchParams) -> Result<Self, SearchError> {
        if params.beam_size == 0 {
            return Err(SearchError::InvalidBeamSize);
        }
        if params.max_len == 0 {
            return Err(SearchError::InvalidMaxLen);
        }
        Ok(Self { vocab, params })
    }

    /// Decode `src_tokens` and return the `top` best finished sequences per
    /// source row, highest score first.
    ///
    /// The output has `batch * top` rows, right-padded with the pad index to
    /// the longest selected sequence. Every row starts with BOS, or with the
    /// forced prefix in its place when one is supplied, and ends with EOS
    /// unless it was truncated at `max_len`.
    pub fn generate<M: Seq2SeqModel>(
        &self,
        model: &M,
        src_tokens: &Array2<u32>,
        prefix: Option<&Prefix>,
        top: usize,
    ) -> Result<Array2<u32>, SearchError> {
        let prefix = prefix.filter(|p| p.steps() > 0);
        let batch = src_tokens.nrows();
        let beam_size = self.params.beam_size;

        if top == 0 || top > beam_size {
            return Err(SearchError::InvalidTop { top, beam_size });
        }
        if let Some(p) = prefix {
            if p.steps() > self.params.max_len {
                return Err(SearchError::PrefixTooLong {
                    len: p.steps(),
                    max_len: self.params.max_len,
                });
            }
            if let Prefix::PerRow(rows) = p {
                if rows.nrows() != batch {
                    return Err(SearchError::PrefixBatchMismatch {
                        expected: batch,
                        got: rows.nrows(),
                    });
                }
            }
        }

        let encoder_state = model.encode(src_tokens)?;
        let mut beams: Vec<Beam> = (0..batch)
            .map(|row| {
                let seed = match prefix {
                    Some(p) => p.token_for(row, 0),
                    None => self.vocab.bos_idx,
                };
                Beam::new(beam_size, seed)
            })
            .collect();

        let mut row_map = live_row_map(&beams);
        let mut step_state = model.reorder_state(&encoder_state, &row_map)?;

        for step in 0..self.params.max_len {
            if beams.iter().all(Beam::is_complete) {
                debug!("all beams complete after {step} steps");
                break;
            }
            let live_map = live_row_map(&beams);
            if live_map != row_map {
                step_state = model.reorder_state(&encoder_state, &live_map)?;
                row_map = live_map;
            }

            let tokens = live_tokens(&beams, step + 1);
            let log_probs = model.decode_step(&step_state, &tokens)?;
            if log_probs.nrows() != row_map.len() || log_probs.ncols() != self.vocab.size {
                return Err(SearchError::BadModelOutput {
                    rows: log_probs.nrows(),
                    cols: log_probs.ncols(),
                    expected_rows: row_map.len(),
                    vocab: self.vocab.size,
                });
            }

            // Forced prefix steps append at zero cost and skip selection.
            // The first prefix token is the seed, so step N forces token
            // N + 1. The model is still stepped so attention observers fire
            // once per step, forced or free.
            if let Some(p) = prefix.filter(|p| step + 1 < p.steps()) {
                for (row, beam) in beams.iter_mut().enumerate() {
                    let forced = p.token_for(row, step + 1);
                    for hyp in &mut beam.live {
                        hyp.tokens.push(forced);
                    }
                }
                continue;
            }

            let mut offset = 0;
            for beam in beams.iter_mut() {
                let width = beam.live.len();
                if width == 0 {
                    continue;
                }
                let rows = log_probs.slice(s![offset..offset + width, ..]);
                offset += width;

                let selected = select_candidates(
                    rows,
                    &beam.live,
                    self.vocab.unk_idx,
                    self.params.unk_penalty,
                    width,
                );

                let mut next_live = Vec::with_capacity(width);
                for cand in selected {
                    let mut tokens = beam.live[cand.hyp].tokens.clone();
                    tokens.push(cand.token);
                    let hyp = Hypothesis {
                        tokens,
                        score: cand.score,
                    };
                    if cand.token == self.vocab.eos_idx {
                        beam.finished.push(hyp);
                    } else {
                        next_live.push(hyp);
                    }
                }
                beam.live = next_live;
            }
        }

        // Out of budget: force-finalize survivors by truncation.
        for beam in &mut beams {
            for hyp in beam.live.drain(..) {
                if hyp.score != f32::NEG_INFINITY {
                    beam.finished.push(hyp);
                }
            }
            beam.finished.sort_by(|a, b| b.score.total_cmp(&a.score));
        }

        Ok(self.assemble(&beams, batch, top))
    }

    fn assemble(&self, beams: &[Beam], batch: usize, top: usize) -> Array2<u32> {
        let width = beams
            .iter()
            .flat_map(|b| b.finished.iter().take(top))
            .map(|h| h.tokens.len())
            .max()
            .unwrap_or(1);

        let mut out = Array2::from_elem((batch * top, width), self.vocab.pad_idx);
        for (row, beam) in beams.iter().enumerate() {
            if beam.finished.len() < top {
                warn!(
                    "row {row} finished {} hypotheses, fewer than top={top}; \
                     missing rows stay padded",
                    beam.finished.len()
                );
            }
            for (i, hyp) in beam.finished.iter().take(top).enumerate() {
                for (col, &token) in hyp.tokens.iter().enumerate() {
                    out[[row * top + i, col]] = token;
                }
            }
        }
        out
    }
}

/// Source row index of every live hypothesis, in decode-batch order.
fn live_row_map(beams: &[Beam]) -> Vec<usize> {
    let mut map = Vec::new();
    for (row, beam) in beams.iter().enumerate() {
        map.extend(std::iter::repeat(row).take(beam.live.len()));
    }
    map
}

/// Token matrix of every live hypothesis. All live hypotheses share the
/// same length at a given step, so the matrix is rectangular.
fn live_tokens(beams: &[Beam], len: usize) -> Array2<u32> {
    let rows: usize = beams.iter().map(|b| b.live.len()).sum();
    let mut tokens = Array2::zeros((rows, len));
    let mut r = 0;
    for beam in beams {
        for hyp in &beam.live {
            debug_assert_eq!(hyp.tokens.len(), len);
            for (c, &t) in hyp.tokens.iter().enumerate() {
                tokens[[r, c]] = t;
            }
            r += 1;
        }
    }
    tokens
}
