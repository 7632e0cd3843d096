use ndarray::ArrayView2;

/// One candidate output sequence and its cumulative log-probability.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    pub tokens: Vec<u32>,
    pub score: f32,
}

/// A scored continuation of a live hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub hyp: usize,
    pub token: u32,
    pub score: f32,
}

/// Bounded pool of in-progress hypotheses for one source row.
///
/// The live count never exceeds the beam width; every finalized hypothesis
/// frees its slot for good, so the row is complete once `live` is empty.
#[derive(Debug)]
pub(crate) struct Beam {
    pub live: Vec<Hypothesis>,
    pub finished: Vec<Hypothesis>,
}

impl Beam {
    /// Seed `beam_size` hypotheses with one token, BOS or the first forced
    /// prefix token. Only the first scores 0.0; the rest start at negative
    /// infinity so the first free step draws all its continuations from a
    /// single parent instead of duplicating it.
    pub fn new(beam_size: usize, seed_idx: u32) -> Self {
        let live = (0..beam_size)
            .map(|i| Hypothesis {
                tokens: vec![seed_idx],
                score: if i == 0 { 0.0 } else { f32::NEG_INFINITY },
            })
            .collect();
        Self {
            live,
            finished: Vec::with_capacity(beam_size),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.live.is_empty()
    }
}

/// Score every `(hypothesis, token)` continuation and keep the `limit` best.
///
/// `log_probs` row `i` belongs to `live[i]`. The UNK log-probability is
/// lowered by `unk_penalty` before scoring. Ties are broken by token index,
/// then hypothesis index, so selection is fully deterministic.
pub(crate) fn select_candidates(
    log_probs: ArrayView2<f32>,
    live: &[Hypothesis],
    unk_idx: u32,
    unk_penalty: f32,
    limit: usize,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::with_capacity(live.len() * log_probs.ncols());

    for (hyp_idx, (hyp, row)) in live.iter().zip(log_probs.rows()).enumerate() {
        if hyp.score == f32::NEG_INFINITY {
            continue;
        }
        for (token, &lp) in row.iter().enumerate() {
            let token = token as u32;
            let mut score = hyp.score + lp;
            if token == unk_idx {
                score -= unk_penalty;
            }
            candidates.push(Candidate {
                hyp: hyp_idx,
                token,
                score,
            });
        }
    }

    candidates.sort_unstable_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.token.cmp(&b.token))
            .then(a.hyp.cmp(&b.hyp))
    });
    candidates.truncate(limit);
    candidates
}
